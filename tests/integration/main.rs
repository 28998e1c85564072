//! Integration tests

mod common;
mod e2e_test;
mod parquet_test;
mod snapshot_test;
