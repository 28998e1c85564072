//! pit-backtest: point-in-time cross-sectional equity backtesting
//!
//! This library provides the core components for:
//! - Entity-date price and ratio panels with look-ahead-free snapshots
//! - Rolling simulation of a pluggable allocation strategy
//! - Holding-period return aggregation
//! - Performance metrics (Sharpe, drawdown, rolling Sharpe, beta)
//! - Parquet input and output
//! - Structured logging and run instrumentation

pub mod analytics;
pub mod backtest;
pub mod cli;
pub mod config;
pub mod data;
pub mod panel;
pub mod strategy;
pub mod telemetry;
