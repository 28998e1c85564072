//! Data module
//!
//! Loads input panels from Parquet and persists run outputs

mod parquet;

pub use parquet::{price_schema, ratio_schema, return_schema, ParquetReader, ParquetWriter};

use crate::panel::PanelStore;
use anyhow::Context;
use chrono::NaiveDate;
use std::path::Path;

/// Read both panels and build a store, optionally cut off at `max_date`
pub fn load_store(
    prices_path: &Path,
    ratios_path: &Path,
    max_date: Option<NaiveDate>,
) -> anyhow::Result<PanelStore> {
    let prices = ParquetReader::new(prices_path)
        .read_prices()
        .with_context(|| format!("Failed to read prices from {}", prices_path.display()))?;
    let (ratios, feature_names) = ParquetReader::new(ratios_path)
        .read_ratios()
        .with_context(|| format!("Failed to read ratios from {}", ratios_path.display()))?;

    let store = PanelStore::new(prices, ratios, feature_names)?;
    let store = match max_date {
        Some(date) => store.truncated(date)?,
        None => store,
    };

    tracing::info!(
        prices = store.prices().len(),
        ratios = store.ratios().len(),
        entities = store.prices().entity_count(),
        dates = store.universe().len(),
        "Loaded panels"
    );
    Ok(store)
}
