//! Point-in-time snapshot assembly

use super::{match_entries, reconcile, EntityId, PanelStore, PriceEntry, RatioEntry};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Owned description of a snapshot, kept after the snapshot itself is dropped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotSummary {
    pub reference_date: NaiveDate,
    pub entities: usize,
    pub price_dates: Vec<NaiveDate>,
    pub ratio_dates: Vec<NaiveDate>,
}

/// The data a strategy may legitimately see at `reference_date`
///
/// Every entity present has one price row per price-window date and one ratio
/// row per ratio-window date, and the two panels cover the same entities.
#[derive(Debug, Clone)]
pub struct Snapshot<'a> {
    reference_date: NaiveDate,
    price_dates: &'a [NaiveDate],
    ratio_dates: &'a [NaiveDate],
    prices: Vec<&'a PriceEntry>,
    ratios: Vec<&'a RatioEntry>,
}

impl<'a> Snapshot<'a> {
    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date
    }

    /// Lookback dates the price rows were selected from
    pub fn price_dates(&self) -> &'a [NaiveDate] {
        self.price_dates
    }

    /// Lookback dates the ratio rows were selected from
    pub fn ratio_dates(&self) -> &'a [NaiveDate] {
        self.ratio_dates
    }

    /// Price rows, ordered by date then entity
    pub fn prices(&self) -> &[&'a PriceEntry] {
        &self.prices
    }

    /// Ratio rows, ordered by date then entity
    pub fn ratios(&self) -> &[&'a RatioEntry] {
        &self.ratios
    }

    /// Entities available to the strategy, sorted
    pub fn entities(&self) -> BTreeSet<&'a str> {
        self.prices.iter().map(|r| r.entity_id.as_str()).collect()
    }

    pub fn contains(&self, entity_id: &str) -> bool {
        self.prices.iter().any(|r| r.entity_id == entity_id)
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn summary(&self) -> SnapshotSummary {
        SnapshotSummary {
            reference_date: self.reference_date,
            entities: self.entities().len(),
            price_dates: self.price_dates.to_vec(),
            ratio_dates: self.ratio_dates.to_vec(),
        }
    }

    /// Each entity's returns over the price window, in date order
    pub fn returns_by_entity(&self) -> BTreeMap<EntityId, Vec<f64>> {
        let mut out: BTreeMap<EntityId, Vec<f64>> = BTreeMap::new();
        for row in &self.prices {
            out.entry(row.entity_id.clone()).or_default().push(row.ret);
        }
        out
    }
}

impl PanelStore {
    /// Assemble the point-in-time view for `date`
    ///
    /// Selects each panel's lookback window strictly before `date`, keeps only
    /// entities complete over their window, then intersects the two entity sets.
    pub fn snapshot(&self, date: NaiveDate, n_prices: usize, n_ratios: usize) -> Snapshot<'_> {
        let price_dates = self.universe().window(date, n_prices);
        let ratio_dates = self.universe().window(date, n_ratios);

        let prices = match_entries(self.prices(), price_dates);
        let ratios = match_entries(self.ratios(), ratio_dates);
        let (prices, ratios) = reconcile(prices, ratios);

        Snapshot {
            reference_date: date,
            price_dates,
            ratio_dates,
            prices,
            ratios,
        }
    }
}
