//! Panel store module
//!
//! Entity-date keyed price and ratio panels, and the point-in-time views
//! built on top of them

mod matcher;
mod snapshot;
mod window;

pub use matcher::{match_entries, reconcile};
pub use snapshot::{Snapshot, SnapshotSummary};
pub use window::DateUniverse;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::ops::Range;
use thiserror::Error;

/// Security identifier shared by both panels
pub type EntityId = String;

/// Panel construction errors
#[derive(Debug, Error)]
pub enum PanelError {
    /// Two rows share an entity and a date
    #[error("Duplicate row for entity {entity_id} on {date}")]
    DuplicateRow { entity_id: EntityId, date: NaiveDate },
    /// A ratio row does not match the declared feature columns
    #[error("Ratio row for entity {entity_id} on {date} has {found} features, expected {expected}")]
    FeatureWidth {
        entity_id: EntityId,
        date: NaiveDate,
        expected: usize,
        found: usize,
    },
}

/// One realized return observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceEntry {
    pub entity_id: EntityId,
    pub date: NaiveDate,
    /// Simple return over the period ending on `date`
    pub ret: f64,
}

/// One financial-ratio report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioEntry {
    pub entity_id: EntityId,
    pub date: NaiveDate,
    pub features: Vec<f64>,
}

/// Row keyed by entity and date
pub trait PanelRow {
    fn entity_id(&self) -> &str;
    fn date(&self) -> NaiveDate;
}

impl PanelRow for PriceEntry {
    fn entity_id(&self) -> &str {
        &self.entity_id
    }

    fn date(&self) -> NaiveDate {
        self.date
    }
}

impl PanelRow for RatioEntry {
    fn entity_id(&self) -> &str {
        &self.entity_id
    }

    fn date(&self) -> NaiveDate {
        self.date
    }
}

/// Immutable table of rows, sorted by (date, entity) and indexed by date
#[derive(Debug, Clone)]
pub struct Panel<R> {
    rows: Vec<R>,
    by_date: BTreeMap<NaiveDate, Range<usize>>,
}

impl<R: PanelRow> Panel<R> {
    /// Build a panel, rejecting duplicate (entity, date) keys
    pub fn new(mut rows: Vec<R>) -> Result<Self, PanelError> {
        rows.sort_by(|a, b| {
            a.date()
                .cmp(&b.date())
                .then_with(|| a.entity_id().cmp(b.entity_id()))
        });

        for pair in rows.windows(2) {
            if pair[0].date() == pair[1].date() && pair[0].entity_id() == pair[1].entity_id() {
                return Err(PanelError::DuplicateRow {
                    entity_id: pair[1].entity_id().to_string(),
                    date: pair[1].date(),
                });
            }
        }

        let mut by_date = BTreeMap::new();
        let mut start = 0;
        while start < rows.len() {
            let date = rows[start].date();
            let end = start + rows[start..].partition_point(|r| r.date() == date);
            by_date.insert(date, start..end);
            start = end;
        }

        Ok(Self { rows, by_date })
    }

    /// Rows observed on exactly `date`
    pub fn rows_on(&self, date: NaiveDate) -> &[R] {
        self.by_date
            .get(&date)
            .map(|range| &self.rows[range.clone()])
            .unwrap_or(&[])
    }

    /// Distinct dates present in the panel, ascending
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.by_date.keys().copied()
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct entities present anywhere in the panel
    pub fn entity_count(&self) -> usize {
        self.rows
            .iter()
            .map(|r| r.entity_id())
            .collect::<HashSet<_>>()
            .len()
    }
}

/// Holds the price panel, the ratio panel and the ratio-report date universe
///
/// The store is read-only once built; every snapshot is a pure function of it.
#[derive(Debug, Clone)]
pub struct PanelStore {
    prices: Panel<PriceEntry>,
    ratios: Panel<RatioEntry>,
    feature_names: Vec<String>,
    universe: DateUniverse,
}

impl PanelStore {
    /// Build a store from already-cleaned rows
    pub fn new(
        prices: Vec<PriceEntry>,
        ratios: Vec<RatioEntry>,
        feature_names: Vec<String>,
    ) -> Result<Self, PanelError> {
        if let Some(bad) = ratios.iter().find(|r| r.features.len() != feature_names.len()) {
            return Err(PanelError::FeatureWidth {
                entity_id: bad.entity_id.clone(),
                date: bad.date,
                expected: feature_names.len(),
                found: bad.features.len(),
            });
        }

        let prices = Panel::new(prices)?;
        let ratios = Panel::new(ratios)?;
        let universe = DateUniverse::new(ratios.dates());

        tracing::debug!(
            price_rows = prices.len(),
            ratio_rows = ratios.len(),
            dates = universe.len(),
            "Built panel store"
        );

        Ok(Self {
            prices,
            ratios,
            feature_names,
            universe,
        })
    }

    /// Drop every row dated after `max_date`
    pub fn truncated(self, max_date: NaiveDate) -> Result<Self, PanelError> {
        let keep = |d: NaiveDate| d <= max_date;
        let prices = self.prices.rows.into_iter().filter(|r| keep(r.date)).collect();
        let ratios = self.ratios.rows.into_iter().filter(|r| keep(r.date)).collect();
        Self::new(prices, ratios, self.feature_names)
    }

    pub fn prices(&self) -> &Panel<PriceEntry> {
        &self.prices
    }

    pub fn ratios(&self) -> &Panel<RatioEntry> {
        &self.ratios
    }

    /// Names of the ratio feature columns, in row order
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Simulation clock derived from the ratio panel
    pub fn universe(&self) -> &DateUniverse {
        &self.universe
    }
}
