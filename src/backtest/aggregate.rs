//! Portfolio return aggregation over holding periods

use super::{BacktestError, HoldingPeriod, ReturnSeries};
use crate::panel::{EntityId, Panel, PriceEntry};
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};
use std::ops::Bound::{Excluded, Included};

/// Date × entity matrix of realized returns
#[derive(Debug, Clone, Default)]
pub struct ReturnPanel {
    by_date: BTreeMap<NaiveDate, HashMap<EntityId, f64>>,
}

impl ReturnPanel {
    /// Pivot a price panel into a return matrix
    pub fn from_prices(prices: &Panel<PriceEntry>) -> Self {
        let mut by_date: BTreeMap<NaiveDate, HashMap<EntityId, f64>> = BTreeMap::new();
        for row in prices.rows() {
            by_date
                .entry(row.date)
                .or_default()
                .insert(row.entity_id.clone(), row.ret);
        }
        Self { by_date }
    }

    /// Returns dated in the half-open interval `(after, until]`
    pub fn range(
        &self,
        after: NaiveDate,
        until: NaiveDate,
    ) -> impl Iterator<Item = (NaiveDate, &HashMap<EntityId, f64>)> + '_ {
        let range = if after < until {
            Some(self.by_date.range((Excluded(after), Included(until))))
        } else {
            None
        };
        range.into_iter().flatten().map(|(d, row)| (*d, row))
    }

    pub fn get(&self, date: NaiveDate, entity_id: &str) -> Option<f64> {
        self.by_date.get(&date).and_then(|row| row.get(entity_id).copied())
    }

    /// One entity's return history, for use as a benchmark
    pub fn entity_series(&self, entity_id: &str) -> ReturnSeries {
        ReturnSeries::new(
            self.by_date
                .iter()
                .filter_map(|(d, row)| row.get(entity_id).map(|r| (*d, *r))),
        )
    }

    /// Cross-sectional mean return per date
    pub fn equal_weight_series(&self) -> ReturnSeries {
        ReturnSeries::new(self.by_date.iter().filter(|(_, row)| !row.is_empty()).map(
            |(d, row)| {
                let mean = row.values().sum::<f64>() / row.len() as f64;
                (*d, mean)
            },
        ))
    }

    pub fn date_count(&self) -> usize {
        self.by_date.len()
    }
}

/// Weighted portfolio return for every date covered by `investments`
///
/// Each period contributes the dates in `(buy_date, sell_date]`. Entities
/// outside the allocation are ignored; an allocated entity without a return on
/// a date contributes nothing to that date. Two periods covering the same date
/// is a configuration error.
pub fn aggregate(
    investments: &[HoldingPeriod],
    returns: &ReturnPanel,
) -> Result<ReturnSeries, BacktestError> {
    let mut out: BTreeMap<NaiveDate, f64> = BTreeMap::new();

    for period in investments {
        for (date, row) in returns.range(period.buy_date, period.sell_date) {
            let mut total = 0.0;
            for (entity_id, weight) in period.allocations.iter() {
                match row.get(entity_id) {
                    Some(ret) => total += weight * ret,
                    None => {
                        tracing::debug!(%date, entity_id, "No return for allocated entity");
                    }
                }
            }

            if out.insert(date, total).is_some() {
                return Err(BacktestError::OverlappingPeriods { date });
            }
        }
    }

    Ok(ReturnSeries::new(out))
}
