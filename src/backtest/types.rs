//! Backtest types

use crate::panel::{EntityId, PanelError};
use crate::strategy::StrategyError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Backtest errors
#[derive(Debug, Error)]
pub enum BacktestError {
    /// Rejected configuration, reported before any work starts
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    /// The strategy failed on a rebalance date
    #[error("Strategy failed on {date}: {source}")]
    Strategy {
        date: NaiveDate,
        #[source]
        source: StrategyError,
    },
    /// The strategy returned weights the engine cannot use
    #[error("Malformed allocation on {date}: {reason}")]
    MalformedAllocation { date: NaiveDate, reason: String },
    /// Two holding periods produced a return for the same date
    #[error("Holding periods overlap on {date}")]
    OverlappingPeriods { date: NaiveDate },
    /// Results were requested before a simulation completed
    #[error("No results available: run a backtest first")]
    NoResults,
    /// The run was cancelled before completing
    #[error("Backtest interrupted")]
    Interrupted,
    #[error(transparent)]
    Panel(#[from] PanelError),
}

/// Portfolio weights keyed by entity
///
/// Weights are linear multipliers; nothing requires them to sum to one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AllocationVector(BTreeMap<EntityId, f64>);

impl AllocationVector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Equal weights summing to one across `entities`
    pub fn equal_weight<'a>(entities: impl IntoIterator<Item = &'a str>) -> Self {
        let ids: Vec<&str> = entities.into_iter().collect();
        if ids.is_empty() {
            return Self::default();
        }
        let w = 1.0 / ids.len() as f64;
        ids.into_iter().map(|id| (id.to_string(), w)).collect()
    }

    pub fn insert(&mut self, entity_id: impl Into<EntityId>, weight: f64) {
        self.0.insert(entity_id.into(), weight);
    }

    pub fn weight(&self, entity_id: &str) -> Option<f64> {
        self.0.get(entity_id).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(id, w)| (id.as_str(), *w))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of weights
    pub fn total(&self) -> f64 {
        self.0.values().sum()
    }
}

impl FromIterator<(EntityId, f64)> for AllocationVector {
    fn from_iter<I: IntoIterator<Item = (EntityId, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Allocation held from the close of `buy_date` to the close of `sell_date`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingPeriod {
    pub buy_date: NaiveDate,
    pub sell_date: NaiveDate,
    pub allocations: AllocationVector,
}

impl HoldingPeriod {
    /// Pair each decision with the next decision date; the last one has no exit
    pub fn from_decisions(mut decisions: Vec<(NaiveDate, AllocationVector)>) -> Vec<HoldingPeriod> {
        decisions.sort_by_key(|(date, _)| *date);
        let sell_dates: Vec<NaiveDate> = decisions.iter().skip(1).map(|(d, _)| *d).collect();
        decisions
            .into_iter()
            .zip(sell_dates)
            .map(|((buy_date, allocations), sell_date)| HoldingPeriod {
                buy_date,
                sell_date,
                allocations,
            })
            .collect()
    }
}

/// Date-keyed scalar returns, ascending by date
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReturnSeries {
    points: Vec<(NaiveDate, f64)>,
}

/// The simulated portfolio's realized returns
pub type PortfolioReturnSeries = ReturnSeries;

impl ReturnSeries {
    /// Build from points in any order; later duplicates replace earlier ones
    pub fn new(points: impl IntoIterator<Item = (NaiveDate, f64)>) -> Self {
        let map: BTreeMap<NaiveDate, f64> = points.into_iter().collect();
        Self {
            points: map.into_iter().collect(),
        }
    }

    pub fn points(&self) -> &[(NaiveDate, f64)] {
        &self.points
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.points.iter().map(|(d, _)| *d)
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|(_, r)| *r).collect()
    }

    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.points
            .binary_search_by_key(&date, |(d, _)| *d)
            .ok()
            .map(|i| self.points[i].1)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Paired values on the dates both series cover
    pub fn align(&self, other: &ReturnSeries) -> Vec<(NaiveDate, f64, f64)> {
        self.points
            .iter()
            .filter_map(|(d, a)| other.get(*d).map(|b| (*d, *a, b)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::fixtures::*;

    #[test]
    fn test_equal_weight() {
        let alloc = AllocationVector::equal_weight(["A", "B", "C", "D"]);
        assert_eq!(alloc.len(), 4);
        assert_eq!(alloc.weight("B"), Some(0.25));
        assert_eq!(alloc.total(), 1.0);
        assert!(AllocationVector::equal_weight([]).is_empty());
    }

    #[test]
    fn test_allocation_serializes_as_map() {
        let mut alloc = AllocationVector::new();
        alloc.insert("A", 0.5);
        let json = serde_json::to_string(&alloc).unwrap();
        assert_eq!(json, r#"{"A":0.5}"#);
    }

    #[test]
    fn test_holding_period_pairing() {
        let m = months();
        let decisions: Vec<_> = m[1..]
            .iter()
            .map(|d| (*d, AllocationVector::equal_weight(["X"])))
            .collect();

        let periods = HoldingPeriod::from_decisions(decisions);
        let pairs: Vec<_> = periods.iter().map(|p| (p.buy_date, p.sell_date)).collect();
        assert_eq!(pairs, vec![(m[1], m[2]), (m[2], m[3])]);
        assert!(periods.iter().all(|p| p.buy_date < p.sell_date));
    }

    #[test]
    fn test_holding_period_unordered_decisions() {
        let m = months();
        let decisions = vec![
            (m[3], AllocationVector::equal_weight(["Z"])),
            (m[1], AllocationVector::equal_weight(["X"])),
            (m[2], AllocationVector::equal_weight(["Y"])),
        ];

        let periods = HoldingPeriod::from_decisions(decisions);
        let pairs: Vec<_> = periods.iter().map(|p| (p.buy_date, p.sell_date)).collect();
        assert_eq!(pairs, vec![(m[1], m[2]), (m[2], m[3])]);
        assert_eq!(periods[0].allocations.weight("X"), Some(1.0));
        assert_eq!(periods[1].allocations.weight("Y"), Some(1.0));
    }

    #[test]
    fn test_holding_period_single_decision() {
        let m = months();
        let periods = HoldingPeriod::from_decisions(vec![(m[0], AllocationVector::new())]);
        assert!(periods.is_empty());
        assert!(HoldingPeriod::from_decisions(vec![]).is_empty());
    }

    #[test]
    fn test_return_series_sorted() {
        let m = months();
        let series = ReturnSeries::new(vec![(m[2], 0.3), (m[0], 0.1), (m[1], 0.2)]);
        assert_eq!(series.dates().collect::<Vec<_>>(), vec![m[0], m[1], m[2]]);
        assert_eq!(series.get(m[1]), Some(0.2));
        assert_eq!(series.get(m[3]), None);
    }

    #[test]
    fn test_align_overlap_only() {
        let m = months();
        let a = ReturnSeries::new(vec![(m[0], 0.1), (m[1], 0.2), (m[2], 0.3)]);
        let b = ReturnSeries::new(vec![(m[1], -0.2), (m[2], -0.3), (m[3], -0.4)]);
        let aligned = a.align(&b);
        assert_eq!(aligned, vec![(m[1], 0.2, -0.2), (m[2], 0.3, -0.3)]);
    }
}
