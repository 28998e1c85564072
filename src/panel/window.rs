//! Simulation clock and lookback window selection

use chrono::NaiveDate;

/// Sorted, deduplicated ratio-report dates
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateUniverse {
    dates: Vec<NaiveDate>,
}

impl DateUniverse {
    /// Build from any date sequence; sorts and removes duplicates
    pub fn new(dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        let mut dates: Vec<NaiveDate> = dates.into_iter().collect();
        dates.sort_unstable();
        dates.dedup();
        Self { dates }
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// The `n` most recent dates strictly before `reference`, ascending
    ///
    /// Returns fewer than `n` dates when the universe does not reach back far
    /// enough. The simulator never asks for such a window.
    pub fn window(&self, reference: NaiveDate, n: usize) -> &[NaiveDate] {
        let end = self.dates.partition_point(|d| *d < reference);
        let start = end.saturating_sub(n);
        &self.dates[start..end]
    }

    /// Dates from index `offset` onward, keeping every `stride`-th one
    pub fn rebalance_dates(&self, offset: usize, stride: usize) -> Vec<NaiveDate> {
        self.dates
            .iter()
            .skip(offset)
            .step_by(stride.max(1))
            .copied()
            .collect()
    }
}
