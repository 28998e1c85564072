//! Cross-sectional momentum over the price lookback window

use super::{Strategy, StrategyError};
use crate::backtest::AllocationVector;
use crate::panel::Snapshot;

/// Equal-weights the `count` entities with the highest compounded return
#[derive(Debug, Clone)]
pub struct Momentum {
    count: usize,
}

impl Momentum {
    pub fn new(count: usize) -> Self {
        Self { count }
    }

    /// Compounded return per entity, best first; ties fall back to identifier order
    pub fn rank(snapshot: &Snapshot<'_>) -> Vec<(String, f64)> {
        let mut ranked: Vec<(String, f64)> = snapshot
            .returns_by_entity()
            .into_iter()
            .map(|(id, rets)| {
                let growth = rets.iter().fold(1.0, |acc, r| acc * (1.0 + r));
                (id, growth - 1.0)
            })
            .collect();

        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked
    }
}

impl Strategy for Momentum {
    fn allocate(&self, snapshot: &Snapshot<'_>) -> Result<AllocationVector, StrategyError> {
        if self.count == 0 {
            return Err(StrategyError::InsufficientInput(
                "momentum count must be at least 1".to_string(),
            ));
        }

        let ranked = Self::rank(snapshot);
        let top = ranked.iter().take(self.count).map(|(id, _)| id.as_str());
        Ok(AllocationVector::equal_weight(top))
    }

    fn name(&self) -> &str {
        "momentum"
    }
}
