//! First/last entity split, useful as a smoke-test strategy

use super::{Strategy, StrategyError};
use crate::backtest::AllocationVector;
use crate::panel::Snapshot;

/// Splits the book equally between the first and last entity by identifier
#[derive(Debug, Clone, Copy, Default)]
pub struct Endpoints;

impl Strategy for Endpoints {
    fn allocate(&self, snapshot: &Snapshot<'_>) -> Result<AllocationVector, StrategyError> {
        let entities = snapshot.entities();
        let picks: Vec<&str> = match (entities.first(), entities.last()) {
            (Some(first), Some(last)) if first != last => vec![*first, *last],
            (Some(only), _) => vec![*only],
            _ => return Ok(AllocationVector::default()),
        };

        Ok(AllocationVector::equal_weight(picks))
    }

    fn name(&self) -> &str {
        "endpoints"
    }
}
