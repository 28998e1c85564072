//! Strategy module
//!
//! The pluggable decision function invoked on every rebalance date

mod endpoints;
mod momentum;

pub use endpoints::Endpoints;
pub use momentum::Momentum;

use crate::backtest::AllocationVector;
use crate::panel::Snapshot;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by a strategy while deciding allocations
#[derive(Debug, Error)]
pub enum StrategyError {
    /// The snapshot does not contain what the strategy needs
    #[error("Insufficient input: {0}")]
    InsufficientInput(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Trait for allocation strategies
///
/// Implementations must not depend on engine state beyond the snapshot they
/// are given. Seed any internal randomness for reproducible runs.
pub trait Strategy: Send + Sync {
    /// Decide portfolio weights from a point-in-time snapshot
    fn allocate(&self, snapshot: &Snapshot<'_>) -> Result<AllocationVector, StrategyError>;

    /// Short name used in logs and output files
    fn name(&self) -> &str {
        "custom"
    }
}

/// Strategy backed by a closure
pub struct FnStrategy<F> {
    f: F,
}

/// Wrap a closure as a [`Strategy`]
pub fn from_fn<F>(f: F) -> FnStrategy<F>
where
    F: Fn(&Snapshot<'_>) -> Result<AllocationVector, StrategyError> + Send + Sync,
{
    FnStrategy { f }
}

impl<F> Strategy for FnStrategy<F>
where
    F: Fn(&Snapshot<'_>) -> Result<AllocationVector, StrategyError> + Send + Sync,
{
    fn allocate(&self, snapshot: &Snapshot<'_>) -> Result<AllocationVector, StrategyError> {
        (self.f)(snapshot)
    }
}

/// Built-in strategy selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StrategyConfig {
    /// Equal weight on the best `count` compounded performers
    Momentum {
        #[serde(default = "default_momentum_count")]
        count: usize,
    },
    /// Equal weight on the first and last entity by identifier
    Endpoints,
}

fn default_momentum_count() -> usize {
    50
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self::Momentum {
            count: default_momentum_count(),
        }
    }
}

impl StrategyConfig {
    /// Instantiate the configured strategy
    pub fn build(&self) -> Box<dyn Strategy> {
        match self {
            Self::Momentum { count } => Box::new(Momentum::new(*count)),
            Self::Endpoints => Box::new(Endpoints),
        }
    }
}
