//! Backtesting module
//!
//! Rolling point-in-time simulation and portfolio return aggregation

mod aggregate;
mod simulator;
mod types;

pub use aggregate::{aggregate, ReturnPanel};
pub use simulator::{BacktestRun, Backtester};
pub use types::{
    AllocationVector, BacktestError, HoldingPeriod, PortfolioReturnSeries, ReturnSeries,
};

use serde::{Deserialize, Serialize};

/// Rolling simulation configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Lookback dates an entity must have complete prices for
    #[serde(default = "default_lookback")]
    pub n_prices: usize,
    /// Lookback dates an entity must have complete ratio reports for
    #[serde(default = "default_lookback")]
    pub n_ratios: usize,
    /// Rebalance every `frequency`-th date of the universe
    #[serde(default = "default_frequency")]
    pub frequency: usize,
    /// Evaluate rebalance dates on the rayon pool
    #[serde(default)]
    pub parallel: bool,
}

fn default_lookback() -> usize {
    1
}
fn default_frequency() -> usize {
    1
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            n_prices: 1,
            n_ratios: 1,
            frequency: 1,
            parallel: false,
        }
    }
}

impl SimulationConfig {
    pub fn new(n_prices: usize, n_ratios: usize, frequency: usize) -> Self {
        Self {
            n_prices,
            n_ratios,
            frequency,
            parallel: false,
        }
    }

    /// Reject counts below one
    pub fn validate(&self) -> Result<(), BacktestError> {
        for (name, value) in [
            ("n_prices", self.n_prices),
            ("n_ratios", self.n_ratios),
            ("frequency", self.frequency),
        ] {
            if value < 1 {
                return Err(BacktestError::InvalidConfig(format!(
                    "{name} must be at least 1, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Index of the first date with a full lookback behind it
    pub fn start_offset(&self) -> usize {
        self.n_prices.max(self.n_ratios)
    }
}
