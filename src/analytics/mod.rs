//! Metrics engine module
//!
//! Performance statistics and series derived from a portfolio return series

mod report;
mod series;
pub mod stats;

pub use report::{MetricsReport, MetricsSummary};
pub use series::{beta, cumulative, drawdown, relative_drawdown, rolling_sharpe, Cumulative};

use crate::backtest::{BacktestError, ReturnPanel, ReturnSeries};
use serde::{Deserialize, Serialize};

/// Metrics configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Annualization factor; 12 for monthly rebalance dates
    #[serde(default = "default_periods_per_year")]
    pub periods_per_year: f64,
    /// Observations per rolling Sharpe window
    #[serde(default = "default_rolling_window")]
    pub rolling_window: usize,
    /// Benchmark for beta and relative drawdown
    #[serde(default)]
    pub benchmark: Option<Benchmark>,
}

fn default_periods_per_year() -> f64 {
    12.0
}
fn default_rolling_window() -> usize {
    12
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            periods_per_year: default_periods_per_year(),
            rolling_window: default_rolling_window(),
            benchmark: None,
        }
    }
}

impl MetricsConfig {
    pub fn validate(&self) -> Result<(), BacktestError> {
        if !self.periods_per_year.is_finite() || self.periods_per_year <= 0.0 {
            return Err(BacktestError::InvalidConfig(format!(
                "periods_per_year must be positive, got {}",
                self.periods_per_year
            )));
        }
        if self.rolling_window < 2 {
            return Err(BacktestError::InvalidConfig(format!(
                "rolling_window must be at least 2, got {}",
                self.rolling_window
            )));
        }
        Ok(())
    }
}

/// Reference return series
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Benchmark {
    /// Cross-sectional mean return of the price panel
    EqualWeight,
    /// A single entity's returns
    Entity(String),
}

impl Benchmark {
    pub fn series(&self, returns: &ReturnPanel) -> ReturnSeries {
        match self {
            Benchmark::EqualWeight => returns.equal_weight_series(),
            Benchmark::Entity(id) => {
                let series = returns.entity_series(id);
                if series.is_empty() {
                    tracing::warn!(entity_id = %id, "Benchmark entity has no returns");
                }
                series
            }
        }
    }
}

/// Computes a [`MetricsReport`] from a return series
#[derive(Debug, Clone, Default)]
pub struct MetricsEngine {
    config: MetricsConfig,
}

impl MetricsEngine {
    pub fn new(config: MetricsConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MetricsConfig {
        &self.config
    }

    /// Build the full report; `benchmark` adds beta and relative drawdown
    pub fn report(&self, returns: &ReturnSeries, benchmark: Option<&ReturnSeries>) -> MetricsReport {
        let values = returns.values();
        let ppy = self.config.periods_per_year;

        let cumulative: Vec<_> = cumulative(returns).collect();
        let drawdown = drawdown(returns);

        let total_return = cumulative.last().map_or(f64::NAN, |(_, level)| level - 1.0);
        let max_drawdown = drawdown
            .iter()
            .map(|(_, d)| *d)
            .reduce(f64::min)
            .unwrap_or(f64::NAN);

        MetricsReport {
            observations: values.len(),
            mean: stats::mean(&values),
            std: stats::std_dev(&values),
            sharpe: stats::sharpe(&values, ppy),
            skew: stats::skew(&values),
            kurtosis: stats::kurtosis(&values),
            total_return,
            max_drawdown,
            beta: benchmark.map(|b| beta(returns, b)),
            periods_per_year: ppy,
            rolling_window: self.config.rolling_window,
            rolling_sharpe: rolling_sharpe(returns, self.config.rolling_window, ppy),
            relative_drawdown: benchmark.map(|b| relative_drawdown(returns, b)),
            cumulative,
            drawdown,
        }
    }
}
