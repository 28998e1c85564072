//! Metrics report and rounded summary

use chrono::NaiveDate;
use rust_decimal::prelude::*;
use serde::Serialize;

/// Everything the metrics engine derives from one portfolio return series
///
/// Undefined statistics are `NaN` here and serialize as JSON `null`.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    /// Number of return observations
    pub observations: usize,
    /// Mean periodic return
    pub mean: f64,
    /// Sample standard deviation of periodic returns
    pub std: f64,
    /// Annualized Sharpe ratio, zero risk-free rate
    pub sharpe: f64,
    pub skew: f64,
    /// Excess kurtosis
    pub kurtosis: f64,
    /// Final cumulative level minus one
    pub total_return: f64,
    /// Deepest drawdown, `<= 0`
    pub max_drawdown: f64,
    /// Beta against the configured benchmark
    pub beta: Option<f64>,
    pub periods_per_year: f64,
    pub rolling_window: usize,
    /// Growth of one unit invested at the start
    pub cumulative: Vec<(NaiveDate, f64)>,
    pub rolling_sharpe: Vec<(NaiveDate, Option<f64>)>,
    pub drawdown: Vec<(NaiveDate, f64)>,
    /// Drawdown of portfolio growth relative to benchmark growth
    pub relative_drawdown: Option<Vec<(NaiveDate, f64)>>,
}

/// Scalar metrics rounded to three decimal places
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSummary {
    pub observations: usize,
    pub mean: Option<Decimal>,
    pub std: Option<Decimal>,
    pub sharpe: Option<Decimal>,
    pub skew: Option<Decimal>,
    pub kurtosis: Option<Decimal>,
    pub total_return: Option<Decimal>,
    pub max_drawdown: Option<Decimal>,
    pub beta: Option<Decimal>,
}

fn round3(value: f64) -> Option<Decimal> {
    Decimal::from_f64(value).map(|d| d.round_dp(3))
}

fn cell(value: Option<Decimal>) -> String {
    value.map_or_else(|| "n/a".to_string(), |d| d.to_string())
}

impl MetricsReport {
    /// Final cumulative level, `1.0` for an empty series
    pub fn final_level(&self) -> f64 {
        self.cumulative.last().map_or(1.0, |(_, v)| *v)
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            observations: self.observations,
            mean: round3(self.mean),
            std: round3(self.std),
            sharpe: round3(self.sharpe),
            skew: round3(self.skew),
            kurtosis: round3(self.kurtosis),
            total_return: round3(self.total_return),
            max_drawdown: round3(self.max_drawdown),
            beta: self.beta.and_then(round3),
        }
    }
}

impl MetricsSummary {
    /// Format as table for CLI output
    pub fn format_table(&self) -> String {
        format!(
            r#"
══════════════════════════════════════════════════════
               BACKTEST METRICS
══════════════════════════════════════════════════════

RETURNS
───────────────────────────────────────────────────────
Observations:     {}
Mean:             {}
Std:              {}
Total Return:     {}

RISK
───────────────────────────────────────────────────────
Sharpe Ratio:     {}
Skew:             {}
Kurtosis:         {}
Max Drawdown:     {}
Beta:             {}
══════════════════════════════════════════════════════
"#,
            self.observations,
            cell(self.mean),
            cell(self.std),
            cell(self.total_return),
            cell(self.sharpe),
            cell(self.skew),
            cell(self.kurtosis),
            cell(self.max_drawdown),
            cell(self.beta),
        )
    }
}
