//! Time-series analytics over a return series

use super::stats;
use crate::backtest::ReturnSeries;
use chrono::NaiveDate;

/// Compounded growth of one unit, evaluated lazily
///
/// Each call to [`cumulative`] starts a fresh pass from `1.0`.
#[derive(Debug, Clone)]
pub struct Cumulative<'a> {
    points: std::slice::Iter<'a, (NaiveDate, f64)>,
    level: f64,
}

impl Iterator for Cumulative<'_> {
    type Item = (NaiveDate, f64);

    fn next(&mut self) -> Option<Self::Item> {
        let (date, ret) = self.points.next()?;
        self.level *= 1.0 + ret;
        Some((*date, self.level))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.points.size_hint()
    }
}

/// Cumulative product of `1 + r`, starting from the first return
pub fn cumulative(returns: &ReturnSeries) -> Cumulative<'_> {
    Cumulative {
        points: returns.points().iter(),
        level: 1.0,
    }
}

/// Trailing-window Sharpe ratio, `None` until `window` observations are available
pub fn rolling_sharpe(
    returns: &ReturnSeries,
    window: usize,
    periods_per_year: f64,
) -> Vec<(NaiveDate, Option<f64>)> {
    let values = returns.values();
    returns
        .dates()
        .enumerate()
        .map(|(i, date)| {
            let value = (window > 0 && i + 1 >= window)
                .then(|| stats::sharpe(&values[i + 1 - window..=i], periods_per_year));
            (date, value)
        })
        .collect()
}

/// Relative decline of the cumulative series from its running peak
///
/// Always `<= 0`, and exactly `0` wherever a new peak is reached. A negative
/// peak (wealth wiped out under leverage) is measured against its magnitude.
pub fn drawdown(returns: &ReturnSeries) -> Vec<(NaiveDate, f64)> {
    drawdown_from_levels(cumulative(returns))
}

/// Sensitivity of `returns` to `benchmark` over their overlapping dates
pub fn beta(returns: &ReturnSeries, benchmark: &ReturnSeries) -> f64 {
    let aligned = returns.align(benchmark);
    let r: Vec<f64> = aligned.iter().map(|(_, r, _)| *r).collect();
    let b: Vec<f64> = aligned.iter().map(|(_, _, b)| *b).collect();

    let var = stats::variance(&b);
    if var == 0.0 || var.is_nan() {
        return f64::NAN;
    }
    stats::covariance(&b, &r) / var
}

/// Drawdown of the portfolio's cumulative growth relative to the benchmark's
pub fn relative_drawdown(returns: &ReturnSeries, benchmark: &ReturnSeries) -> Vec<(NaiveDate, f64)> {
    let mut portfolio = 1.0;
    let mut reference = 1.0;
    let relative = returns.align(benchmark).into_iter().map(|(date, r, b)| {
        portfolio *= 1.0 + r;
        reference *= 1.0 + b;
        (date, portfolio / reference)
    });
    drawdown_from_levels(relative)
}

fn drawdown_from_levels(levels: impl Iterator<Item = (NaiveDate, f64)>) -> Vec<(NaiveDate, f64)> {
    let mut peak = f64::NEG_INFINITY;
    levels
        .map(|(date, level)| {
            if level >= peak {
                peak = level;
                (date, 0.0)
            } else {
                (date, ((level - peak) / peak.abs()).min(0.0))
            }
        })
        .collect()
}
