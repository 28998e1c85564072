//! Sample statistics over return slices
//!
//! Degenerate inputs (too few observations, zero variance) yield `f64::NAN`.

/// Arithmetic mean
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample variance (n - 1 denominator)
pub fn variance(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (n - 1) as f64
}

/// Sample standard deviation
pub fn std_dev(values: &[f64]) -> f64 {
    variance(values).sqrt()
}

/// Sample covariance of two equally long slices
pub fn covariance(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len().min(b.len());
    if n < 2 {
        return f64::NAN;
    }
    let (a, b) = (&a[..n], &b[..n]);
    let (ma, mb) = (mean(a), mean(b));
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - ma) * (y - mb))
        .sum::<f64>()
        / (n - 1) as f64
}

/// Bias-adjusted sample skewness
pub fn skew(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 3 {
        return f64::NAN;
    }
    let m = mean(values);
    let s2: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    if s2 == 0.0 {
        return f64::NAN;
    }
    let s3: f64 = values.iter().map(|v| (v - m).powi(3)).sum();
    let n = n as f64;
    (n * (n - 1.0).sqrt() / (n - 2.0)) * (s3 / s2.powf(1.5))
}

/// Bias-adjusted sample excess kurtosis
pub fn kurtosis(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 4 {
        return f64::NAN;
    }
    let m = mean(values);
    let s2: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    if s2 == 0.0 {
        return f64::NAN;
    }
    let s4: f64 = values.iter().map(|v| (v - m).powi(4)).sum();
    let n = n as f64;
    let numerator = n * (n + 1.0) * (n - 1.0) * s4;
    let denominator = (n - 2.0) * (n - 3.0) * s2 * s2;
    let adjustment = 3.0 * (n - 1.0).powi(2) / ((n - 2.0) * (n - 3.0));
    numerator / denominator - adjustment
}

/// Mean over standard deviation, scaled by `sqrt(periods_per_year)`
pub fn sharpe(values: &[f64], periods_per_year: f64) -> f64 {
    let sd = std_dev(values);
    if sd == 0.0 || sd.is_nan() {
        return f64::NAN;
    }
    mean(values) / sd * periods_per_year.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mean_and_std() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_relative_eq!(mean(&x), 3.0);
        assert_relative_eq!(variance(&x), 2.5);
        assert_relative_eq!(std_dev(&x), 1.581_138_830_084_189_8, epsilon = 1e-12);
    }

    #[test]
    fn test_skew_and_kurtosis() {
        let symmetric = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_relative_eq!(skew(&symmetric), 0.0, epsilon = 1e-12);
        assert_relative_eq!(kurtosis(&symmetric), -1.2, epsilon = 1e-12);

        let skewed = [1.0, 2.0, 3.0, 10.0];
        assert_relative_eq!(skew(&skewed), 1.763_632_614_803_888, epsilon = 1e-9);
        assert_relative_eq!(kurtosis(&skewed), 3.228, epsilon = 1e-9);
    }

    #[test]
    fn test_sharpe_annualized() {
        let r = [0.01, 0.02, -0.01, 0.03];
        assert_relative_eq!(sharpe(&r, 12.0), 2.535_462_764_185_549, epsilon = 1e-9);
        assert_relative_eq!(sharpe(&r, 1.0) * 12f64.sqrt(), sharpe(&r, 12.0), epsilon = 1e-12);
    }

    #[test]
    fn test_degenerate_inputs_are_nan() {
        let flat = [0.5, 0.5, 0.5, 0.5];
        assert!(sharpe(&flat, 12.0).is_nan());
        assert!(skew(&flat).is_nan());
        assert!(kurtosis(&flat).is_nan());

        assert!(mean(&[]).is_nan());
        assert!(std_dev(&[0.1]).is_nan());
        assert!(sharpe(&[0.1], 12.0).is_nan());
        assert!(skew(&[0.1, 0.2]).is_nan());
        assert!(kurtosis(&[0.1, 0.2, 0.3]).is_nan());
        assert!(covariance(&[0.1], &[0.2]).is_nan());
    }

    #[test]
    fn test_covariance() {
        let a = [1.0, 2.0, 3.0];
        let b = [2.0, 4.0, 6.0];
        assert_relative_eq!(covariance(&a, &b), 2.0);
        assert_relative_eq!(covariance(&a, &a), variance(&a));
    }
}
