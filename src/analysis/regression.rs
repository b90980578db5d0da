use serde::Serialize;

use super::AnalysisError;

/// Ordinary least-squares fit of one series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RegressionResult {
    pub slope: f64,
    pub intercept: f64,
    /// Pearson correlation coefficient.
    pub r_value: f64,
    pub r_squared: f64,
}

impl RegressionResult {
    /// Value of the fitted line at `x`.
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Fit `values` against `times` by ordinary least squares.
///
/// A constant `times` or `values` array has no defined correlation; it is
/// reported as `r_squared = 0` instead of dividing by zero. Non-finite
/// input is rejected.
pub fn fit(times: &[f64], values: &[f64]) -> Result<RegressionResult, AnalysisError> {
    if times.len() != values.len() {
        return Err(AnalysisError::LengthMismatch {
            times: times.len(),
            values: values.len(),
        });
    }
    let n = times.len();
    if n < 2 {
        return Err(AnalysisError::InsufficientData { points: n });
    }
    if let Some(index) = times
        .iter()
        .zip(values)
        .position(|(t, v)| !t.is_finite() || !v.is_finite())
    {
        return Err(AnalysisError::NonFinite { index });
    }

    let nf = n as f64;
    let mean_x = times.iter().sum::<f64>() / nf;
    let mean_y = values.iter().sum::<f64>() / nf;

    let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
    for (&x, &y) in times.iter().zip(values) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }

    let constant = |xs: &[f64]| xs.iter().all(|&v| v == xs[0]);
    if constant(times) || sxx == 0.0 {
        return Ok(RegressionResult {
            slope: 0.0,
            intercept: mean_y,
            r_value: 0.0,
            r_squared: 0.0,
        });
    }
    if constant(values) || syy == 0.0 {
        return Ok(RegressionResult {
            slope: 0.0,
            intercept: values[0],
            r_value: 0.0,
            r_squared: 0.0,
        });
    }

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;
    // Rounding can push |r| a hair past 1.
    let r_value = (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0);

    Ok(RegressionResult {
        slope,
        intercept,
        r_value,
        r_squared: r_value * r_value,
    })
}
