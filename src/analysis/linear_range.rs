//! Automatic linear range: the longest leading prefix that fits a line well.
//!
//! Kinetic reads are linear early and flatten out later, so the search starts
//! with the whole series and shortens it from the end until the fit clears the
//! r² bar.

use super::regression::{self, RegressionResult};
use super::AnalysisError;
use crate::data::model::Series;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeSelection {
    /// Number of leading points used for `fit`.
    pub len: usize,
    pub fit: RegressionResult,
    /// A tail was cut off to reach the threshold.
    pub trimmed: bool,
    /// No prefix passed; `fit` covers the whole series.
    pub fallback: bool,
}

/// Scan prefix lengths from `n` down to `min_points`, accepting the first one
/// whose r² is strictly above `min_r_squared`.
///
/// If none qualifies (or the series is shorter than `min_points`) the whole
/// series is fit instead, so dead wells still get a slope.
pub fn select_linear_range(
    series: &Series,
    min_points: usize,
    min_r_squared: f64,
) -> Result<RangeSelection, AnalysisError> {
    let n = series.len();
    let lower = min_points.max(2);

    for len in (lower..=n).rev() {
        let fit = regression::fit(&series.times[..len], &series.values[..len])?;
        if fit.r_squared > min_r_squared {
            return Ok(RangeSelection {
                len,
                fit,
                trimmed: len < n,
                fallback: false,
            });
        }
    }

    let fit = regression::fit(&series.times, &series.values)?;
    Ok(RangeSelection {
        len: n,
        fit,
        trimmed: false,
        fallback: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn series(values: &[f64]) -> Series {
        let times = (0..values.len()).map(|i| i as f64).collect();
        Series::new(times, values.to_vec())
    }

    #[test]
    fn outlier_tail_is_trimmed() {
        let s = series(&[0.0, 1.0, 2.0, 3.0, 100.0]);
        let sel = select_linear_range(&s, 3, 0.99).unwrap();
        assert_eq!(sel.len, 4);
        assert!(sel.trimmed);
        assert!(!sel.fallback);
        assert!((sel.fit.slope - 1.0).abs() < 1e-12);
        assert!((sel.fit.r_squared - 1.0).abs() < 1e-12);
    }

    #[test]
    fn plateau_is_cut_to_first_three_points() {
        // [0..4) with 2.5 at the end only reaches r² ≈ 0.98
        let s = series(&[0.0, 1.0, 2.0, 2.5, 100.0]);
        let sel = select_linear_range(&s, 3, 0.99).unwrap();
        assert_eq!(sel.len, 3);
        assert!(sel.trimmed);
        assert!((sel.fit.slope - 1.0).abs() < 1e-12);
    }

    #[test]
    fn linear_series_is_kept_whole() {
        let s = series(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let sel = select_linear_range(&s, 5, 0.99).unwrap();
        assert_eq!(sel.len, 6);
        assert!(!sel.trimmed);
        assert!(!sel.fallback);
    }

    #[test]
    fn no_passing_prefix_falls_back_to_whole_series() {
        let s = series(&[0.0, 5.0, 0.0, 5.0, 0.0]);
        let sel = select_linear_range(&s, 5, 0.99).unwrap();
        assert_eq!(sel.len, 5);
        assert!(sel.fallback);
        assert!(!sel.trimmed);
        assert_eq!(sel.fit, regression::fit(&s.times, &s.values).unwrap());
    }

    #[test]
    fn flat_well_falls_back() {
        let s = series(&[0.2; 8]);
        let sel = select_linear_range(&s, 5, 0.99).unwrap();
        assert!(sel.fallback);
        assert_eq!(sel.fit.r_squared, 0.0);
    }

    #[test]
    fn short_series_is_fit_whole() {
        let s = series(&[0.0, 2.0, 1.0]);
        let sel = select_linear_range(&s, 5, 0.99).unwrap();
        assert_eq!(sel.len, 3);
        assert!(sel.fallback);
        assert!(!sel.trimmed);
    }

    #[test]
    fn single_point_is_an_error() {
        let s = series(&[1.0]);
        assert_eq!(
            select_linear_range(&s, 5, 0.99),
            Err(AnalysisError::InsufficientData { points: 1 })
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_selected_prefix_is_within_bounds(
            values in prop::collection::vec(-10.0f64..10.0, 2..40),
            min_points in 2usize..10,
            min_r_squared in 0.0f64..1.0,
        ) {
            let s = series(&values);
            let sel = select_linear_range(&s, min_points, min_r_squared).unwrap();
            prop_assert!(sel.len <= s.len());
            prop_assert!(sel.len >= 2);
            prop_assert_eq!(sel.trimmed, sel.len < s.len());
            if !sel.fallback {
                prop_assert!(sel.fit.r_squared > min_r_squared);
                prop_assert!(sel.len >= min_points);
            }
        }
    }
}
