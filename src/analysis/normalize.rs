//! Reporting units and color intensities.
//!
//! Color needs the largest slope on the plate, so it can only run after every
//! well has been fit. Everything here takes the finished per-well results as a
//! slice and never touches shared state.

/// Palette length used by the viewer (index 0 is the lightest shade).
pub const PALETTE_SIZE: usize = 100;

/// Slope in reporting units plus its palette index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedSlope {
    pub reporting_slope: f64,
    /// `None` draws the neutral background (negative slope or no usable max).
    pub color_index: Option<usize>,
}

/// `value' = reference_point - value` for negative-sloped assays.
pub fn invert_negative(values: &mut [f64], reference_point: f64) {
    for v in values {
        *v = reference_point - *v;
    }
}

/// Largest finite slope, if any.
pub fn max_slope(slopes: &[Option<f64>]) -> Option<f64> {
    slopes
        .iter()
        .flatten()
        .copied()
        .filter(|s| s.is_finite())
        .reduce(f64::max)
}

/// Palette index for `slope` relative to `max`.
pub fn color_index(slope: f64, max: f64, palette_size: usize) -> Option<usize> {
    if palette_size == 0 || !slope.is_finite() || !(max > 0.0) {
        return None;
    }
    let top = (palette_size - 1) as f64;
    let scaled = (slope / max * top).round();
    if scaled < 0.0 {
        return None;
    }
    Some(scaled.min(top) as usize)
}

/// Scale raw slopes by `scale_factor` and color them against the plate maximum.
///
/// `None` entries are wells without a fit; they stay uncolored and do not
/// count toward the maximum.
pub fn normalize_slopes(
    raw_slopes: &[Option<f64>],
    scale_factor: f64,
    palette_size: usize,
) -> Vec<Option<NormalizedSlope>> {
    let scaled: Vec<Option<f64>> = raw_slopes
        .iter()
        .map(|s| s.map(|s| s * scale_factor))
        .collect();
    let max = max_slope(&scaled);

    scaled
        .iter()
        .map(|s| {
            s.map(|reporting_slope| NormalizedSlope {
                reporting_slope,
                color_index: max.and_then(|m| color_index(reporting_slope, m, palette_size)),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn negative_assay_transform() {
        let mut values = [0.5, 2.0, 2.5];
        invert_negative(&mut values, 2.0);
        assert_eq!(values, [1.5, 0.0, -0.5]);
    }

    #[test]
    fn slopes_are_scaled_and_colored() {
        let out = normalize_slopes(&[Some(0.01), Some(0.004), Some(0.0)], 60.0, 100);
        let first = out[0].unwrap();
        assert!((first.reporting_slope - 0.6).abs() < 1e-12);
        assert_eq!(first.color_index, Some(99));
        assert_eq!(out[1].unwrap().color_index, Some(40));
        assert_eq!(out[2].unwrap().color_index, Some(0));
    }

    #[test]
    fn negative_slopes_are_neutral() {
        let out = normalize_slopes(&[Some(1.0), Some(-0.5)], 1.0, 100);
        assert_eq!(out[1].unwrap().color_index, None);
        assert_eq!(out[1].unwrap().reporting_slope, -0.5);
    }

    #[test]
    fn small_negative_rounds_to_lightest() {
        // -0.004 * 99 rounds to -0, same shade as zero
        assert_eq!(color_index(-0.004, 1.0, 100), Some(0));
        assert_eq!(color_index(-0.01, 1.0, 100), None);
    }

    #[test]
    fn no_positive_maximum_leaves_plate_neutral() {
        let out = normalize_slopes(&[Some(-1.0), Some(-2.0), None], 60.0, 100);
        assert!(out[..2].iter().all(|n| n.unwrap().color_index.is_none()));
        assert!(out[2].is_none());

        let out = normalize_slopes(&[Some(0.0), Some(0.0)], 60.0, 100);
        assert!(out.iter().all(|n| n.unwrap().color_index.is_none()));
    }

    #[test]
    fn failed_wells_do_not_set_the_maximum() {
        let out = normalize_slopes(&[None, Some(2.0), Some(1.0)], 1.0, 11);
        assert!(out[0].is_none());
        assert_eq!(out[1].unwrap().color_index, Some(10));
        assert_eq!(out[2].unwrap().color_index, Some(5));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_color_is_monotonic(
            slopes in prop::collection::vec(0.0f64..100.0, 2..96),
        ) {
            let raw: Vec<Option<f64>> = slopes.iter().copied().map(Some).collect();
            let out = normalize_slopes(&raw, 60.0, PALETTE_SIZE);
            for i in 0..slopes.len() {
                for j in 0..slopes.len() {
                    if slopes[i] < slopes[j] {
                        let ci = out[i].unwrap().color_index;
                        let cj = out[j].unwrap().color_index;
                        prop_assert!(ci.is_some() && cj.is_some());
                        prop_assert!(ci <= cj);
                    }
                }
            }
            prop_assert!(out.iter().all(|n| n.unwrap().color_index.unwrap_or(0) < PALETTE_SIZE));
        }
    }
}
