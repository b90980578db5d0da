//! Reader-jump detection.
//!
//! A break is a step between consecutive readings that is much larger than
//! the series' mean absolute step. Breaks cut the series into segments and
//! only the longest one is kept for fitting.

use crate::data::model::{Segment, Series};

/// Mean of `|v[j+1] - v[j]|` over the series, `None` below two points.
pub fn mean_abs_step(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let total: f64 = values.windows(2).map(|w| (w[1] - w[0]).abs()).sum();
    Some(total / (values.len() - 1) as f64)
}

/// Indices `j` where `|v[j] - v[j-1]|` exceeds `threshold` times the mean
/// absolute step.
///
/// A perfectly flat series (mean step of zero) has no detectable breaks.
pub fn break_points(values: &[f64], threshold: f64) -> Vec<usize> {
    let av = match mean_abs_step(values) {
        Some(av) if av > 0.0 => av,
        _ => return Vec::new(),
    };
    let limit = threshold * av;
    (1..values.len())
        .filter(|&j| (values[j] - values[j - 1]).abs() > limit)
        .collect()
}

/// Longest segment between cut points, first occurrence on ties.
///
/// `breaks` must be ascending indices in `1..len`.
pub fn longest_segment(len: usize, breaks: &[usize]) -> Segment {
    let mut best = Segment { start: 0, end: 0 };
    let mut start = 0;
    for &end in breaks.iter().chain(std::iter::once(&len)) {
        // Strictly longer only, so the earliest segment wins ties.
        if end - start > best.len() {
            best = Segment::new(start, end);
        }
        start = end;
    }
    best
}

/// Outcome of running break detection on one well.
#[derive(Debug, Clone, PartialEq)]
pub enum BreakOutcome {
    /// No step stood out; series untouched.
    Clean,
    /// Series replaced by `kept`.
    Trimmed { breaks: Vec<usize>, kept: Segment },
    /// Breaks found but every segment was a single point; series untouched.
    Degenerate { breaks: Vec<usize> },
}

/// Detect breaks and, if any, replace `series` with its longest clean segment.
pub fn trim_breaks(series: &mut Series, threshold: f64) -> BreakOutcome {
    let breaks = break_points(&series.values, threshold);
    if breaks.is_empty() {
        return BreakOutcome::Clean;
    }

    let kept = longest_segment(series.len(), &breaks);
    if kept.len() < 2 {
        return BreakOutcome::Degenerate { breaks };
    }

    *series = series.slice(kept);
    BreakOutcome::Trimmed { breaks, kept }
}
