use rayon::prelude::*;

use super::adjustment::Adjustment;
use super::breaks::{self, BreakOutcome};
use super::linear_range::select_linear_range;
use super::normalize::{self, NormalizedSlope, PALETTE_SIZE};
use super::regression::{self, RegressionResult};
use super::AnalysisError;
use crate::config::{AnalysisConfig, TimeCrop};
use crate::data::crop;
use crate::data::model::{Plate, Series, WellId};

// ---------------------------------------------------------------------------
// Per-well result
// ---------------------------------------------------------------------------

/// Everything the viewer and exporter need for one well.
#[derive(Debug, Clone)]
pub struct WellAnalysis {
    pub id: WellId,
    pub label: String,
    /// Readings after crop and negative transform, before any trimming.
    pub raw: Series,
    /// Points the final line was fit to.
    pub fitted: Series,
    pub adjustment: Adjustment,
    pub fit: Result<RegressionResult, AnalysisError>,
    /// Filled in once every well on the plate has been fit.
    pub normalized: Option<NormalizedSlope>,
}

impl WellAnalysis {
    pub fn reporting_slope(&self) -> Option<f64> {
        self.normalized.map(|n| n.reporting_slope)
    }

    pub fn r_squared(&self) -> Option<f64> {
        self.fit.as_ref().ok().map(|f| f.r_squared)
    }

    pub fn color_index(&self) -> Option<usize> {
        self.normalized.and_then(|n| n.color_index)
    }
}

/// Fit one well. Pure function of the series and settings.
pub fn analyze_well(
    id: WellId,
    label: String,
    series: Series,
    config: &AnalysisConfig,
) -> WellAnalysis {
    let raw = series.clone();
    let mut working = series;
    let mut adjustment = Adjustment::default();

    let fit = if let Some(index) = working.values.iter().position(|v| !v.is_finite()) {
        Err(AnalysisError::NonFinite { index })
    } else if config.full_mode {
        regression::fit(&working.times, &working.values)
    } else {
        match breaks::trim_breaks(&mut working, config.break_threshold) {
            BreakOutcome::Clean => {}
            BreakOutcome::Trimmed { breaks, kept } => {
                log::debug!(
                    "{id}: breaks at {breaks:?}, keeping points {}..{}",
                    kept.start,
                    kept.end
                );
                adjustment.mark_break_trimmed();
            }
            BreakOutcome::Degenerate { breaks } => {
                log::warn!("{id}: breaks at {breaks:?} leave no segment to fit, ignoring them");
            }
        }

        select_linear_range(&working, config.min_points, config.min_r_squared).map(|sel| {
            if sel.trimmed {
                log::debug!("{id}: linear range is the first {} of {} points", sel.len, working.len());
                adjustment.mark_range_trimmed();
                working.truncate(sel.len);
            } else if sel.fallback {
                log::debug!("{id}: no prefix above r² {}, fitting all points", config.min_r_squared);
            }
            sel.fit
        })
    };

    if let Err(e) = &fit {
        log::warn!("{id}: {e}");
    }

    WellAnalysis {
        id,
        label,
        raw,
        fitted: working,
        adjustment,
        fit,
        normalized: None,
    }
}

// ---------------------------------------------------------------------------
// Whole plate
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct PlateAnalysis {
    pub plate_name: String,
    pub config: AnalysisConfig,
    pub wells: Vec<WellAnalysis>,
}

impl PlateAnalysis {
    pub fn well(&self, id: WellId) -> Option<&WellAnalysis> {
        self.wells.iter().find(|w| w.id == id)
    }

    pub fn break_trimmed_count(&self) -> usize {
        self.wells.iter().filter(|w| w.adjustment.break_trimmed()).count()
    }

    pub fn range_trimmed_count(&self) -> usize {
        self.wells.iter().filter(|w| w.adjustment.range_trimmed()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.wells.iter().filter(|w| w.fit.is_err()).count()
    }
}

/// Crop, transform and fit every well, then color against the plate maximum.
///
/// Wells are fit in parallel. A well that cannot be fit keeps its error in
/// [`WellAnalysis::fit`]; only invalid settings or an empty crop window fail
/// the whole plate.
pub fn analyze_plate(plate: &Plate, config: &AnalysisConfig) -> Result<PlateAnalysis, AnalysisError> {
    config.validate()?;

    let mut plate = plate.clone();
    if let Some(TimeCrop { start, end }) = config.time_crop {
        crop::crop_plate(&mut plate, start, end)?;
    }

    let mut wells: Vec<WellAnalysis> = plate
        .wells
        .par_iter()
        .map(|well| {
            let mut series = plate.series(well);
            if config.negative_mode {
                normalize::invert_negative(&mut series.values, config.reference_point);
            }
            analyze_well(well.id, well.label.clone(), series, config)
        })
        .collect();

    let raw_slopes: Vec<Option<f64>> = wells
        .iter()
        .map(|w| w.fit.as_ref().ok().map(|f| f.slope))
        .collect();
    let normalized = normalize::normalize_slopes(&raw_slopes, config.scale_factor, PALETTE_SIZE);
    for (well, norm) in wells.iter_mut().zip(normalized) {
        well.normalized = norm;
    }

    let analysis = PlateAnalysis {
        plate_name: plate.name.clone(),
        config: config.clone(),
        wells,
    };

    if config.full_mode {
        log::info!("Full length regressions calculated for {} wells", analysis.wells.len());
    } else {
        log::info!(
            "{} out of {} wells trimmed for breaks",
            analysis.break_trimmed_count(),
            analysis.wells.len()
        );
        log::info!(
            "{} out of {} wells trimmed for linear range",
            analysis.range_trimmed_count(),
            analysis.wells.len()
        );
    }
    if analysis.failed_count() > 0 {
        log::warn!("{} wells could not be fit", analysis.failed_count());
    }

    Ok(analysis)
}
