use thiserror::Error;

use super::model::{Plate, Segment};

// ---------------------------------------------------------------------------
// Time window: which timepoints of the shared axis are kept
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CropError {
    #[error("crop window {start}..{end} min selects fewer than 2 timepoints")]
    TooFewPoints { start: f64, end: f64 },
}

/// Index range of `times` inside `[start, end]` minutes.
///
/// Keeps the first index whose time is `>= start` through the last index whose
/// time is `<= end`.
pub fn crop_range(times: &[f64], start: f64, end: f64) -> Result<Segment, CropError> {
    let first = times.iter().position(|&t| t >= start);
    let last = times.iter().rposition(|&t| t <= end);
    match (first, last) {
        (Some(first), Some(last)) if last > first => Ok(Segment::new(first, last + 1)),
        _ => Err(CropError::TooFewPoints { start, end }),
    }
}

/// Apply a time window to every well of the plate in place.
pub fn crop_plate(plate: &mut Plate, start: f64, end: f64) -> Result<(), CropError> {
    let range = crop_range(&plate.times, start, end)?;
    log::info!(
        "Selecting data from {start:.1} to {end:.1} min ({} of {} timepoints)",
        range.len(),
        plate.times.len()
    );
    plate.times = plate.times[range.start..range.end].to_vec();
    for well in &mut plate.wells {
        well.values = well.values[range.start..range.end].to_vec();
    }
    Ok(())
}
