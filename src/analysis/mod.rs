//! Kinetic analysis: per-well trimming and fitting, then plate-wide coloring.
//!
//! ```text
//!  Plate ──crop──▶ per-well Series ──(negative?)──▶
//!        ┌────────────────── rayon map, one well each ──────────────────┐
//!        │  breaks::trim_breaks → linear_range::select → regression::fit │
//!        └───────────────────────────────────────────────────────────────┘
//!                      │ all wells done
//!                      ▼
//!           normalize::normalize_slopes (plate max → palette index)
//! ```

pub mod adjustment;
pub mod breaks;
pub mod linear_range;
pub mod normalize;
pub mod pipeline;
pub mod regression;

use thiserror::Error;

use crate::config::ConfigError;
use crate::data::crop::CropError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error("need at least 2 points to fit a line, got {points}")]
    InsufficientData { points: usize },
    #[error("reading {index} is missing or not a finite number")]
    NonFinite { index: usize },
    #[error("{times} timepoints but {values} values")]
    LengthMismatch { times: usize, values: usize },
    #[error("invalid settings: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Crop(#[from] CropError),
}
