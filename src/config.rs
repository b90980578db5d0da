use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Analysis settings shared by the CLI, the viewer and the pipeline
// ---------------------------------------------------------------------------

/// Optional time window in minutes, both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeCrop {
    pub start: f64,
    pub end: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// A prefix is accepted when its r² is strictly above this.
    pub min_r_squared: f64,
    /// Shortest prefix the linear range search will consider.
    pub min_points: usize,
    /// Break when a step exceeds this multiple of the mean absolute step.
    pub break_threshold: f64,
    /// Skip break and range trimming, fit every point.
    pub full_mode: bool,
    /// Negative-sloped assay: values become `reference_point - value`.
    pub negative_mode: bool,
    pub reference_point: f64,
    /// Multiplier applied to fitted slopes (60 = per minute → per hour).
    pub scale_factor: f64,
    pub time_crop: Option<TimeCrop>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_r_squared: 0.99,
            min_points: 5,
            break_threshold: 7.0,
            full_mode: false,
            negative_mode: false,
            reference_point: 2.0,
            scale_factor: 60.0,
            time_crop: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("min_points must be at least 2, got {0}")]
    MinPoints(usize),
    #[error("min_r_squared must lie in [0, 1], got {0}")]
    MinRSquared(f64),
    #[error("break_threshold must be a positive number, got {0}")]
    BreakThreshold(f64),
    #[error("{name} must be finite, got {value}")]
    NotFinite { name: &'static str, value: f64 },
    #[error("crop start ({start}) must be before crop end ({end})")]
    Crop { start: f64, end: f64 },
}

impl AnalysisConfig {
    /// Read settings from a JSON file. Missing keys keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: AnalysisConfig = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_points < 2 {
            return Err(ConfigError::MinPoints(self.min_points));
        }
        if !(0.0..=1.0).contains(&self.min_r_squared) {
            return Err(ConfigError::MinRSquared(self.min_r_squared));
        }
        if !self.break_threshold.is_finite() || self.break_threshold <= 0.0 {
            return Err(ConfigError::BreakThreshold(self.break_threshold));
        }
        for (name, value) in [
            ("reference_point", self.reference_point),
            ("scale_factor", self.scale_factor),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NotFinite { name, value });
            }
        }
        if let Some(TimeCrop { start, end }) = self.time_crop {
            if !(start < end) {
                return Err(ConfigError::Crop { start, end });
            }
        }
        Ok(())
    }
}
