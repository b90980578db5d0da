use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::config::{AnalysisConfig, TimeCrop};
use crate::data::model::WellId;
use crate::export::ExportFormat;

/// 96-well plate kinetic analysis with automatic linear range.
#[derive(Parser, Debug)]
#[command(name = "kinetic-plate")]
#[command(version)]
#[command(about = "96-well plate kinetic analysis with automatic linear range", long_about = None)]
pub struct Cli {
    /// Plate export: time column (hh:mm:ss or mm:ss) followed by well columns
    pub input: Option<PathBuf>,

    /// Wells to show in the detail view (e.g. --single A4 G7)
    #[arg(short = 's', long = "single", value_name = "WELL", num_args = 1..)]
    pub single: Vec<WellId>,

    /// Minimum r² for the automatic linear range
    #[arg(long = "min-r2", value_name = "R2")]
    pub min_r2: Option<f64>,

    /// Minimum number of points for the automatic linear range
    #[arg(long = "min-n", value_name = "N")]
    pub min_n: Option<usize>,

    /// Break detection threshold (multiple of the mean step)
    #[arg(long = "break-thresh", value_name = "X")]
    pub break_thresh: Option<f64>,

    /// Crop by time in minutes (e.g. --crop 0 5 keeps the first 5 minutes)
    #[arg(long = "crop", value_names = ["START", "END"], num_args = 2, allow_negative_numbers = true)]
    pub crop: Option<Vec<f64>>,

    /// No trimming, fit every point
    #[arg(long = "full")]
    pub full: bool,

    /// Negative-sloped assay
    #[arg(long = "negative")]
    pub negative: bool,

    /// Reference value for --negative (value' = reference - value)
    #[arg(long = "reference-point", value_name = "VALUE")]
    pub reference_point: Option<f64>,

    /// Slope multiplier (60 converts per minute to per hour)
    #[arg(long = "scale-factor", value_name = "X")]
    pub scale_factor: Option<f64>,

    /// JSON file with analysis settings; flags override it
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Save slopes to out_<name>.txt next to the input
    #[arg(short = 'o', long = "output")]
    pub output: bool,

    /// Slope table format
    #[arg(long = "format", value_enum, default_value = "tsv")]
    pub format: ExportFormat,

    /// Analyse and export without opening the viewer
    #[arg(long = "headless")]
    pub headless: bool,
}

impl Cli {
    /// Settings from `--config` (or defaults) with explicit flags applied on top.
    pub fn analysis_config(&self) -> Result<AnalysisConfig> {
        let mut config = match &self.config {
            Some(path) => AnalysisConfig::from_json_file(path)?,
            None => AnalysisConfig::default(),
        };

        if let Some(v) = self.min_r2 {
            config.min_r_squared = v;
        }
        if let Some(v) = self.min_n {
            config.min_points = v;
        }
        if let Some(v) = self.break_thresh {
            config.break_threshold = v;
        }
        if let Some(v) = self.reference_point {
            config.reference_point = v;
        }
        if let Some(v) = self.scale_factor {
            config.scale_factor = v;
        }
        if let Some([start, end]) = self.crop.as_deref() {
            config.time_crop = Some(TimeCrop {
                start: *start,
                end: *end,
            });
        }
        config.full_mode |= self.full;
        config.negative_mode |= self.negative;

        config.validate().context("invalid analysis settings")?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "kinetic-plate",
            "plate.txt",
            "--min-r2",
            "0.95",
            "--min-n",
            "8",
            "--crop",
            "0",
            "5",
            "--negative",
            "-s",
            "A4",
            "g7",
        ])
        .unwrap();

        assert_eq!(cli.input, Some(PathBuf::from("plate.txt")));
        assert_eq!(cli.single.len(), 2);
        assert_eq!(cli.single[1].to_string(), "G7");

        let config = cli.analysis_config().unwrap();
        assert_eq!(config.min_r_squared, 0.95);
        assert_eq!(config.min_points, 8);
        assert_eq!(config.time_crop, Some(TimeCrop { start: 0.0, end: 5.0 }));
        assert!(config.negative_mode);
        assert!(!config.full_mode);
        assert_eq!(config.break_threshold, 7.0);
    }

    #[test]
    fn invalid_well_is_rejected_at_parse_time() {
        assert!(Cli::try_parse_from(["kinetic-plate", "-s", "Z9"]).is_err());
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let cli = Cli::try_parse_from(["kinetic-plate", "--min-n", "1"]).unwrap();
        assert!(cli.analysis_config().is_err());
    }

    #[test]
    fn config_file_is_overridden_by_flags() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "min_points": 9, "scale_factor": 1.0 }"#).unwrap();

        let cli = Cli::try_parse_from([
            "kinetic-plate",
            "--config",
            path.to_str().unwrap(),
            "--scale-factor",
            "3600",
        ])
        .unwrap();
        let config = cli.analysis_config().unwrap();
        assert_eq!(config.min_points, 9);
        assert_eq!(config.scale_factor, 3600.0);
    }
}
