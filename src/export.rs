use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;
use eframe::egui::ColorImage;
use serde::Serialize;

use crate::analysis::adjustment::Adjustment;
use crate::analysis::pipeline::PlateAnalysis;
use crate::data::model::WellId;

// ---------------------------------------------------------------------------
// Slope table export
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ExportFormat {
    /// Tab-separated `well slope r_squared` table.
    #[default]
    Tsv,
    /// JSON array of per-well records.
    Json,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Tsv => "txt",
            ExportFormat::Json => "json",
        }
    }
}

/// One exported row. Failed wells carry `None` slope / r².
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlopeRecord {
    pub well: WellId,
    pub slope: Option<f64>,
    pub r_squared: Option<f64>,
    pub adjustment: Adjustment,
}

pub fn records(analysis: &PlateAnalysis) -> Vec<SlopeRecord> {
    analysis
        .wells
        .iter()
        .map(|w| SlopeRecord {
            well: w.id,
            slope: w.reporting_slope(),
            r_squared: w.r_squared(),
            adjustment: w.adjustment,
        })
        .collect()
}

/// `out_<plate>.<ext>` next to the input file.
pub fn default_output_path(input: &Path, plate_name: &str, format: ExportFormat) -> PathBuf {
    out_path(input, plate_name, format.extension())
}

/// `out_<plate>.png` next to the input file.
pub fn default_image_path(input: &Path, plate_name: &str) -> PathBuf {
    out_path(input, plate_name, "png")
}

fn out_path(input: &Path, plate_name: &str, extension: &str) -> PathBuf {
    let file_name = format!("out_{plate_name}.{extension}");
    match input.parent() {
        Some(dir) => dir.join(file_name),
        None => PathBuf::from(file_name),
    }
}

pub fn write_tsv<W: Write>(analysis: &PlateAnalysis, out: W) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_writer(out);
    writer
        .write_record(["well", "slope", "r_squared"])
        .context("writing header")?;
    for rec in records(analysis) {
        let fmt = |v: Option<f64>| v.map(|v| v.to_string()).unwrap_or_default();
        writer
            .write_record([rec.well.to_string(), fmt(rec.slope), fmt(rec.r_squared)])
            .with_context(|| format!("writing well {}", rec.well))?;
    }
    writer.flush().context("flushing slope table")?;
    Ok(())
}

pub fn write_json<W: Write>(analysis: &PlateAnalysis, out: W) -> Result<()> {
    serde_json::to_writer_pretty(out, &records(analysis)).context("writing JSON records")?;
    Ok(())
}

pub fn export_to_path(analysis: &PlateAnalysis, path: &Path, format: ExportFormat) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let out = std::io::BufWriter::new(file);
    match format {
        ExportFormat::Tsv => write_tsv(analysis, out)?,
        ExportFormat::Json => write_json(analysis, out)?,
    }
    log::info!("Wrote slopes for {} wells to {}", analysis.wells.len(), path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Plate image export
// ---------------------------------------------------------------------------

/// Encode a captured frame as PNG (format picked from the extension).
pub fn write_plate_image(frame: &ColorImage, path: &Path) -> Result<()> {
    let [width, height] = frame.size;
    let rgba: Vec<u8> = frame.pixels.iter().flat_map(|c| c.to_array()).collect();
    let buffer = image::RgbaImage::from_raw(width as u32, height as u32, rgba)
        .context("captured frame does not match its pixel buffer")?;
    buffer
        .save(path)
        .with_context(|| format!("writing plate image {}", path.display()))?;
    log::info!("Wrote {width}x{height} plate image to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::pipeline::analyze_plate;
    use crate::config::AnalysisConfig;
    use crate::data::model::{Plate, WellColumn};

    fn analysis() -> PlateAnalysis {
        let plate = Plate {
            name: "screen".into(),
            times: vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0],
            wells: vec![
                WellColumn {
                    id: "A1".parse().unwrap(),
                    label: "A1".into(),
                    values: vec![0.0, 0.5, 1.0, 1.5, 2.0, 2.5],
                },
                WellColumn {
                    id: "B2".parse().unwrap(),
                    label: "B2".into(),
                    values: vec![1.0; 6],
                },
            ],
        };
        analyze_plate(&plate, &AnalysisConfig::default()).unwrap()
    }

    #[test]
    fn tsv_has_header_and_one_row_per_well() {
        let mut buf = Vec::new();
        write_tsv(&analysis(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "well\tslope\tr_squared");
        assert_eq!(lines.len(), 3);

        let a1: Vec<&str> = lines[1].split('\t').collect();
        assert_eq!(a1[0], "A1");
        assert!((a1[1].parse::<f64>().unwrap() - 30.0).abs() < 1e-9);
        assert!((a1[2].parse::<f64>().unwrap() - 1.0).abs() < 1e-9);
        assert_eq!(lines[2], "B2\t0\t0");
    }

    #[test]
    fn json_records_name_wells() {
        let mut buf = Vec::new();
        write_json(&analysis(), &mut buf).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        let rows = value.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["well"], "A1");
        assert_eq!(rows[1]["adjustment"], "none");
    }

    #[test]
    fn writes_next_to_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("screen.txt");
        let path = default_output_path(&input, "screen", ExportFormat::Tsv);
        assert_eq!(path, dir.path().join("out_screen.txt"));

        export_to_path(&analysis(), &path, ExportFormat::Tsv).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("well\tslope\tr_squared"));
    }

    #[test]
    fn plate_image_is_written_as_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = default_image_path(&dir.path().join("screen.txt"), "screen");
        assert_eq!(path, dir.path().join("out_screen.png"));

        let frame = ColorImage::new([4, 3], eframe::egui::Color32::RED);
        write_plate_image(&frame, &path).unwrap();

        let decoded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (4, 3));
        assert_eq!(decoded.get_pixel(0, 0).0, [255, 0, 0, 255]);
    }
}
