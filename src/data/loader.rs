use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};
use thiserror::Error;

use super::model::{Plate, WellColumn, WellId};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a kinetic plate export from a file.
///
/// Expected layout (tab-separated, as written by the plate reader software):
///
/// ```text
/// Time      A1     A2     ...   H12
/// 0:00:00   0.051  0.049  ...   0.050
/// 0:00:30   0.062  0.050  ...   0.071
/// ```
///
/// The first column holds `hh:mm:ss` or `mm:ss` timestamps, every other
/// column is a well named by its plate position. Empty cells read as `0`;
/// unreadable cells load as `NaN` so only that well fails analysis.
pub fn load_file(path: &Path) -> Result<Plate> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("opening plate file {}", path.display()))?;
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("plate")
        .to_string();
    load_reader(file, &name)
}

/// Parse a plate export from any reader. `name` becomes [`Plate::name`].
pub fn load_reader<R: Read>(input: R, name: &str) -> Result<Plate> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers: Vec<String> = reader
        .headers()
        .context("reading header row")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    if headers.len() < 2 {
        bail!("expected a time column followed by well columns, got {} column(s)", headers.len());
    }

    // Column index in the file → well id, skipping anything that isn't a well.
    let mut well_cols: Vec<(usize, WellId)> = Vec::new();
    for (idx, header) in headers.iter().enumerate().skip(1) {
        match header.parse::<WellId>() {
            Ok(id) => {
                if well_cols.iter().any(|(_, seen)| *seen == id) {
                    bail!("well {id} appears more than once in the header");
                }
                well_cols.push((idx, id));
            }
            Err(e) => log::warn!("Skipping column '{header}': {e}"),
        }
    }
    if well_cols.is_empty() {
        bail!("no well columns (A1..H12) found in header");
    }

    let mut times = Vec::new();
    let mut columns: Vec<Vec<f64>> = vec![Vec::new(); well_cols.len()];

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("reading row {row_no}"))?;
        let time_text = record.get(0).unwrap_or("");
        if time_text.is_empty() && record.iter().all(|f| f.is_empty()) {
            continue;
        }

        let time = parse_time_minutes(time_text).with_context(|| format!("row {row_no}"))?;
        if let Some(&prev) = times.last() {
            if time < prev {
                bail!("row {row_no}: time {time_text} goes backwards");
            }
        }
        times.push(time);

        for ((col_idx, id), column) in well_cols.iter().zip(columns.iter_mut()) {
            let cell = record.get(*col_idx).unwrap_or("");
            let value = parse_reading(cell).unwrap_or_else(|| {
                log::warn!("row {row_no}, well {id}: unreadable value '{cell}', treating as missing");
                f64::NAN
            });
            column.push(value);
        }
    }

    if times.is_empty() {
        bail!("plate file contains no readings");
    }

    let wells = well_cols
        .into_iter()
        .zip(columns)
        .map(|((col_idx, id), values)| WellColumn {
            id,
            label: headers[col_idx].clone(),
            values,
        })
        .collect::<Vec<_>>();

    log::info!(
        "Loaded plate '{name}': {} wells x {} timepoints",
        wells.len(),
        times.len()
    );

    Ok(Plate {
        name: name.to_string(),
        times,
        wells,
    })
}

// ---------------------------------------------------------------------------
// Cell parsing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("could not read time '{text}' (expected hh:mm:ss or mm:ss)")]
pub struct TimeParseError {
    pub text: String,
}

/// Convert `hh:mm:ss` or `mm:ss` into minutes.
pub fn parse_time_minutes(text: &str) -> Result<f64, TimeParseError> {
    let err = || TimeParseError {
        text: text.to_string(),
    };
    let parts = text
        .trim()
        .split(':')
        .map(|p| p.trim().parse::<u32>().map_err(|_| err()))
        .collect::<Result<Vec<_>, _>>()?;

    match parts.as_slice() {
        [m, s] => Ok(*m as f64 + *s as f64 / 60.0),
        [h, m, s] => Ok(*h as f64 * 60.0 + *m as f64 + *s as f64 / 60.0),
        _ => Err(err()),
    }
}

/// Empty cells read as `0`. Anything that isn't a finite number (`NaN`,
/// `inf`, saturation markers like `OVRFLW`) is `None`.
fn parse_reading(cell: &str) -> Option<f64> {
    if cell.is_empty() {
        return Some(0.0);
    }
    cell.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "Time\tA1\tA2\tT° 600\tH12\n\
                          0:00\t0.10\t0.20\t30.0\t1\n\
                          0:30\t0.15\t\t30.1\t2\n\
                          1:00\t0.20\t0.30\t30.0\t3\n";

    #[test]
    fn parses_both_time_formats() {
        assert_eq!(parse_time_minutes("2:30").unwrap(), 2.5);
        assert_eq!(parse_time_minutes("1:02:30").unwrap(), 62.5);
        assert_eq!(parse_time_minutes(" 0:00:00 ").unwrap(), 0.0);
    }

    #[test]
    fn rejects_malformed_time() {
        assert!(parse_time_minutes("12").is_err());
        assert!(parse_time_minutes("1:2:3:4").is_err());
        let err = parse_time_minutes("ab:cd").unwrap_err();
        assert_eq!(err.text, "ab:cd");
    }

    #[test]
    fn loads_wells_and_skips_other_columns() {
        let plate = load_reader(SAMPLE.as_bytes(), "demo").unwrap();
        assert_eq!(plate.name, "demo");
        assert_eq!(plate.times, vec![0.0, 0.5, 1.0]);
        assert_eq!(plate.wells.len(), 3);

        let a2 = plate.well("A2".parse().unwrap()).unwrap();
        assert_eq!(a2.values, vec![0.20, 0.0, 0.30]);
        let h12 = plate.well("H12".parse().unwrap()).unwrap();
        assert_eq!(h12.values, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn malformed_time_is_reported() {
        let text = "Time\tA1\n0:00\t1\nnoon\t2\n";
        let err = load_reader(text.as_bytes(), "bad").unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("row 1"), "{msg}");
        assert!(msg.contains("noon"), "{msg}");
    }

    #[test]
    fn unreadable_cells_stay_on_their_well() {
        let text = "Time\tA1\tA2\n0:00\tNaN\t1\n0:30\tOVRFLW\t2\n1:00\tinf\t3\n";
        let plate = load_reader(text.as_bytes(), "saturated").unwrap();
        let a1 = plate.well("A1".parse().unwrap()).unwrap();
        assert_eq!(a1.values.len(), 3);
        assert!(a1.values.iter().all(|v| v.is_nan()));
        let a2 = plate.well("A2".parse().unwrap()).unwrap();
        assert_eq!(a2.values, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn duplicate_well_header_is_rejected() {
        let text = "Time\tA1\ta1\n0:00\t1\t2\n";
        let err = load_reader(text.as_bytes(), "dup").unwrap_err();
        assert!(err.to_string().contains("more than once"), "{err}");
    }

    #[test]
    fn backwards_time_is_rejected() {
        let text = "Time\tA1\n0:10\t1\n0:05\t2\n";
        assert!(load_reader(text.as_bytes(), "bad").is_err());
    }

    #[test]
    fn header_without_wells_is_rejected() {
        let text = "Time\tTemp\n0:00\t30\n";
        assert!(load_reader(text.as_bytes(), "bad").is_err());
    }

    #[test]
    fn load_file_uses_file_stem_as_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("screen_01.txt");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(SAMPLE.as_bytes()).unwrap();
        drop(f);

        let plate = load_file(&path).unwrap();
        assert_eq!(plate.name, "screen_01");
        assert_eq!(plate.times.len(), 3);
    }
}
