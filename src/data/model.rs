use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use thiserror::Error;

pub const PLATE_ROWS: usize = 8;
pub const PLATE_COLUMNS: usize = 12;
pub const ROW_LETTERS: &str = "ABCDEFGH";

// ---------------------------------------------------------------------------
// WellId – plate coordinate (row letter + column number)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WellIdError {
    #[error("well id is empty")]
    Empty,
    #[error("invalid row '{0}' (expected A-H)")]
    Row(char),
    #[error("invalid column '{0}' (expected 1-12)")]
    Column(String),
}

/// A well position on a 96-well plate.
///
/// `row` is zero-based (A = 0), `column` is one-based as printed on the plate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WellId {
    row: u8,
    column: u8,
}

impl WellId {
    pub fn new(row: usize, column: usize) -> Result<Self, WellIdError> {
        if row >= PLATE_ROWS {
            return Err(WellIdError::Row(char::from(b'A' + row.min(25) as u8)));
        }
        if !(1..=PLATE_COLUMNS).contains(&column) {
            return Err(WellIdError::Column(column.to_string()));
        }
        Ok(WellId {
            row: row as u8,
            column: column as u8,
        })
    }

    /// Build from a zero-based plate index (`row * 12 + column - 1`).
    pub fn from_index(index: usize) -> Option<Self> {
        if index >= PLATE_ROWS * PLATE_COLUMNS {
            return None;
        }
        Some(WellId {
            row: (index / PLATE_COLUMNS) as u8,
            column: (index % PLATE_COLUMNS + 1) as u8,
        })
    }

    pub fn row(&self) -> usize {
        self.row as usize
    }

    pub fn column(&self) -> usize {
        self.column as usize
    }

    /// Zero-based plate index, row-major.
    pub fn index(&self) -> usize {
        self.row() * PLATE_COLUMNS + self.column() - 1
    }

    pub fn row_letter(&self) -> char {
        char::from(b'A' + self.row)
    }

    /// All 96 positions in row-major order.
    pub fn all() -> impl Iterator<Item = WellId> {
        (0..PLATE_ROWS * PLATE_COLUMNS).filter_map(WellId::from_index)
    }
}

impl FromStr for WellId {
    type Err = WellIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let mut chars = s.chars();
        let letter = chars.next().ok_or(WellIdError::Empty)?.to_ascii_uppercase();
        let row = ROW_LETTERS
            .find(letter)
            .ok_or(WellIdError::Row(letter))?;
        let rest = chars.as_str();
        let column: usize = rest
            .parse()
            .map_err(|_| WellIdError::Column(rest.to_string()))?;
        WellId::new(row, column)
    }
}

impl fmt::Display for WellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.row_letter(), self.column)
    }
}

impl Serialize for WellId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ---------------------------------------------------------------------------
// Segment / Series – one well's time course
// ---------------------------------------------------------------------------

/// Half-open index range `[start, end)` into a [`Series`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub start: usize,
    pub end: usize,
}

impl Segment {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start < end, "empty segment {start}..{end}");
        Segment { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }
}

/// Time (minutes) / value pairs for a single well.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Series {
    pub times: Vec<f64>,
    pub values: Vec<f64>,
}

impl Series {
    /// Pair up times and values. Lengths must match.
    pub fn new(times: Vec<f64>, values: Vec<f64>) -> Self {
        assert_eq!(
            times.len(),
            values.len(),
            "series needs one value per timepoint"
        );
        Series { times, values }
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Copy of the points inside `segment`.
    pub fn slice(&self, segment: Segment) -> Series {
        Series {
            times: self.times[segment.start..segment.end].to_vec(),
            values: self.values[segment.start..segment.end].to_vec(),
        }
    }

    /// Drop everything past the first `len` points.
    pub fn truncate(&mut self, len: usize) {
        self.times.truncate(len);
        self.values.truncate(len);
    }

    pub fn first_time(&self) -> Option<f64> {
        self.times.first().copied()
    }

    pub fn last_time(&self) -> Option<f64> {
        self.times.last().copied()
    }
}

// ---------------------------------------------------------------------------
// Plate – the complete loaded reader export
// ---------------------------------------------------------------------------

/// Raw readings for one well column of the export.
#[derive(Debug, Clone)]
pub struct WellColumn {
    pub id: WellId,
    /// Header text as it appeared in the file.
    pub label: String,
    pub values: Vec<f64>,
}

/// A loaded plate: one shared time axis plus a value column per well.
#[derive(Debug, Clone)]
pub struct Plate {
    /// Display name, usually the input file stem.
    pub name: String,
    /// Timepoints in minutes, non-decreasing.
    pub times: Vec<f64>,
    pub wells: Vec<WellColumn>,
}

impl Plate {
    pub fn well(&self, id: WellId) -> Option<&WellColumn> {
        self.wells.iter().find(|w| w.id == id)
    }

    /// The series of one well on the shared time axis.
    pub fn series(&self, well: &WellColumn) -> Series {
        Series::new(self.times.clone(), well.values.clone())
    }
}
