//! Data layer: plate model, loading, and time cropping.
//!
//! Architecture:
//! ```text
//!  reader export (.txt / .tsv)
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse timestamps + well columns → Plate
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  Plate    │  shared time axis, Vec<WellColumn>
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  crop     │  optional time window → shorter Plate
//!   └──────────┘
//! ```

pub mod crop;
pub mod loader;
pub mod model;
