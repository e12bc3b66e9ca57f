//! # Bhukamp Models
//!
//! Shared earthquake-source model types with deterministic numeric
//! construction. All recurrence math is pure; the same inputs always produce
//! bit-identical magnitude-frequency distributions.
//!
//! ## Modules
//! - `types` - Closed sum types for source regions, source types, fault
//!   recurrence styles, focal mechanisms and grid fault codes
//! - `fields` - Positional numeric field readers for whitespace-delimited
//!   record lines
//! - `moment` - Seismic moment and Gutenberg-Richter rate math
//! - `mfd` - Evenly discretized incremental magnitude-frequency distribution
//! - `gaussian` - Truncated-Gaussian MFD construction (aleatory spread)
//! - `gutenberg` - Truncated-exponential MFD construction (GR recurrence)
//! - `recurrence` - `ChData`, `GrData` and the `MagUncertainty` value type
//! - `builder` - CH / GR / GRB0 recurrence builders producing MFD lists
//! - `registry` - `NamedSource` and the source registry interface

pub mod builder;
pub mod fields;
pub mod gaussian;
pub mod gutenberg;
pub mod mfd;
pub mod moment;
pub mod recurrence;
pub mod registry;
pub mod types;

pub use builder::{build_ch_mfds, build_gr_mfds, build_grb0_mfds, GrOutcome};
pub use gaussian::gaussian_mfd;
pub use gutenberg::{gutenberg_richter_mfd, gutenberg_richter_mfd_at_rate};
pub use mfd::Mfd;
pub use recurrence::{ChData, GrData, MagUncertainty};
pub use registry::{NamedSource, SourceRegistry};
pub use types::{Balance, FaultCode, FaultType, FocalMech, RateType, SourceRegion, SourceType};

use serde::Serialize;
use thiserror::Error;

/// Accumulated degenerate-input warnings for one source.
///
/// Warnings never abort a parse; they are logged as they occur and carried
/// on the parse report for offline audit.
#[derive(Debug, Default, Clone, Serialize)]
pub struct WarningLog {
    entries: Vec<String>,
}

impl WarningLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a warning and emits it through `tracing`.
    pub fn push(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        tracing::warn!(warning = %msg);
        self.entries.push(msg);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// Moves all entries out, leaving the log empty.
    pub fn drain(&mut self) -> Vec<String> {
        std::mem::take(&mut self.entries)
    }
}

/// Fatal model-construction failures.
///
/// Anything recoverable (degenerate spacing, empty distributions) is a
/// warning pushed onto a [`WarningLog`], never an error. Errors here abort
/// the parse of the offending source.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Field at `pos` missing from a record line.
    #[error("missing field {pos} in record: {line:?}")]
    MissingField { line: String, pos: usize },

    /// Field at `pos` present but not parsable as a number.
    #[error("unparsable numeric field {pos} in record: {line:?}")]
    BadField { line: String, pos: usize },

    /// Unknown enum id read from a record line.
    #[error("unknown {what} id {id}")]
    UnknownId { what: &'static str, id: i64 },

    /// Aleatory magnitude spread cannot be combined with GR b=0 branching.
    #[error("aleatory sigma {sigma} is incompatible with GR b=0 branches")]
    AleatoryWithB0 { sigma: f64 },

    /// GR b=0 branches cannot represent a floating characteristic event.
    #[error("GR b=0 branch cannot handle floating CH (mMin {m_min} == mMax {m_max})")]
    B0FloatingCh { m_min: f64, m_max: f64 },

    /// A GR record whose magnitude range yields no bins at all.
    #[error("GR record spans no magnitude bins (mMin {m_min}, mMax {m_max})")]
    EmptyGrRecord { m_min: f64, m_max: f64 },
}
