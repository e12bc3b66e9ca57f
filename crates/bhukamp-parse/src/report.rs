//! Per-source parse audit reports.

use bhukamp_models::WarningLog;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Audit record for one parsed source file.
///
/// Warnings never abort a parse; they are accumulated here (and logged as
/// they occur) so a batch run leaves an offline-reviewable trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseReport {
    /// Source file name.
    pub source: String,
    /// Timestamp of the parse.
    pub timestamp: DateTime<Utc>,
    /// Whether the source parsed to a complete model.
    pub ok: bool,
    /// Fatal error text when `ok` is false.
    pub error: Option<String>,
    /// Accumulated degenerate-input warnings.
    pub warnings: Vec<String>,
    /// Source models produced (fault records, cluster groups, grid nodes).
    pub model_count: usize,
    /// MFDs produced across all models.
    pub mfd_count: usize,
}

impl ParseReport {
    pub fn new(source: impl Into<String>) -> Self {
        ParseReport {
            source: source.into(),
            timestamp: Utc::now(),
            ok: true,
            error: None,
            warnings: Vec::new(),
            model_count: 0,
            mfd_count: 0,
        }
    }

    /// Moves accumulated warnings out of a [`WarningLog`] onto the report.
    pub fn absorb(&mut self, warnings: &mut WarningLog) {
        self.warnings.extend(warnings.drain());
    }

    pub fn fail(&mut self, err: impl std::fmt::Display) {
        self.ok = false;
        self.error = Some(err.to_string());
    }
}
