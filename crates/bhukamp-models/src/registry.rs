//! Named-source registry interface.
//!
//! The registry is an external collaborator: it owns the weight tables and
//! file inventory and hands parsers resolved, immutable line sequences.

use crate::types::{SourceRegion, SourceType};
use serde::{Deserialize, Serialize};

/// A resolved source: metadata plus its ordered record lines.
///
/// Immutable once resolved; parsers consume `lines` exactly once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedSource {
    pub region: SourceRegion,
    pub source_type: SourceType,
    /// Scalar weight applied to the whole source model.
    pub weight: f64,
    pub name: String,
    lines: Vec<String>,
}

impl NamedSource {
    pub fn new(
        region: SourceRegion,
        source_type: SourceType,
        weight: f64,
        name: impl Into<String>,
        lines: Vec<String>,
    ) -> Self {
        NamedSource {
            region,
            source_type,
            weight,
            name: name.into(),
            lines,
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

/// Registry lookup over region, type and name filters.
///
/// `None` filters match everything; results preserve registry order.
pub trait SourceRegistry {
    fn resolve(
        &self,
        region: Option<SourceRegion>,
        source_type: Option<SourceType>,
        name: Option<&str>,
    ) -> Vec<NamedSource>;
}
