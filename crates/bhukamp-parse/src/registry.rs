//! Directory-backed source registry driven by a JSON manifest.
//!
//! The manifest pins the logic-tree weight of every source file; weights
//! live here, not in the source files, so a registry directory fully
//! determines a forecast. Layout relative to the manifest:
//!
//! ```text
//! manifest.json
//! sources/<path>    per-entry source files
//! conf/<name>       binary auxiliary grids, addressed as "../conf/<name>"
//! imr/craton        CEUS craton mask
//! imr/margin        CEUS extended-margin mask
//! ```

use crate::grid::{CratonMasks, GridResources};
use crate::ParseError;
use bhukamp_models::registry::{NamedSource, SourceRegistry};
use bhukamp_models::types::{SourceRegion, SourceType};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

const CONF_PREFIX: &str = "../conf/";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ManifestEntry {
    region: SourceRegion,
    #[serde(rename = "type")]
    source_type: SourceType,
    weight: f64,
    name: String,
    /// Path under `sources/`.
    path: String,
}

/// Registry over a manifest directory.
#[derive(Debug)]
pub struct FileRegistry {
    root: PathBuf,
    entries: Vec<ManifestEntry>,
}

impl FileRegistry {
    /// Opens the manifest at `path`; its parent directory becomes the
    /// registry root.
    pub fn open(path: &Path) -> Result<Self, ParseError> {
        let text = fs::read_to_string(path)?;
        let entries = serde_json::from_str(&text)?;
        let root = path.parent().unwrap_or_else(|| Path::new(".")).to_path_buf();
        Ok(FileRegistry { root, entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Loads the CEUS craton and margin masks, if the registry carries them.
    pub fn craton_masks(&self) -> Option<CratonMasks> {
        let craton = fs::read(self.root.join("imr").join("craton")).ok()?;
        let margin = fs::read(self.root.join("imr").join("margin")).ok()?;
        Some(CratonMasks::new(craton, margin))
    }

    fn read_lines(&self, entry: &ManifestEntry) -> Result<Vec<String>, ParseError> {
        let text = fs::read_to_string(self.root.join("sources").join(&entry.path))?;
        Ok(text.lines().map(str::to_string).collect())
    }
}

impl SourceRegistry for FileRegistry {
    fn resolve(
        &self,
        region: Option<SourceRegion>,
        source_type: Option<SourceType>,
        name: Option<&str>,
    ) -> Vec<NamedSource> {
        let mut out = Vec::new();
        for entry in &self.entries {
            if region.is_some_and(|r| r != entry.region) {
                continue;
            }
            if source_type.is_some_and(|t| t != entry.source_type) {
                continue;
            }
            if name.is_some_and(|n| n != entry.name) {
                continue;
            }
            match self.read_lines(entry) {
                Ok(lines) => out.push(NamedSource::new(
                    entry.region,
                    entry.source_type,
                    entry.weight,
                    entry.name.clone(),
                    lines,
                )),
                Err(err) => warn!(name = %entry.name, %err, "skipping unreadable source"),
            }
        }
        out
    }
}

impl GridResources for FileRegistry {
    fn grid_bytes(&self, path: &str) -> Result<Vec<u8>, ParseError> {
        let rel = path
            .strip_prefix(CONF_PREFIX)
            .ok_or_else(|| ParseError::BadResourcePath {
                path: path.to_string(),
            })?;
        Ok(fs::read(self.root.join("conf").join(rel))?)
    }
}
