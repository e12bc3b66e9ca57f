//! # Bhukamp Parse
//!
//! Parsers for the fixed-format 2008 NSHM source description files. Each
//! parser consumes one source's line sequence exactly once, forward-only,
//! and either returns a fully built source model or a fatal [`ParseError`];
//! no partial model ever escapes. Degenerate inputs (bad spacing, empty
//! distributions) are corrected or dropped with logged warnings that are
//! accumulated on a [`report::ParseReport`] for offline audit.
//!
//! ## Modules
//! - `cursor` - Forward-only typed line consumption and the two fixed
//!   header-skip routines
//! - `fault` - Fault source files
//! - `cluster` - New Madrid cluster files
//! - `subduction` - Two-trace interface files
//! - `grid` - Gridded background seismicity plus auxiliary grid overlays
//! - `gridio` - Little-endian float grids and Fortran logical masks
//! - `registry` - JSON-manifest, directory-backed source registry
//! - `report` - Per-source parse audit report

pub mod cluster;
pub mod cursor;
pub mod fault;
pub mod grid;
pub mod gridio;
pub mod registry;
pub mod report;
pub mod subduction;

pub use cluster::parse_cluster;
pub use cursor::LineCursor;
pub use fault::{parse_fault, FaultSet};
pub use grid::{parse_grid, CratonMasks, GridResources};
pub use registry::FileRegistry;
pub use report::ParseReport;
pub use subduction::parse_subduction;

use bhukamp_models::ModelError;
use thiserror::Error;

/// Fatal parse failures. Aborts the current source; warnings never appear
/// here.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Cursor ran past the end of the source's line sequence.
    #[error("unexpected end of input after line {line}")]
    UnexpectedEof { line: usize },

    /// Numeric field or model-constraint failure from the record layer.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// An auxiliary grid resource was shorter than `nRows x nCols`.
    #[error("grid resource {path:?} holds {actual} values, expected {expected}")]
    GridSize {
        path: String,
        expected: usize,
        actual: usize,
    },

    /// A grid resource path outside the configured resource root.
    #[error("bad grid resource path: {path:?}")]
    BadResourcePath { path: String },

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("manifest: {0}")]
    Manifest(#[from] serde_json::Error),
}
