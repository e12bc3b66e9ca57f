//! # Bhukamp Sources
//!
//! Earthquake source entities and rupture materialization. Finite sources
//! (fault, cluster, subduction) are built field-by-field by the parsers,
//! then materialized exactly once by `init()`; gridded sources enumerate
//! point ruptures on demand per node so memory stays flat over very large
//! grids.
//!
//! ## Modules
//! - `point` - Point-source rupture engine (index layout, widths, the three
//!   distance metrics)
//! - `fault` - Fault sources and floating-rupture sets
//! - `cluster` - Grouped fault-source variants evaluated together
//! - `subduction` - Two-trace interface sources
//! - `grid` - Compacted grid node sets
//! - `forecast` - The ensemble surface consumed by the hazard engine

pub mod cluster;
pub mod fault;
pub mod forecast;
pub mod grid;
pub mod point;
pub mod subduction;

pub use cluster::ClusterSource;
pub use fault::{FaultRupture, FaultSource, FloatingRuptureSet};
pub use forecast::{Forecast, SourceAt, SourceModel};
pub use grid::GridSourceSet;
pub use point::{GeometryModel, MechWeights, PointRupture, PointRuptureSet};
pub use subduction::SubductionSource;

use thiserror::Error;

/// Source lifecycle failures.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Rupture or surface query before `init()`.
    #[error("source {name:?} queried before init()")]
    NotInitialized { name: String },
}
