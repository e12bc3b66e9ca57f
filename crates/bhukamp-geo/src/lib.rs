//! # Bhukamp Geo
//!
//! Geographic primitives for earthquake-source geometry. Distances use the
//! fast flat-earth approximation throughout; source dimensions (tens to a
//! few hundred km) keep the error well below the 1 km surface spacing.
//!
//! ## Modules
//! - `location` - Latitude/longitude/depth points and fast distance math
//! - `region` - Polygonal regions, bounds, gridded regions with 8-neighbor
//!   index moves
//! - `trace` - Fault trace polylines (length, resampling, reversal)
//! - `surface` - Gridded fault surfaces built from traces

pub mod location;
pub mod region;
pub mod surface;
pub mod trace;

pub use location::{azimuth_rad, horz_distance_fast, linear_distance_fast, project, Location};
pub use region::{Bounds, Direction, GriddedRegion, Region};
pub use surface::GriddedSurface;
pub use trace::FaultTrace;

/// Mean earth radius in km.
pub const EARTH_RADIUS_KM: f64 = 6371.0072;
