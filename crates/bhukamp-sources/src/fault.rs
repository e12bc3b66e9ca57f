//! Finite fault sources and floating-rupture materialization.

use crate::point::wc94_length;
use crate::SourceError;
use bhukamp_geo::{Bounds, FaultTrace, GriddedSurface};
use bhukamp_models::types::{FaultType, FocalMech};
use bhukamp_models::Mfd;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Along-strike and down-dip surface sampling in km.
pub const SURFACE_SPACING_KM: f64 = 1.0;

/// One MFD bin materialized over a surface: a full-surface rupture or a
/// set of equal-rate positions floated along strike.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloatingRuptureSet {
    pub mag: f64,
    /// Annual rate per position (bin rate divided across positions).
    pub rate: f64,
    /// Along-strike columns one rupture spans.
    pub n_cols: usize,
    /// Number of along-strike start positions.
    pub n_positions: usize,
}

/// A single finite rupture: a column window over the source surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaultRupture {
    pub mag: f64,
    /// Annual rate for this position.
    pub rate: f64,
    pub first_col: usize,
    pub n_cols: usize,
}

/// A named fault source: trace geometry plus a weighted MFD list.
///
/// Built field-by-field by a parser, then materialized exactly once by
/// [`FaultSource::init`]; never mutated afterward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaultSource {
    pub name: String,
    pub fault_type: FaultType,
    pub mech: FocalMech,
    pub trace: FaultTrace,
    pub dip: f64,
    pub width: f64,
    pub top_depth: f64,
    /// Whether multi-bin MFDs float along strike.
    pub floats: bool,
    pub mfds: Vec<Mfd>,
    surface: Option<GriddedSurface>,
    rupture_sets: Vec<FloatingRuptureSet>,
}

impl FaultSource {
    pub fn new(
        name: impl Into<String>,
        fault_type: FaultType,
        mech: FocalMech,
        trace: FaultTrace,
        dip: f64,
        width: f64,
        top_depth: f64,
    ) -> Self {
        FaultSource {
            name: name.into(),
            fault_type,
            mech,
            trace,
            dip,
            width,
            top_depth,
            floats: true,
            mfds: Vec::new(),
            surface: None,
            rupture_sets: Vec::new(),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.surface.is_some()
    }

    /// Materializes the gridded surface and one rupture set per MFD bin.
    /// Single-bin MFDs rupture the full surface; multi-bin MFDs float
    /// along strike when the source floats, with each bin's rate divided
    /// evenly across positions.
    pub fn init(&mut self) {
        let surface = GriddedSurface::from_trace(
            &self.trace,
            self.dip,
            self.width,
            self.top_depth,
            SURFACE_SPACING_KM,
        );
        let n_cols = surface.n_cols();
        self.rupture_sets.clear();
        for mfd in &self.mfds {
            let floats = self.floats && mfd.len() > 1;
            for (mag, rate) in mfd.iter() {
                if rate == 0.0 {
                    continue;
                }
                self.rupture_sets
                    .push(float_bin(mag, rate, n_cols, floats));
            }
        }
        if self.rupture_sets.is_empty() {
            warn!(source = %self.name, "no ruptures materialized");
        } else {
            debug!(source = %self.name, sets = self.rupture_sets.len(), "materialized");
        }
        self.surface = Some(surface);
    }

    pub fn surface(&self) -> Result<&GriddedSurface, SourceError> {
        self.surface.as_ref().ok_or(SourceError::NotInitialized {
            name: self.name.clone(),
        })
    }

    pub fn rupture_sets(&self) -> &[FloatingRuptureSet] {
        &self.rupture_sets
    }

    pub fn rupture_count(&self) -> usize {
        self.rupture_sets.iter().map(|s| s.n_positions).sum()
    }

    /// Rupture at `idx` in rupture-set order, positions innermost.
    pub fn rupture_at(&self, idx: usize) -> Option<FaultRupture> {
        let mut rem = idx;
        for set in &self.rupture_sets {
            if rem < set.n_positions {
                return Some(FaultRupture {
                    mag: set.mag,
                    rate: set.rate,
                    first_col: rem,
                    n_cols: set.n_cols,
                });
            }
            rem -= set.n_positions;
        }
        None
    }

    pub fn bounds(&self) -> Option<Bounds> {
        match &self.surface {
            Some(s) => s.bounds(),
            None => Bounds::around(self.trace.points(), 0.0),
        }
    }
}

/// Splits one MFD bin into its floating positions over `n_cols` surface
/// columns.
fn float_bin(mag: f64, rate: f64, n_cols: usize, floats: bool) -> FloatingRuptureSet {
    if !floats {
        return FloatingRuptureSet {
            mag,
            rate,
            n_cols,
            n_positions: 1,
        };
    }
    let len_km = wc94_length(mag);
    let rup_cols = ((len_km / SURFACE_SPACING_KM).round() as usize + 1).min(n_cols);
    let n_positions = n_cols - rup_cols + 1;
    FloatingRuptureSet {
        mag,
        rate: rate / n_positions as f64,
        n_cols: rup_cols,
        n_positions,
    }
}
