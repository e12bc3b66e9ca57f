//! Subduction interface sources.

use crate::fault::{FaultRupture, FloatingRuptureSet, SURFACE_SPACING_KM};
use crate::point::wc94_length;
use crate::SourceError;
use bhukamp_geo::{Bounds, FaultTrace, GriddedSurface};
use bhukamp_models::types::{FaultType, FocalMech};
use bhukamp_models::Mfd;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Interface GR records float only below this magnitude; everything at or
/// above ruptures the whole interface.
pub const FLOAT_MAG_CUTOFF: f64 = 8.8;

/// A subduction interface: an upper and a lower trace approximating a
/// non-planar dipping surface between them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubductionSource {
    pub name: String,
    pub fault_type: FaultType,
    pub mech: FocalMech,
    pub upper_trace: FaultTrace,
    pub lower_trace: FaultTrace,
    pub mfds: Vec<Mfd>,
    surface: Option<GriddedSurface>,
    rupture_sets: Vec<FloatingRuptureSet>,
}

impl SubductionSource {
    pub fn new(
        name: impl Into<String>,
        fault_type: FaultType,
        mech: FocalMech,
        upper_trace: FaultTrace,
        lower_trace: FaultTrace,
    ) -> Self {
        SubductionSource {
            name: name.into(),
            fault_type,
            mech,
            upper_trace,
            lower_trace,
            mfds: Vec::new(),
            surface: None,
            rupture_sets: Vec::new(),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.surface.is_some()
    }

    /// Materializes the two-trace surface. A multi-bin MFD floats only its
    /// bins below the float cutoff.
    pub fn init(&mut self) {
        let surface = GriddedSurface::between_traces(
            &self.upper_trace,
            &self.lower_trace,
            SURFACE_SPACING_KM,
        );
        let n_cols = surface.n_cols();
        self.rupture_sets.clear();
        for mfd in &self.mfds {
            let multi = mfd.len() > 1;
            for (mag, rate) in mfd.iter() {
                if rate == 0.0 {
                    continue;
                }
                if multi && mag < FLOAT_MAG_CUTOFF {
                    let rup_cols =
                        ((wc94_length(mag) / SURFACE_SPACING_KM).round() as usize + 1).min(n_cols);
                    let n_positions = n_cols - rup_cols + 1;
                    self.rupture_sets.push(FloatingRuptureSet {
                        mag,
                        rate: rate / n_positions as f64,
                        n_cols: rup_cols,
                        n_positions,
                    });
                } else {
                    self.rupture_sets.push(FloatingRuptureSet {
                        mag,
                        rate,
                        n_cols,
                        n_positions: 1,
                    });
                }
            }
        }
        if self.rupture_sets.is_empty() {
            warn!(source = %self.name, "no ruptures materialized");
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
            None => {
                let mut pts = self.upper_trace.points().to_vec();
                pts.extend_from_slice(self.lower_trace.points());
                Bounds::around(&pts, 0.0)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bhukamp_geo::Location;

    fn cascadia_like() -> SubductionSource {
        SubductionSource::new(
            "Cascadia M9",
            FaultType::Ch,
            FocalMech::Reverse,
            FaultTrace::new(vec![
                Location::new(40.3, -124.6, 5.0),
                Location::new(41.3, -124.6, 5.0),
            ]),
            FaultTrace::new(vec![
                Location::new(40.3, -124.0, 20.0),
                Location::new(41.3, -124.0, 20.0),
            ]),
        )
    }

    #[test]
    fn characteristic_interface_never_floats() {
        let mut s = cascadia_like();
        s.mfds.push(Mfd::single(9.0, 1.0 / 500.0));
        s.init();
        assert_eq!(s.rupture_count(), 1);
        let r = s.rupture_at(0).unwrap();
        assert_eq!(r.n_cols, s.surface().unwrap().n_cols());
    }

    #[test]
    fn gr_bins_float_below_cutoff_only() {
        let mut s = cascadia_like();
        // bins at 8.75 and 8.85 straddle the cutoff
        s.mfds
            .push(Mfd::with_rates(8.75, 0.1, vec![1e-4, 1e-4]));
        s.init();
        let sets = s.rupture_sets();
        assert_eq!(sets.len(), 2);
        assert!(sets[0].n_positions >= 1);
        assert_eq!(sets[1].n_positions, 1);
    }

    #[test]
    fn surface_spans_the_two_traces() {
        let mut s = cascadia_like();
        s.mfds.push(Mfd::single(9.0, 1e-3));
        s.init();
        let surf = s.surface().unwrap();
        assert!(surf.get(0, 0).depth < surf.get(surf.n_rows() - 1, 0).depth);
    }
}
