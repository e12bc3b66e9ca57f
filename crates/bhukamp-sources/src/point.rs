//! Point-source rupture engine.
//!
//! Enumerates the ruptures of one grid node deterministically from a single
//! integer index over (magnitude bin x focal mechanism x footwall/hanging
//! wall side), and computes the three approximate distance metrics without
//! ever building a discretized surface. The distance formulas are exact
//! numeric contracts inherited from the 2008 national maps; do not "fix"
//! them.

use bhukamp_geo::Location;
use bhukamp_models::moment::rate_to_prob;
use bhukamp_models::types::FocalMech;
use bhukamp_models::Mfd;
use serde::{Deserialize, Serialize};

/// Rupture tops switch from the shallow to the deep configured depth at
/// this magnitude.
pub const M_DEPTH_CUT: f64 = 6.5;

/// Down-dip rupture bottoms are capped at this seismogenic depth in km.
pub const SEIS_DEPTH_KM: f64 = 14.0;

/// Joyner-Boore distances are floored at half the legacy lookup-table bin.
pub const R_JB_FLOOR_KM: f64 = 0.5;

/// Wells & Coppersmith (1994) median surface rupture length in km, all
/// mechanisms.
pub fn wc94_length(mag: f64) -> f64 {
    10f64.powf(-3.22 + 0.69 * mag)
}

/// Focal mechanism weights for a grid node. Need not sum to one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MechWeights {
    pub strike_slip: f64,
    pub reverse: f64,
    pub normal: f64,
}

impl MechWeights {
    pub fn weight(&self, mech: FocalMech) -> f64 {
        match mech {
            FocalMech::StrikeSlip => self.strike_slip,
            FocalMech::Reverse => self.reverse,
            FocalMech::Normal => self.normal,
        }
    }
}

/// Distance-approximation strategy for a point rupture.
///
/// One closed set of strategies replaces the historical
/// subclass-per-variant surfaces; all three share the same index math and
/// differ only in the rupture-distance computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeometryModel {
    /// Rupture collapses to its top edge: `Rrup = hypot(Rjb, zTop)`
    /// everywhere, zero horizontal width.
    Legacy,
    /// The 2013-map formulation: footwall to top edge, hanging wall blends
    /// linearly out to the cutoff radius `zBot * tan(dip)`.
    WidthAware,
    /// Exact point-to-segment distance in the dip cross-section.
    FullGeometry,
}

/// A single enumerated rupture, owned. Regenerated per index; never
/// retained as a collection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointRupture {
    pub mag: f64,
    pub mech: FocalMech,
    pub rake: f64,
    pub dip_deg: f64,
    pub z_top: f64,
    pub z_bot: f64,
    pub width_dd: f64,
    pub width_h: f64,
    pub footwall: bool,
    /// Annual rate after mechanism weighting.
    pub rate: f64,
    /// Exceedance probability over the forecast duration.
    pub prob: f64,
    pub hypo_depth: f64,
    geometry: GeometryModel,
}

impl PointRupture {
    /// Joyner-Boore distance for a site at horizontal distance `d` km.
    pub fn distance_jb(&self, d: f64) -> f64 {
        d.max(R_JB_FLOOR_KM)
    }

    /// Signed Rx: negative on the footwall, offset past the surface
    /// projection on the hanging wall.
    pub fn distance_x(&self, d: f64) -> f64 {
        let r_jb = self.distance_jb(d);
        if self.footwall {
            -r_jb
        } else {
            r_jb + self.width_h
        }
    }

    /// Closest rupture distance for a site at horizontal distance `d` km.
    pub fn distance_rup(&self, d: f64) -> f64 {
        let r_jb = self.distance_jb(d);
        match self.geometry {
            GeometryModel::Legacy => r_jb.hypot(self.z_top),
            GeometryModel::WidthAware => self.rup_distance_blended(r_jb),
            GeometryModel::FullGeometry => self.rup_distance_exact(r_jb),
        }
    }

    fn rup_distance_blended(&self, r_jb: f64) -> f64 {
        if self.footwall {
            return r_jb.hypot(self.z_top);
        }
        let dip_rad = self.dip_deg.to_radians();
        let r_cut = self.z_bot * dip_rad.tan();
        if r_jb > r_cut {
            return r_jb.hypot(self.z_bot);
        }
        // site between directly-over-rupture and the cutoff radius: take
        // the min of site-to-top-edge and site-to-rupture-normal at rJB 0,
        // the bottom-edge slant at the cutoff, and interpolate linearly
        let r_rup_0 = self.width_h.hypot(self.z_top).min(self.z_bot * dip_rad.cos());
        let r_rup_c = self.z_bot / dip_rad.cos();
        (r_rup_c - r_rup_0) * r_jb / r_cut + r_rup_0
    }

    /// Distance from the site to the rupture segment in the vertical
    /// cross-section perpendicular to strike. Footwall sites sit at
    /// `x = -rJB` from the top edge, hanging-wall sites at `x = rJB`.
    fn rup_distance_exact(&self, r_jb: f64) -> f64 {
        let x = if self.footwall { -r_jb } else { r_jb };
        // segment from (0, zTop) to (widthH, zBot)
        let (ax, az) = (0.0, self.z_top);
        let (bx, bz) = (self.width_h, self.z_bot);
        let (dx, dz) = (bx - ax, bz - az);
        let len2 = dx * dx + dz * dz;
        let t = if len2 > 0.0 {
            (((x - ax) * dx + (0.0 - az) * dz) / len2).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let (px, pz) = (ax + t * dx, az + t * dz);
        (x - px).hypot(pz)
    }
}

/// All ruptures of one grid node, enumerated on demand.
///
/// Index layout is fixed: strike-slip first, then reverse (footwall half,
/// hanging-wall half), then normal (same split). Each dipping mechanism
/// with non-zero weight contributes two sides; strike-slip one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointRuptureSet {
    pub loc: Location,
    mfd: Mfd,
    duration: f64,
    /// Rupture-top depths: `[0]` below the magnitude cut, `[1]` at or above.
    depths: [f64; 2],
    weights: MechWeights,
    geometry: GeometryModel,
    ss_idx: usize,
    rev_idx: usize,
    fw_idx_lo: usize,
    fw_idx_hi: usize,
    n_ruptures: usize,
}

impl PointRuptureSet {
    pub fn new(
        loc: Location,
        mfd: Mfd,
        duration: f64,
        depths: [f64; 2],
        weights: MechWeights,
        geometry: GeometryModel,
    ) -> Self {
        let n_mag = mfd.len();
        let ss_count = (weights.strike_slip.ceil() as usize) * n_mag;
        let rev_count = (weights.reverse.ceil() as usize) * n_mag * 2;
        let nor_count = (weights.normal.ceil() as usize) * n_mag * 2;
        PointRuptureSet {
            loc,
            mfd,
            duration,
            depths,
            weights,
            geometry,
            ss_idx: ss_count,
            rev_idx: ss_count + rev_count,
            fw_idx_lo: ss_count + rev_count / 2,
            fw_idx_hi: ss_count + rev_count + nor_count / 2,
            n_ruptures: ss_count + rev_count + nor_count,
        }
    }

    pub fn rupture_count(&self) -> usize {
        self.n_ruptures
    }

    pub fn mfd(&self) -> &Mfd {
        &self.mfd
    }

    /// Mechanism of the rupture at `idx`. Total over `[0, rupture_count)`.
    pub fn mech_for_index(&self, idx: usize) -> FocalMech {
        if idx < self.ss_idx {
            FocalMech::StrikeSlip
        } else if idx < self.rev_idx {
            FocalMech::Reverse
        } else {
            FocalMech::Normal
        }
    }

    /// Whether the rupture at `idx` sits on the footwall. Strike-slip is
    /// marked footwall so Rx comes out negative.
    pub fn footwall_for_index(&self, idx: usize) -> bool {
        if idx < self.fw_idx_lo {
            true
        } else if idx < self.rev_idx {
            false
        } else {
            idx < self.fw_idx_hi
        }
    }

    pub fn depth_for_mag(&self, mag: f64) -> f64 {
        if mag >= M_DEPTH_CUT {
            self.depths[1]
        } else {
            self.depths[0]
        }
    }

    /// Minimum of the aspect-ratio width from the WC94 length and the
    /// width remaining above the seismogenic depth floor.
    pub fn width_for(&self, mag: f64, z_top: f64, dip_rad: f64) -> f64 {
        let aspect = wc94_length(mag) / 1.5;
        let dd = (SEIS_DEPTH_KM - z_top) / dip_rad.sin();
        aspect.min(dd)
    }

    /// Enumerates the rupture at `idx`. Pure: the same index always yields
    /// the same owned value. `None` past the end.
    pub fn rupture_at(&self, idx: usize) -> Option<PointRupture> {
        if idx >= self.n_ruptures {
            return None;
        }
        let mech = self.mech_for_index(idx);
        let mut wt = self.weights.weight(mech);
        if mech != FocalMech::StrikeSlip {
            wt *= 0.5;
        }
        let mag_idx = idx % self.mfd.len();
        let mag = self.mfd.mag(mag_idx);
        let z_top = self.depth_for_mag(mag);
        let dip_rad = mech.dip().to_radians();
        let width_dd = self.width_for(mag, z_top, dip_rad);
        let z_bot = z_top + width_dd * dip_rad.sin();
        let rate = wt * self.mfd.rate(mag_idx);

        Some(PointRupture {
            mag,
            mech,
            rake: mech.rake(),
            dip_deg: mech.dip(),
            z_top,
            z_bot,
            width_dd,
            width_h: width_dd * dip_rad.cos(),
            footwall: self.footwall_for_index(idx),
            rate,
            prob: rate_to_prob(rate, self.duration),
            hypo_depth: z_top + dip_rad.sin() * width_dd / 2.0,
            geometry: self.geometry,
        })
    }

    pub fn ruptures(&self) -> impl Iterator<Item = PointRupture> + '_ {
        (0..self.n_ruptures).filter_map(move |i| self.rupture_at(i))
    }
}
