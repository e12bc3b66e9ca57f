//! Gridded fault surfaces.

use crate::location::{project, Location};
use crate::region::Bounds;
use crate::trace::FaultTrace;
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;

/// Evenly discretized fault surface, row-major from the top edge down dip.
///
/// Row 0 is the (resampled) upper trace; each subsequent row steps one grid
/// spacing down dip. Columns run along strike.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GriddedSurface {
    n_rows: usize,
    n_cols: usize,
    locs: Vec<Location>,
}

impl GriddedSurface {
    /// Builds a planar surface from a trace, dip (degrees), down-dip width
    /// and top depth, sampled at `spacing` km along strike and down dip.
    ///
    /// The dip direction is 90 degrees clockwise of the average strike, so
    /// trace order determines which side the surface extends toward.
    pub fn from_trace(
        trace: &FaultTrace,
        dip_deg: f64,
        width: f64,
        top_depth: f64,
        spacing: f64,
    ) -> Self {
        let top: Vec<Location> = trace
            .resample(spacing)
            .points()
            .iter()
            .map(|p| p.with_depth(top_depth))
            .collect();
        let n_cols = top.len();
        let n_rows = ((width / spacing).round() as usize).max(1) + 1;
        let d_down = if n_rows > 1 {
            width / (n_rows - 1) as f64
        } else {
            0.0
        };
        let dip_rad = dip_deg.to_radians();
        let dip_dir = trace.strike_rad() + FRAC_PI_2;
        let horz_step = d_down * dip_rad.cos();
        let vert_step = d_down * dip_rad.sin();

        let mut locs = Vec::with_capacity(n_rows * n_cols);
        for row in 0..n_rows {
            let h = row as f64 * horz_step;
            let z = top_depth + row as f64 * vert_step;
            for p in &top {
                let q = if h > 0.0 { project(p, dip_dir, h) } else { *p };
                locs.push(q.with_depth(z));
            }
        }
        GriddedSurface {
            n_rows,
            n_cols,
            locs,
        }
    }

    /// Builds a surface spanning two traces, interpolating rows linearly
    /// between corresponding upper and lower points. Approximates the
    /// non-planar interfaces that subduction sources describe with an
    /// explicit lower trace.
    pub fn between_traces(upper: &FaultTrace, lower: &FaultTrace, spacing: f64) -> Self {
        let top = upper.resample(spacing);
        let n_cols = top.len().max(2);
        // match the lower trace column for column
        let bottom = lower.resample(lower.length() / (n_cols - 1) as f64);
        let n_cols = top.len().min(bottom.len());

        let mean_sep: f64 = (0..n_cols)
            .map(|j| {
                crate::location::linear_distance_fast(&top.points()[j], &bottom.points()[j])
            })
            .sum::<f64>()
            / n_cols as f64;
        let n_rows = ((mean_sep / spacing).round() as usize).max(1) + 1;

        let mut locs = Vec::with_capacity(n_rows * n_cols);
        for row in 0..n_rows {
            let f = row as f64 / (n_rows - 1) as f64;
            for j in 0..n_cols {
                let a = &top.points()[j];
                let b = &bottom.points()[j];
                locs.push(Location::new(
                    a.lat + f * (b.lat - a.lat),
                    a.lon + f * (b.lon - a.lon),
                    a.depth + f * (b.depth - a.depth),
                ));
            }
        }
        GriddedSurface {
            n_rows,
            n_cols,
            locs,
        }
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    pub fn get(&self, row: usize, col: usize) -> &Location {
        &self.locs[row * self.n_cols + col]
    }

    pub fn locations(&self) -> &[Location] {
        &self.locs
    }

    pub fn top_depth(&self) -> f64 {
        self.locs.first().map(|p| p.depth).unwrap_or(0.0)
    }

    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::around(&self.locs, 0.0)
    }
}
