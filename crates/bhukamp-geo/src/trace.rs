//! Fault trace polylines.

use crate::location::{azimuth_rad, horz_distance_fast, project, Location};
use serde::{Deserialize, Serialize};

/// Ordered surface polyline along the top edge of a fault.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FaultTrace {
    points: Vec<Location>,
}

impl FaultTrace {
    pub fn new(points: Vec<Location>) -> Self {
        FaultTrace { points }
    }

    pub fn points(&self) -> &[Location] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&Location> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&Location> {
        self.points.last()
    }

    /// Horizontal trace length in km.
    pub fn length(&self) -> f64 {
        self.points
            .windows(2)
            .map(|w| horz_distance_fast(&w[0], &w[1]))
            .sum()
    }

    /// Reverses point order in place. Used to correct negative-dip records
    /// so dip direction stays on the right-hand side of the trace.
    pub fn reverse(&mut self) {
        self.points.reverse();
    }

    /// Average strike over the whole trace, radians clockwise from north.
    pub fn strike_rad(&self) -> f64 {
        match (self.points.first(), self.points.last()) {
            (Some(a), Some(b)) if self.points.len() >= 2 => azimuth_rad(a, b),
            _ => 0.0,
        }
    }

    /// Resamples to uniform spacing as close to `spacing` km as divides the
    /// trace length evenly. Keeps both end points; depth is interpolated
    /// from the segment being walked. A trace shorter than `spacing`
    /// collapses to its two end points.
    pub fn resample(&self, spacing: f64) -> FaultTrace {
        if self.points.len() < 2 {
            return self.clone();
        }
        let length = self.length();
        let n_seg = ((length / spacing).round() as usize).max(1);
        let step = length / n_seg as f64;

        let mut out = Vec::with_capacity(n_seg + 1);
        out.push(self.points[0]);
        let mut seg = 0;
        let mut walked = 0.0; // distance covered in current segment
        for _ in 0..n_seg - 1 {
            let mut remain = step;
            loop {
                let a = &self.points[seg];
                let b = &self.points[seg + 1];
                let seg_len = horz_distance_fast(a, b);
                let left = seg_len - walked;
                if remain < left || seg + 2 == self.points.len() {
                    walked += remain;
                    let az = azimuth_rad(a, b);
                    let frac = if seg_len > 0.0 { walked / seg_len } else { 0.0 };
                    let mut p = project(a, az, walked);
                    p.depth = a.depth + frac * (b.depth - a.depth);
                    out.push(p);
                    break;
                }
                remain -= left;
                walked = 0.0;
                seg += 1;
            }
        }
        out.push(self.points[self.points.len() - 1]);
        FaultTrace { points: out }
    }
}
