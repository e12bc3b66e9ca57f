//! Polygonal and gridded geographic regions.

use crate::location::Location;
use serde::{Deserialize, Serialize};

/// Latitude/longitude bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl Bounds {
    /// Tight bounds around `locs` expanded by `buffer` degrees on all sides.
    /// Returns `None` for an empty slice.
    pub fn around(locs: &[Location], buffer: f64) -> Option<Bounds> {
        let first = locs.first()?;
        let mut b = Bounds {
            min_lat: first.lat,
            max_lat: first.lat,
            min_lon: first.lon,
            max_lon: first.lon,
        };
        for p in &locs[1..] {
            b.min_lat = b.min_lat.min(p.lat);
            b.max_lat = b.max_lat.max(p.lat);
            b.min_lon = b.min_lon.min(p.lon);
            b.max_lon = b.max_lon.max(p.lon);
        }
        b.min_lat -= buffer;
        b.max_lat += buffer;
        b.min_lon -= buffer;
        b.max_lon += buffer;
        Some(b)
    }

    pub fn contains(&self, p: &Location) -> bool {
        p.lat >= self.min_lat
            && p.lat <= self.max_lat
            && p.lon >= self.min_lon
            && p.lon <= self.max_lon
    }

    /// Union of two boxes.
    pub fn merge(&self, other: &Bounds) -> Bounds {
        Bounds {
            min_lat: self.min_lat.min(other.min_lat),
            max_lat: self.max_lat.max(other.max_lat),
            min_lon: self.min_lon.min(other.min_lon),
            max_lon: self.max_lon.max(other.max_lon),
        }
    }
}

/// Simple closed polygon over lat/lon.
///
/// Vertices are implicitly closed back to the first point. Containment is
/// even-odd ray casting in plate-carree coordinates, which matches how the
/// source-model borders are defined.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Region {
    border: Vec<Location>,
}

impl Region {
    pub fn new(border: Vec<Location>) -> Self {
        Region { border }
    }

    pub fn border(&self) -> &[Location] {
        &self.border
    }

    pub fn contains(&self, p: &Location) -> bool {
        let n = self.border.len();
        if n < 3 {
            return false;
        }
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let a = &self.border[i];
            let b = &self.border[j];
            if (a.lat > p.lat) != (b.lat > p.lat) {
                let x = (b.lon - a.lon) * (p.lat - a.lat) / (b.lat - a.lat) + a.lon;
                if p.lon < x {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }

    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::around(&self.border, 0.0)
    }
}

/// One of the eight compass neighbors of a grid node.
///
/// Ordering is clockwise from north; border tracing relies on `next()`
/// sweeping clockwise and `opposite()` reversing a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    North,
    Northeast,
    East,
    Southeast,
    South,
    Southwest,
    West,
    Northwest,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::Northeast,
        Direction::East,
        Direction::Southeast,
        Direction::South,
        Direction::Southwest,
        Direction::West,
        Direction::Northwest,
    ];

    /// Next direction clockwise.
    pub fn next(self) -> Direction {
        Direction::ALL[(self as usize + 1) % 8]
    }

    pub fn opposite(self) -> Direction {
        Direction::ALL[(self as usize + 4) % 8]
    }

    /// Row/column step, rows increasing northward.
    pub fn offset(self) -> (i64, i64) {
        match self {
            Direction::North => (1, 0),
            Direction::Northeast => (1, 1),
            Direction::East => (0, 1),
            Direction::Southeast => (-1, 1),
            Direction::South => (-1, 0),
            Direction::Southwest => (-1, -1),
            Direction::West => (0, -1),
            Direction::Northwest => (1, -1),
        }
    }
}

/// Uniformly spaced lat/lon node grid, bottom-left origin, row-major.
///
/// Node `0` is the southwest corner; indices increase eastward then
/// northward. This is the ordering the per-node rate files use after
/// re-indexing from their top-left storage order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GriddedRegion {
    pub min_lat: f64,
    pub min_lon: f64,
    pub d_lat: f64,
    pub d_lon: f64,
    pub n_rows: usize,
    pub n_cols: usize,
}

impl GriddedRegion {
    pub fn new(
        min_lat: f64,
        max_lat: f64,
        d_lat: f64,
        min_lon: f64,
        max_lon: f64,
        d_lon: f64,
    ) -> Self {
        let n_rows = ((max_lat - min_lat) / d_lat).round() as usize + 1;
        let n_cols = ((max_lon - min_lon) / d_lon).round() as usize + 1;
        GriddedRegion {
            min_lat,
            min_lon,
            d_lat,
            d_lon,
            n_rows,
            n_cols,
        }
    }

    pub fn node_count(&self) -> usize {
        self.n_rows * self.n_cols
    }

    pub fn location_for(&self, idx: usize) -> Location {
        let row = idx / self.n_cols;
        let col = idx % self.n_cols;
        Location::surface(
            self.min_lat + row as f64 * self.d_lat,
            self.min_lon + col as f64 * self.d_lon,
        )
    }

    /// Index one step in `dir` from `idx`, or `None` off-grid.
    pub fn move_index(&self, idx: usize, dir: Direction) -> Option<usize> {
        let (dr, dc) = dir.offset();
        let row = (idx / self.n_cols) as i64 + dr;
        let col = (idx % self.n_cols) as i64 + dc;
        if row < 0 || col < 0 || row >= self.n_rows as i64 || col >= self.n_cols as i64 {
            return None;
        }
        Some(row as usize * self.n_cols + col as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn grid() -> GriddedRegion {
        GriddedRegion::new(30.0, 31.0, 0.1, -120.0, -119.0, 0.1)
    }

    #[test]
    fn grid_dimensions_round_to_inclusive_node_counts() {
        let g = grid();
        assert_eq!(g.n_rows, 11);
        assert_eq!(g.n_cols, 11);
        assert_eq!(g.node_count(), 121);
    }

    #[test]
    fn location_for_walks_rows_south_to_north() {
        let g = grid();
        let sw = g.location_for(0);
        assert_relative_eq!(sw.lat, 30.0);
        assert_relative_eq!(sw.lon, -120.0);
        let second_row = g.location_for(11);
        assert_relative_eq!(second_row.lat, 30.1);
        assert_relative_eq!(second_row.lon, -120.0);
        let ne = g.location_for(120);
        assert_relative_eq!(ne.lat, 31.0);
        assert_relative_eq!(ne.lon, -119.0);
    }

    #[test]
    fn move_index_walks_neighbors_and_stops_at_edges() {
        let g = grid();
        // node 0 is the southwest corner
        assert_eq!(g.move_index(0, Direction::North), Some(11));
        assert_eq!(g.move_index(0, Direction::East), Some(1));
        assert_eq!(g.move_index(0, Direction::Northeast), Some(12));
        assert_eq!(g.move_index(0, Direction::South), None);
        assert_eq!(g.move_index(0, Direction::West), None);
        assert_eq!(g.move_index(10, Direction::East), None);
    }

    #[test]
    fn direction_cycle_and_opposite() {
        assert_eq!(Direction::North.next(), Direction::Northeast);
        assert_eq!(Direction::Northwest.next(), Direction::North);
        assert_eq!(Direction::West.opposite(), Direction::East);
        assert_eq!(Direction::Southeast.opposite(), Direction::Northwest);
    }

    #[test]
    fn polygon_containment_even_odd() {
        let r = Region::new(vec![
            Location::surface(0.0, 0.0),
            Location::surface(0.0, 2.0),
            Location::surface(2.0, 2.0),
            Location::surface(2.0, 0.0),
        ]);
        assert!(r.contains(&Location::surface(1.0, 1.0)));
        assert!(!r.contains(&Location::surface(3.0, 1.0)));
        assert!(!r.contains(&Location::surface(-0.5, 1.0)));
    }

    #[test]
    fn bounds_around_buffers_all_sides() {
        let b = Bounds::around(
            &[Location::surface(34.0, -118.0), Location::surface(36.0, -116.0)],
            0.5,
        )
        .unwrap();
        assert_relative_eq!(b.min_lat, 33.5);
        assert_relative_eq!(b.max_lat, 36.5);
        assert_relative_eq!(b.min_lon, -118.5);
        assert_relative_eq!(b.max_lon, -115.5);
        assert!(b.contains(&Location::surface(35.0, -117.0)));
    }
}
