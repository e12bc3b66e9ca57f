//! Geographic locations and fast distance math.

use crate::EARTH_RADIUS_KM;
use serde::{Deserialize, Serialize};

/// A point on or below the earth surface.
///
/// Latitude and longitude in decimal degrees, depth in km positive down.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
    pub depth: f64,
}

impl Location {
    pub fn new(lat: f64, lon: f64, depth: f64) -> Self {
        Location { lat, lon, depth }
    }

    /// Surface point at zero depth.
    pub fn surface(lat: f64, lon: f64) -> Self {
        Location { lat, lon, depth: 0.0 }
    }

    pub fn with_depth(self, depth: f64) -> Self {
        Location { depth, ..self }
    }
}

/// Fast horizontal distance in km, flat-earth approximation.
///
/// Scales the longitude delta by the cosine of the mean latitude. Accurate
/// to well under 1% for separations below a few hundred km.
pub fn horz_distance_fast(p1: &Location, p2: &Location) -> f64 {
    let d_lat = (p2.lat - p1.lat).to_radians();
    let d_lon = (p2.lon - p1.lon).to_radians();
    let mid_lat = ((p1.lat + p2.lat) / 2.0).to_radians();
    let dy = d_lat * EARTH_RADIUS_KM;
    let dx = d_lon * EARTH_RADIUS_KM * mid_lat.cos();
    dy.hypot(dx)
}

/// Slant distance in km between two points at depth.
pub fn linear_distance_fast(p1: &Location, p2: &Location) -> f64 {
    horz_distance_fast(p1, p2).hypot(p2.depth - p1.depth)
}

/// Azimuth from `p1` toward `p2` in radians, clockwise from north in
/// `[-π, π]`.
pub fn azimuth_rad(p1: &Location, p2: &Location) -> f64 {
    let lat1 = p1.lat.to_radians();
    let lat2 = p2.lat.to_radians();
    let d_lon = (p2.lon - p1.lon).to_radians();
    let y = d_lon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lon.cos();
    y.atan2(x)
}

/// Great-circle projection of `p` along `azimuth` (radians, clockwise from
/// north) by `distance` km. Depth is carried over unchanged.
pub fn project(p: &Location, azimuth: f64, distance: f64) -> Location {
    let lat1 = p.lat.to_radians();
    let lon1 = p.lon.to_radians();
    let ad = distance / EARTH_RADIUS_KM;
    let lat2 = (lat1.sin() * ad.cos() + lat1.cos() * ad.sin() * azimuth.cos()).asin();
    let lon2 = lon1
        + (azimuth.sin() * ad.sin() * lat1.cos()).atan2(ad.cos() - lat1.sin() * lat2.sin());
    Location {
        lat: lat2.to_degrees(),
        lon: lon2.to_degrees(),
        depth: p.depth,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn one_degree_latitude_is_about_111_km() {
        let a = Location::surface(34.0, -118.0);
        let b = Location::surface(35.0, -118.0);
        assert_relative_eq!(horz_distance_fast(&a, &b), 111.2, max_relative = 0.01);
    }

    #[test]
    fn longitude_distance_shrinks_with_latitude() {
        let eq = horz_distance_fast(
            &Location::surface(0.0, 0.0),
            &Location::surface(0.0, 1.0),
        );
        let mid = horz_distance_fast(
            &Location::surface(60.0, 0.0),
            &Location::surface(60.0, 1.0),
        );
        assert_relative_eq!(mid / eq, 60.0_f64.to_radians().cos(), max_relative = 1e-3);
    }

    #[test]
    fn azimuth_cardinal_directions() {
        let o = Location::surface(40.0, -110.0);
        let north = Location::surface(41.0, -110.0);
        let east = Location::surface(40.0, -109.0);
        assert_relative_eq!(azimuth_rad(&o, &north), 0.0, epsilon = 1e-6);
        assert_relative_eq!(azimuth_rad(&o, &east), FRAC_PI_2, max_relative = 1e-2);
    }

    #[test]
    fn project_round_trips_distance_and_azimuth() {
        let o = Location::new(37.5, -122.0, 4.0);
        let p = project(&o, 0.7, 25.0);
        assert_relative_eq!(horz_distance_fast(&o, &p), 25.0, max_relative = 1e-3);
        assert_relative_eq!(azimuth_rad(&o, &p), 0.7, epsilon = 1e-3);
        assert_relative_eq!(p.depth, 4.0);
    }

    #[test]
    fn linear_distance_includes_depth() {
        let a = Location::new(40.0, -110.0, 0.0);
        let b = Location::new(40.0, -110.0, 10.0);
        assert_relative_eq!(linear_distance_fast(&a, &b), 10.0);
    }
}
