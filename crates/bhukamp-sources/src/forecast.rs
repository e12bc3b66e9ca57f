//! Forecast surface exposed to the hazard-integration engine.

use crate::cluster::ClusterSource;
use crate::fault::FaultSource;
use crate::grid::GridSourceSet;
use crate::point::PointRuptureSet;
use crate::subduction::SubductionSource;
use bhukamp_geo::Bounds;
use serde::{Deserialize, Serialize};

/// One parsed source model, any format.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[allow(clippy::large_enum_variant)]
pub enum SourceModel {
    Fault(FaultSource),
    Cluster(ClusterSource),
    Subduction(SubductionSource),
    Grid(GridSourceSet),
}

impl SourceModel {
    pub fn name(&self) -> &str {
        match self {
            SourceModel::Fault(s) => &s.name,
            SourceModel::Cluster(s) => &s.name,
            SourceModel::Subduction(s) => &s.name,
            SourceModel::Grid(s) => &s.name,
        }
    }

    pub fn bounds(&self) -> Option<Bounds> {
        match self {
            SourceModel::Fault(s) => s.bounds(),
            SourceModel::Cluster(s) => s.bounds(),
            SourceModel::Subduction(s) => s.bounds(),
            SourceModel::Grid(s) => s.bounds(),
        }
    }
}

/// A source handed out by [`Forecast::source_at`].
///
/// Finite sources are borrowed; grid nodes build their rupture set on
/// demand, so those come out owned.
#[derive(Debug)]
pub enum SourceAt<'a> {
    Fault(&'a FaultSource),
    Cluster(&'a ClusterSource),
    Subduction(&'a SubductionSource),
    Point(PointRuptureSet),
}

/// An ensemble of source models over one forecast duration.
///
/// Finite sources must be materialized once via [`Forecast::init`] before
/// rupture queries; grid nodes never are.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Forecast {
    /// Forecast duration in years.
    pub duration: f64,
    sources: Vec<SourceModel>,
}

impl Forecast {
    pub fn new(duration: f64) -> Self {
        Forecast {
            duration,
            sources: Vec::new(),
        }
    }

    pub fn push(&mut self, source: SourceModel) {
        self.sources.push(source);
    }

    pub fn models(&self) -> &[SourceModel] {
        &self.sources
    }

    /// Materializes every finite source.
    pub fn init(&mut self) {
        for src in &mut self.sources {
            match src {
                SourceModel::Fault(s) => s.init(),
                SourceModel::Cluster(s) => s.init(),
                SourceModel::Subduction(s) => s.init(),
                SourceModel::Grid(_) => {}
            }
        }
    }

    /// Total addressable sources: one per finite source, one per active
    /// grid node.
    pub fn source_count(&self) -> usize {
        self.sources
            .iter()
            .map(|s| match s {
                SourceModel::Grid(g) => g.node_count(),
                _ => 1,
            })
            .sum()
    }

    pub fn rupture_count(&self) -> usize {
        self.sources
            .iter()
            .map(|s| match s {
                SourceModel::Fault(f) => f.rupture_count(),
                SourceModel::Cluster(c) => c.rupture_count(),
                SourceModel::Subduction(sub) => sub.rupture_count(),
                SourceModel::Grid(g) => g.rupture_count(),
            })
            .sum()
    }

    /// Source at flat index `i`; grid sets expand to one entry per node.
    pub fn source_at(&self, i: usize) -> Option<SourceAt<'_>> {
        let mut rem = i;
        for src in &self.sources {
            match src {
                SourceModel::Grid(g) => {
                    if rem < g.node_count() {
                        return g.source_at(rem, self.duration).map(SourceAt::Point);
                    }
                    rem -= g.node_count();
                }
                other => {
                    if rem == 0 {
                        return Some(match other {
                            SourceModel::Fault(s) => SourceAt::Fault(s),
                            SourceModel::Cluster(s) => SourceAt::Cluster(s),
                            SourceModel::Subduction(s) => SourceAt::Subduction(s),
                            SourceModel::Grid(_) => unreachable!(),
                        });
                    }
                    rem -= 1;
                }
            }
        }
        None
    }

    /// Bounds around every source, expanded by `buffer` degrees.
    pub fn bounding_region(&self, buffer: f64) -> Option<Bounds> {
        self.sources
            .iter()
            .filter_map(SourceModel::bounds)
            .reduce(|a, b| a.merge(&b))
            .map(|b| Bounds {
                min_lat: b.min_lat - buffer,
                max_lat: b.max_lat + buffer,
                min_lon: b.min_lon - buffer,
                max_lon: b.max_lon + buffer,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::{GeometryModel, MechWeights};
    use bhukamp_geo::{FaultTrace, Location};
    use bhukamp_models::types::{FaultCode, FaultType, FocalMech, RateType};
    use bhukamp_models::Mfd;

    fn fault() -> FaultSource {
        let mut s = FaultSource::new(
            "A fault",
            FaultType::Ch,
            FocalMech::StrikeSlip,
            FaultTrace::new(vec![
                Location::surface(34.0, -118.0),
                Location::surface(34.3, -118.0),
            ]),
            90.0,
            12.0,
            0.0,
        );
        s.mfds.push(Mfd::single(7.0, 1e-3));
        s
    }

    fn grid() -> GridSourceSet {
        let mut g = GridSourceSet::new(
            "a grid",
            1.0,
            [5.0, 1.0],
            MechWeights {
                strike_slip: 1.0,
                reverse: 0.0,
                normal: 0.0,
            },
            FaultCode::PointSource,
            None,
            RateType::Incremental,
            1.0,
            GeometryModel::WidthAware,
        );
        g.push_node(Location::surface(36.0, -117.0), Mfd::single(5.05, 1e-4));
        g.push_node(Location::surface(36.1, -117.0), Mfd::single(5.05, 2e-4));
        g
    }

    #[test]
    fn counts_expand_grid_nodes() {
        let mut f = Forecast::new(50.0);
        f.push(SourceModel::Fault(fault()));
        f.push(SourceModel::Grid(grid()));
        f.init();
        assert_eq!(f.source_count(), 3);
        assert_eq!(f.rupture_count(), 1 + 2);
    }

    #[test]
    fn source_at_walks_finite_then_grid_nodes() {
        let mut f = Forecast::new(50.0);
        f.push(SourceModel::Fault(fault()));
        f.push(SourceModel::Grid(grid()));
        f.init();
        assert!(matches!(f.source_at(0), Some(SourceAt::Fault(_))));
        match f.source_at(2) {
            Some(SourceAt::Point(p)) => {
                assert_eq!(p.loc, Location::surface(36.1, -117.0));
            }
            other => panic!("expected grid node, got {other:?}"),
        }
        assert!(f.source_at(3).is_none());
    }

    #[test]
    fn bounding_region_covers_everything_with_buffer() {
        let mut f = Forecast::new(50.0);
        f.push(SourceModel::Fault(fault()));
        f.push(SourceModel::Grid(grid()));
        f.init();
        let b = f.bounding_region(1.0).unwrap();
        assert!(b.contains(&Location::surface(34.0, -118.0)));
        assert!(b.contains(&Location::surface(36.1, -117.0)));
        assert!(b.min_lat <= 33.0);
    }
}
