//! Gridded background-seismicity source sets.

use crate::point::{GeometryModel, MechWeights, PointRuptureSet};
use bhukamp_geo::{Bounds, Location, Region};
use bhukamp_models::types::{FaultCode, RateType};
use bhukamp_models::Mfd;
use serde::{Deserialize, Serialize};

/// All active nodes of one gridded source file.
///
/// Only nodes with non-zero activity survive parsing; `locations` and
/// `mfds` are compacted parallel arrays and the original grid index is not
/// preserved. Point ruptures are never persisted: [`GridSourceSet::source_at`]
/// builds a fresh enumeration set per node, which keeps memory flat across
/// millions of nodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridSourceSet {
    pub name: String,
    pub weight: f64,
    /// Rupture-top depths, below and at-or-above the magnitude cut.
    pub depths: [f64; 2],
    pub mech_weights: MechWeights,
    pub fault_code: FaultCode,
    /// Fixed strike in degrees when the fault code demands one.
    pub strike: Option<f64>,
    pub rate_type: RateType,
    /// Catalog span in years behind the node rates.
    pub time_span: f64,
    /// Distance lookup-table spacing in km.
    pub d_r: f64,
    /// Coarse source-to-site distance filter in km.
    pub r_max: f64,
    pub geometry: GeometryModel,
    /// Outer boundary of the active nodes, traced after parsing.
    pub border: Option<Region>,
    locations: Vec<Location>,
    mfds: Vec<Mfd>,
}

impl GridSourceSet {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<String>,
        weight: f64,
        depths: [f64; 2],
        mech_weights: MechWeights,
        fault_code: FaultCode,
        strike: Option<f64>,
        rate_type: RateType,
        time_span: f64,
        geometry: GeometryModel,
    ) -> Self {
        GridSourceSet {
            name: name.into(),
            weight,
            depths,
            mech_weights,
            fault_code,
            strike,
            rate_type,
            time_span,
            d_r: 0.0,
            r_max: 0.0,
            geometry,
            border: None,
            locations: Vec::new(),
            mfds: Vec::new(),
        }
    }

    /// Adds an active node. Caller guarantees non-zero activity.
    pub fn push_node(&mut self, loc: Location, mfd: Mfd) {
        self.locations.push(loc);
        self.mfds.push(mfd);
    }

    pub fn node_count(&self) -> usize {
        self.locations.len()
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    pub fn mfds(&self) -> &[Mfd] {
        &self.mfds
    }

    pub fn mfds_mut(&mut self) -> &mut [Mfd] {
        &mut self.mfds
    }

    /// Ruptures per magnitude bin given the mechanism weights.
    pub fn mech_multiplicity(&self) -> usize {
        let w = &self.mech_weights;
        w.strike_slip.ceil() as usize
            + 2 * w.reverse.ceil() as usize
            + 2 * w.normal.ceil() as usize
    }

    pub fn rupture_count(&self) -> usize {
        self.mech_multiplicity() * self.mfds.iter().map(Mfd::len).sum::<usize>()
    }

    /// Builds the on-demand rupture set for node `i`.
    pub fn source_at(&self, i: usize, duration: f64) -> Option<PointRuptureSet> {
        let loc = *self.locations.get(i)?;
        let mfd = self.mfds.get(i)?.clone();
        Some(PointRuptureSet::new(
            loc,
            mfd,
            duration,
            self.depths,
            self.mech_weights,
            self.geometry,
        ))
    }

    pub fn bounds(&self) -> Option<Bounds> {
        match &self.border {
            Some(region) => region.bounds(),
            None => Bounds::around(&self.locations, 0.0),
        }
    }
}
