//! Clustered fault sources (New Madrid style).

use crate::fault::FaultSource;
use bhukamp_geo::Bounds;
use serde::{Deserialize, Serialize};

/// A group of fault-source variants that rupture together.
///
/// Members are geometric/fault-model alternatives that the hazard engine
/// must all evaluate and combine, never pick one of. The return period is
/// already folded into each member's MFD rates; it is kept here for the
/// downstream combination step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterSource {
    pub name: String,
    /// Cluster recurrence in years.
    pub return_period: f64,
    pub weight: f64,
    pub members: Vec<FaultSource>,
}

impl ClusterSource {
    pub fn new(name: impl Into<String>, return_period: f64, weight: f64) -> Self {
        ClusterSource {
            name: name.into(),
            return_period,
            weight,
            members: Vec::new(),
        }
    }

    /// Materializes every member.
    pub fn init(&mut self) {
        for m in &mut self.members {
            m.init();
        }
    }

    pub fn rupture_count(&self) -> usize {
        self.members.iter().map(FaultSource::rupture_count).sum()
    }

    pub fn bounds(&self) -> Option<Bounds> {
        self.members
            .iter()
            .filter_map(FaultSource::bounds)
            .reduce(|a, b| a.merge(&b))
    }
}
