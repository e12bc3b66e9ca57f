//! Closed sum types shared across the source pipeline.
//!
//! The original hazard codes drive branching off raw integer tags read from
//! the input files; modeling them as enums makes every dispatch an
//! exhaustive match.

use crate::ModelError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Geographic region a source file belongs to.
///
/// The region changes low-level record grammar: CA and CEUS fault records
/// start their name one field earlier than WUS records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceRegion {
    /// California
    Ca,
    /// Western US (intermountain west)
    Wus,
    /// Central and eastern US
    Ceus,
    /// Cascadia subduction zone
    Casc,
}

impl SourceRegion {
    /// Field index at which a fault-record name starts for this region.
    pub fn name_field_index(self) -> usize {
        match self {
            SourceRegion::Ca | SourceRegion::Ceus => 3,
            SourceRegion::Wus | SourceRegion::Casc => 4,
        }
    }
}

impl fmt::Display for SourceRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SourceRegion::Ca => "CA",
            SourceRegion::Wus => "WUS",
            SourceRegion::Ceus => "CEUS",
            SourceRegion::Casc => "CASC",
        };
        f.write_str(s)
    }
}

/// Top-level source family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Fault,
    Gridded,
    Subduction,
    Cluster,
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SourceType::Fault => "fault",
            SourceType::Gridded => "gridded",
            SourceType::Subduction => "subduction",
            SourceType::Cluster => "cluster",
        };
        f.write_str(s)
    }
}

/// Recurrence style of a fault record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultType {
    /// Characteristic event: a single repeated magnitude.
    Ch,
    /// Truncated Gutenberg-Richter exponential distribution.
    Gr,
    /// GR plus a moment-matched b=0 companion branch.
    GrB0,
}

impl FaultType {
    /// Maps the record-line integer tag to a fault type.
    pub fn from_id(id: i64) -> Result<Self, ModelError> {
        match id {
            1 => Ok(FaultType::Ch),
            2 => Ok(FaultType::Gr),
            3 => Ok(FaultType::GrB0),
            _ => Err(ModelError::UnknownId {
                what: "fault type",
                id,
            }),
        }
    }
}

/// Focal mechanism of a rupture.
///
/// Dip and rake are the fixed values the NSHM assigns per mechanism; dipping
/// mechanisms are modeled on both the footwall and hanging-wall sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FocalMech {
    StrikeSlip,
    Reverse,
    Normal,
}

impl FocalMech {
    /// Maps the record-line integer tag to a mechanism.
    pub fn from_id(id: i64) -> Result<Self, ModelError> {
        match id {
            1 => Ok(FocalMech::StrikeSlip),
            2 => Ok(FocalMech::Reverse),
            3 => Ok(FocalMech::Normal),
            _ => Err(ModelError::UnknownId {
                what: "focal mechanism",
                id,
            }),
        }
    }

    /// Assigned fault-plane dip, degrees.
    pub fn dip(self) -> f64 {
        match self {
            FocalMech::StrikeSlip => 90.0,
            FocalMech::Reverse | FocalMech::Normal => 50.0,
        }
    }

    /// Assigned rake, degrees.
    pub fn rake(self) -> f64 {
        match self {
            FocalMech::StrikeSlip => 0.0,
            FocalMech::Reverse => 90.0,
            FocalMech::Normal => -90.0,
        }
    }
}

/// Grid-source finite-fault treatment code (`iflt` flag).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultCode {
    /// Point ruptures only.
    PointSource,
    /// Finite corrections for M>6 assuming random strike.
    RandomStrike,
    /// Finite line faults for M>6 with a fixed strike read from the file.
    FixedStrike,
    /// Finite faults with the Johnston mblg-to-Mw conversion.
    ConvJohnston,
    /// Finite faults with the Atkinson-Boore mblg-to-Mw conversion.
    ConvAtkinBoore,
}

impl FaultCode {
    pub fn from_id(id: i64) -> Result<Self, ModelError> {
        match id {
            0 => Ok(FaultCode::PointSource),
            1 => Ok(FaultCode::RandomStrike),
            2 => Ok(FaultCode::FixedStrike),
            3 => Ok(FaultCode::ConvJohnston),
            4 => Ok(FaultCode::ConvAtkinBoore),
            _ => Err(ModelError::UnknownId {
                what: "fault code",
                id,
            }),
        }
    }
}

/// Whether grid rates are incremental or cumulative above magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateType {
    Incremental,
    Cumulative,
}

/// Which total an uncertainty-spread MFD preserves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Balance {
    /// Preserve total seismic moment rate.
    Moment,
    /// Preserve total event-count rate.
    Count,
}
