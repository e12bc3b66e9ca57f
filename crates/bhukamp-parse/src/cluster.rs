//! New Madrid cluster file parser.

use crate::cursor::LineCursor;
use crate::fault::{build_mfds, read_geometry, read_trace};
use crate::report::ParseReport;
use crate::ParseError;
use bhukamp_models::fields::{join_from, read_f64, read_int};
use bhukamp_models::registry::NamedSource;
use bhukamp_models::types::{FaultType, FocalMech};
use bhukamp_models::{MagUncertainty, ModelError, WarningLog};
use bhukamp_sources::{ClusterSource, FaultSource};
use tracing::info;

/// Fault-model variants a cluster record can belong to, west to east.
const GROUP_NAMES: [&str; 5] = ["West", "Center-west", "Center", "Center-east", "East"];

/// Fault sections within a variant, north to south.
const SECTION_NAMES: [&str; 3] = ["North", "Center", "South"];

/// All cluster groups parsed from one file.
#[derive(Debug)]
pub struct ClusterSet {
    pub name: String,
    pub r_max: f64,
    pub clusters: Vec<ClusterSource>,
}

/// Parses a complete cluster source file.
///
/// Cluster records follow the fault grammar with two extra leading group
/// fields on the source line; the cluster return period is carried in the
/// file name and folded into every member MFD's rates, because the
/// downstream combination step needs it per magnitude.
pub fn parse_cluster(src: &NamedSource, report: &mut ParseReport) -> Result<ClusterSet, ParseError> {
    let return_period = return_period_from_name(&src.name)?;
    let mut warnings = WarningLog::new();
    let mut cursor = LineCursor::new(src.lines());

    cursor.skip_site_header()?;
    let r_max = read_f64(cursor.next()?, 1)?;
    cursor.skip_period_header()?;

    let md = MagUncertainty::from_block(cursor.take(4)?)?;

    let mut clusters: Vec<(i64, ClusterSource)> = Vec::new();
    while cursor.has_next() {
        let header = cursor.next()?;
        let mut fault_type = FaultType::from_id(read_int(header, 0)?)?;
        let mech = FocalMech::from_id(read_int(header, 1)?)?;
        let n_mag = read_int(header, 2)?.max(0) as usize;
        let group_id = read_int(header, 3)?;
        let section_id = read_int(header, 4)?;
        let base_name = join_from(header, 5);

        let group_name = usize::try_from(group_id - 1)
            .ok()
            .and_then(|i| GROUP_NAMES.get(i))
            .ok_or(ModelError::UnknownId {
                what: "cluster group",
                id: group_id,
            })?;
        let section_name = usize::try_from(section_id - 1)
            .ok()
            .and_then(|i| SECTION_NAMES.get(i))
            .ok_or(ModelError::UnknownId {
                what: "cluster section",
                id: section_id,
            })?;

        let mfd_lines = cursor.take(n_mag)?;
        let name = format!("{base_name} ({section_name})");
        let (mut mfds, floats) = build_mfds(&mut fault_type, mfd_lines, &md, &name, &mut warnings)?;
        // member rates carry the cluster recurrence
        for mfd in &mut mfds {
            mfd.scale(1.0 / return_period);
        }

        let (dip, width, top) = read_geometry(cursor.next()?)?;
        let trace = read_trace(&mut cursor, top)?;

        let mut member = FaultSource::new(name, fault_type, mech, trace, dip, width, top);
        member.floats = floats;
        member.mfds = mfds;
        if member.dip < 0.0 {
            member.dip = -member.dip;
            member.trace.reverse();
        }

        let pos = match clusters.iter().position(|(id, _)| *id == group_id) {
            Some(pos) => pos,
            None => {
                let name = format!("{} [{}]", src.name, group_name);
                clusters.push((
                    group_id,
                    ClusterSource::new(name, return_period, src.weight),
                ));
                clusters.len() - 1
            }
        };
        clusters[pos].1.members.push(member);
    }

    let clusters: Vec<ClusterSource> = clusters.into_iter().map(|(_, c)| c).collect();

    info!(file = %src.name, groups = clusters.len(), "parsed cluster file");
    report.model_count = clusters.len();
    report.mfd_count = clusters
        .iter()
        .flat_map(|c| c.members.iter())
        .map(|m| m.mfds.len())
        .sum();
    report.absorb(&mut warnings);

    Ok(ClusterSet {
        name: src.name.clone(),
        r_max,
        clusters,
    })
}

/// The cluster return period is the numeric field of the file name, e.g.
/// `newmad.500.cluster.in`.
fn return_period_from_name(name: &str) -> Result<f64, ParseError> {
    name.split('.')
        .find_map(|tok| tok.parse::<f64>().ok())
        .ok_or_else(|| {
            ParseError::Model(ModelError::BadField {
                line: name.to_string(),
                pos: 1,
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use bhukamp_models::types::{SourceRegion, SourceType};

    fn record(group: i64, section: i64, rate: f64) -> Vec<String> {
        vec![
            format!("1 1 1 {group} {section} New Madrid"),
            format!("7.7 {rate} 1.0"),
            "90.0 15.0 0.0".to_string(),
            "2".to_string(),
            "36.0 -89.5".to_string(),
            "36.8 -89.6".to_string(),
        ]
    }

    fn to_source(records: Vec<Vec<String>>) -> NamedSource {
        let mut lines: Vec<String> = [
            "0",
            "34.0 40.0",
            "-92.0 -86.0",
            "760.0 2.0",
            "7 1000.0",
            "1",
            "0.0 0.0",
            "outfile",
            "19",
            "gm values",
            "1",
            "atten rel",
            "1.0 3.0",
            "1",
            "0.0",
            "1.0",
            "0.0 0",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        for r in records {
            lines.extend(r);
        }
        NamedSource::new(
            SourceRegion::Ceus,
            SourceType::Cluster,
            0.5,
            "newmad.500.cluster.in",
            lines,
        )
    }

    #[test]
    fn return_period_comes_from_the_file_name() {
        assert_relative_eq!(
            return_period_from_name("newmad.500.cluster.in").unwrap(),
            500.0
        );
        assert_relative_eq!(
            return_period_from_name("newmad.1000.cluster.in").unwrap(),
            1000.0
        );
        assert!(return_period_from_name("newmad.cluster.in").is_err());
    }

    #[test]
    fn groups_by_fault_model_variant() {
        let src = to_source(vec![
            record(1, 1, 0.002),
            record(1, 2, 0.002),
            record(2, 1, 0.002),
        ]);
        let mut report = ParseReport::new("test");
        let set = parse_cluster(&src, &mut report).unwrap();
        assert_eq!(set.clusters.len(), 2);
        assert_eq!(set.clusters[0].members.len(), 2);
        assert_eq!(set.clusters[1].members.len(), 1);
        assert!(set.clusters[0].name.contains("West"));
        assert_relative_eq!(set.clusters[0].return_period, 500.0);
        assert_relative_eq!(set.clusters[0].weight, 0.5);
    }

    #[test]
    fn member_rates_fold_in_the_return_period() {
        let src = to_source(vec![record(3, 2, 1.0)]);
        let mut report = ParseReport::new("test");
        let set = parse_cluster(&src, &mut report).unwrap();
        let member = &set.clusters[0].members[0];
        assert_eq!(member.name, "New Madrid (Center)");
        assert_relative_eq!(member.mfds[0].rate(0), 1.0 / 500.0, max_relative = 1e-12);
    }

    #[test]
    fn unknown_group_id_is_fatal() {
        let src = to_source(vec![record(6, 1, 0.002)]);
        let mut report = ParseReport::new("test");
        assert!(parse_cluster(&src, &mut report).is_err());
    }
}
