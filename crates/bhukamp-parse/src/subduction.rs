//! Subduction interface file parser.

use crate::cursor::LineCursor;
use crate::fault::build_mfds;
use crate::report::ParseReport;
use crate::ParseError;
use bhukamp_geo::{FaultTrace, Location};
use bhukamp_models::fields::{join_from, read_f64, read_f64s, read_int};
use bhukamp_models::registry::NamedSource;
use bhukamp_models::types::{FaultType, FocalMech};
use bhukamp_models::{MagUncertainty, WarningLog};
use bhukamp_sources::SubductionSource;
use tracing::info;

/// All interface sources parsed from one file.
#[derive(Debug)]
pub struct SubductionSet {
    pub name: String,
    pub weight: f64,
    pub r_max: f64,
    pub sources: Vec<SubductionSource>,
}

/// Parses a complete subduction source file. The grammar is the fault
/// grammar with two depth-bearing traces in place of the scalar geometry
/// line.
pub fn parse_subduction(
    src: &NamedSource,
    report: &mut ParseReport,
) -> Result<SubductionSet, ParseError> {
    let name_idx = src.region.name_field_index();
    let mut warnings = WarningLog::new();
    let mut cursor = LineCursor::new(src.lines());

    cursor.skip_site_header()?;
    let r_max = read_f64(cursor.next()?, 1)?;
    cursor.skip_period_header()?;

    let md = MagUncertainty::from_block(cursor.take(4)?)?;

    let mut sources = Vec::new();
    while cursor.has_next() {
        let header = cursor.next()?;
        let mut fault_type = FaultType::from_id(read_int(header, 0)?)?;
        let mech = FocalMech::from_id(read_int(header, 1)?)?;
        let n_mag = read_int(header, 2)?.max(0) as usize;
        let name = join_from(header, name_idx);

        let mfd_lines = cursor.take(n_mag)?;
        let (mfds, _) = build_mfds(&mut fault_type, mfd_lines, &md, &name, &mut warnings)?;

        let upper = read_depth_trace(&mut cursor)?;
        let lower = read_depth_trace(&mut cursor)?;

        let mut sub = SubductionSource::new(name, fault_type, mech, upper, lower);
        sub.mfds = mfds;
        if sub.mfds.is_empty() {
            warnings.push(format!("{}: source with no MFDs", sub.name));
        }
        sources.push(sub);
    }

    info!(file = %src.name, sources = sources.len(), "parsed subduction file");
    report.model_count = sources.len();
    report.mfd_count = sources.iter().map(|s| s.mfds.len()).sum();
    report.absorb(&mut warnings);

    Ok(SubductionSet {
        name: src.name.clone(),
        weight: src.weight,
        r_max,
        sources,
    })
}

/// A trace given as a count line plus `lat lon depth` points.
fn read_depth_trace(cursor: &mut LineCursor<'_>) -> Result<FaultTrace, ParseError> {
    let count = read_int(cursor.next()?, 0)?.max(0) as usize;
    let mut points = Vec::with_capacity(count);
    for line in cursor.take(count)? {
        let v = read_f64s(line, 3)?;
        points.push(Location::new(v[0], v[1], v[2]));
    }
    Ok(FaultTrace::new(points))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use bhukamp_models::types::{SourceRegion, SourceType};

    fn to_source(extra: Vec<&str>) -> NamedSource {
        let mut lines = vec![
            "0",
            "39.0 50.0",
            "-127.0 -121.0",
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
        ];
        lines.extend(extra);
        NamedSource::new(
            SourceRegion::Casc,
            SourceType::Subduction,
            1.0,
            "cascadia.top.in",
            lines.into_iter().map(String::from).collect(),
        )
    }

    #[test]
    fn parses_two_trace_geometry() {
        let src = to_source(vec![
            "1 2 1 904 Cascadia whole",
            "9.0 0.002 1.0",
            "2",
            "40.3 -124.6 5.0",
            "41.3 -124.7 5.2",
            "2",
            "40.3 -124.0 20.0",
            "41.3 -124.1 21.0",
        ]);
        let mut report = ParseReport::new("test");
        let set = parse_subduction(&src, &mut report).unwrap();
        assert_eq!(set.sources.len(), 1);
        let sub = &set.sources[0];
        assert_eq!(sub.name, "Cascadia whole");
        assert_eq!(sub.mech, FocalMech::Reverse);
        assert_relative_eq!(sub.upper_trace.first().unwrap().depth, 5.0);
        assert_relative_eq!(sub.lower_trace.last().unwrap().depth, 21.0);
        assert_eq!(sub.mfds.len(), 1);
    }

    #[test]
    fn missing_lower_trace_is_fatal() {
        let src = to_source(vec![
            "1 2 1 904 Cascadia whole",
            "9.0 0.002 1.0",
            "2",
            "40.3 -124.6 5.0",
            "41.3 -124.7 5.2",
        ]);
        let mut report = ParseReport::new("test");
        assert!(matches!(
            parse_subduction(&src, &mut report),
            Err(ParseError::UnexpectedEof { .. })
        ));
    }
}
