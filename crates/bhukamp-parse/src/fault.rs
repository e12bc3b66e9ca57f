//! Fault source file parser.

use crate::cursor::LineCursor;
use crate::report::ParseReport;
use crate::ParseError;
use bhukamp_geo::{FaultTrace, Location};
use bhukamp_models::fields::{join_from, read_f64, read_f64s, read_int};
use bhukamp_models::registry::NamedSource;
use bhukamp_models::types::{FaultType, FocalMech};
use bhukamp_models::{
    build_ch_mfds, build_gr_mfds, build_grb0_mfds, ChData, GrData, MagUncertainty, Mfd,
    WarningLog,
};
use bhukamp_sources::FaultSource;
use tracing::info;

/// All fault sources parsed from one file, with the file-level settings
/// the hazard engine needs alongside them.
#[derive(Debug)]
pub struct FaultSet {
    pub name: String,
    pub weight: f64,
    /// Coarse source-to-site distance filter in km.
    pub r_max: f64,
    pub sources: Vec<FaultSource>,
}

/// Parses a complete fault source file.
pub fn parse_fault(src: &NamedSource, report: &mut ParseReport) -> Result<FaultSet, ParseError> {
    let name_idx = src.region.name_field_index();
    let mut warnings = WarningLog::new();
    let mut cursor = LineCursor::new(src.lines());

    cursor.skip_site_header()?;
    let r_max = read_f64(cursor.next()?, 1)?;
    cursor.skip_period_header()?;

    let md = MagUncertainty::from_block(cursor.take(4)?)?;

    let mut sources = Vec::new();
    while cursor.has_next() {
        let fs = parse_record(&mut cursor, &md, name_idx, &mut warnings)?;
        if fs.mfds.is_empty() {
            warnings.push(format!("{}: source with no MFDs", fs.name));
        }
        sources.push(fs);
    }

    // multi-dip variants repeat their strike-slip records verbatim
    if src.name.contains("3dip") {
        merge_strike_slip(&mut sources);
    }

    info!(file = %src.name, sources = sources.len(), "parsed fault file");
    report.model_count = sources.len();
    report.mfd_count = sources.iter().map(|s| s.mfds.len()).sum();
    report.absorb(&mut warnings);

    Ok(FaultSet {
        name: src.name.clone(),
        weight: src.weight,
        r_max,
        sources,
    })
}

/// One source record: header line, MFD lines, geometry line, trace.
fn parse_record(
    cursor: &mut LineCursor<'_>,
    md: &MagUncertainty,
    name_idx: usize,
    warnings: &mut WarningLog,
) -> Result<FaultSource, ParseError> {
    let header = cursor.next()?;
    let mut fault_type = FaultType::from_id(read_int(header, 0)?)?;
    let mech = FocalMech::from_id(read_int(header, 1)?)?;
    let n_mag = read_int(header, 2)?.max(0) as usize;
    let name = join_from(header, name_idx);

    let mfd_lines = cursor.take(n_mag)?;
    let (mfds, floats) = build_mfds(&mut fault_type, mfd_lines, md, &name, warnings)?;

    let (dip, width, top) = read_geometry(cursor.next()?)?;
    let trace = read_trace(cursor, top)?;

    let mut fs = FaultSource::new(name, fault_type, mech, trace, dip, width, top);
    fs.floats = floats;
    fs.mfds = mfds;
    if fs.dip < 0.0 {
        // negative dip encodes a reversed trace in the config files
        fs.dip = -fs.dip;
        fs.trace.reverse();
    }
    Ok(fs)
}

/// Dispatches the record's MFD lines to the matching recurrence builder.
/// Returns the MFDs and whether they float; a GR record that degenerated
/// rewrites `fault_type` to CH.
pub(crate) fn build_mfds(
    fault_type: &mut FaultType,
    lines: &[String],
    md: &MagUncertainty,
    name: &str,
    warnings: &mut WarningLog,
) -> Result<(Vec<Mfd>, bool), ParseError> {
    match fault_type {
        FaultType::Ch => {
            let mut mfds = Vec::new();
            for line in lines {
                let ch = ChData::from_line(line)?;
                mfds.extend(build_ch_mfds(&ch, md));
            }
            Ok((mfds, false))
        }
        FaultType::Gr => {
            let records = lines
                .iter()
                .map(|l| GrData::from_fault_line(l, warnings))
                .collect::<Result<Vec<_>, _>>()?;
            let outcome = build_gr_mfds(&records, md, name, warnings)?;
            if outcome.degenerated_to_ch {
                *fault_type = FaultType::Ch;
            }
            Ok((outcome.mfds, true))
        }
        FaultType::GrB0 => {
            let records = lines
                .iter()
                .map(|l| GrData::from_fault_line(l, warnings))
                .collect::<Result<Vec<_>, _>>()?;
            let mfds = build_grb0_mfds(&records, md, name, warnings)?;
            Ok((mfds, true))
        }
    }
}

pub(crate) fn read_geometry(line: &str) -> Result<(f64, f64, f64), ParseError> {
    let v = read_f64s(line, 3)?;
    Ok((v[0], v[1], v[2]))
}

pub(crate) fn read_trace(cursor: &mut LineCursor<'_>, depth: f64) -> Result<FaultTrace, ParseError> {
    let count = read_int(cursor.next()?, 0)?.max(0) as usize;
    let mut points = Vec::with_capacity(count);
    for line in cursor.take(count)? {
        let v = read_f64s(line, 2)?;
        points.push(Location::new(v[0], v[1], depth));
    }
    Ok(FaultTrace::new(points))
}

/// Merges duplicate strike-slip records produced by the 3-dip file
/// variants: the first occurrence keeps its place and takes over the MFDs
/// of every later record with the same name.
fn merge_strike_slip(sources: &mut Vec<FaultSource>) {
    let mut merged: Vec<FaultSource> = Vec::with_capacity(sources.len());
    for fs in sources.drain(..) {
        if fs.mech == FocalMech::StrikeSlip {
            if let Some(prev) = merged
                .iter_mut()
                .find(|m| m.mech == FocalMech::StrikeSlip && m.name == fs.name)
            {
                prev.mfds.extend(fs.mfds);
                continue;
            }
        }
        merged.push(fs);
    }
    *sources = merged;
}
