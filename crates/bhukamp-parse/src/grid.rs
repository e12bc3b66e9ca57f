//! Gridded background-seismicity file parser.
//!
//! A grid file carries a flat Gutenberg-Richter descriptor plus paths to
//! binary per-node rate grids; optional b-value, maximum-magnitude and
//! weight grids overlay the flat values node by node. Only nodes with a
//! non-zero a-value become sources, and their compacted location and MFD
//! lists are wrapped in a traced border polygon so the hazard engine can
//! skip whole grids by distance.

use crate::cursor::LineCursor;
use crate::gridio::{read_bool_grid, read_grid};
use crate::report::ParseReport;
use crate::ParseError;
use bhukamp_geo::{Direction, GriddedRegion, Location, Region};
use bhukamp_models::fields::{read_f64, read_f64s, read_int, read_ints};
use bhukamp_models::moment::incr_rate;
use bhukamp_models::registry::NamedSource;
use bhukamp_models::types::{FaultCode, RateType};
use bhukamp_models::{gutenberg_richter_mfd_at_rate, GrData, Mfd, WarningLog};
use bhukamp_sources::point::{GeometryModel, MechWeights};
use bhukamp_sources::GridSourceSet;
use tracing::info;

/// Provider of auxiliary grid bytes, keyed by the path exactly as written
/// in the source file.
pub trait GridResources {
    fn grid_bytes(&self, path: &str) -> Result<Vec<u8>, ParseError>;
}

/// Raw craton and extended-margin mask files for the central and eastern US.
///
/// Held as undecoded bytes; decoding needs the grid dimensions, which only
/// the parser knows.
#[derive(Debug, Clone)]
pub struct CratonMasks {
    craton: Vec<u8>,
    margin: Vec<u8>,
}

impl CratonMasks {
    pub fn new(craton: Vec<u8>, margin: Vec<u8>) -> Self {
        CratonMasks { craton, margin }
    }

    fn decode(&self, n_rows: usize, n_cols: usize) -> Result<(Vec<bool>, Vec<bool>), ParseError> {
        let cra = read_bool_grid(&self.craton, n_rows, n_cols, "craton")?;
        let mar = read_bool_grid(&self.margin, n_rows, n_cols, "margin")?;
        Ok((cra, mar))
    }
}

// CEUS maximum-magnitude tapers, one weight per 0.1-unit bin from mMin.
// wtmj_cra: full weight up to 6.55; Mmax=6.85 @ 0.2 wt
// wtmj_ext: full weight up to 6.85; Mmax=7.15 @ 0.2 wt
// wtmab_cra: full weight up to 6.75; Mmax=7.05 @ 0.2 wt
// wtmab_ext: full weight up to 7.15; Mmax=7.35 @ 0.2 wt
#[rustfmt::skip]
const WT_MJ_CRATON: [f64; 25] = [
    1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0,
    1.0, 1.0, 0.9, 0.7, 0.2, 0.2, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0,
];
#[rustfmt::skip]
const WT_MJ_MARGIN: [f64; 25] = [
    1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0,
    1.0, 1.0, 1.0, 1.0, 1.0, 0.9, 0.7, 0.7, 0.2, 0.0, 0.0, 0.0,
];
#[rustfmt::skip]
const WT_AB_CRATON: [f64; 25] = [
    1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0,
    1.0, 1.0, 1.0, 1.0, 0.9, 0.9, 0.7, 0.2, 0.0, 0.0, 0.0, 0.0,
];
#[rustfmt::skip]
const WT_AB_MARGIN: [f64; 25] = [
    1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0,
    1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 0.9, 0.7, 0.2, 0.0,
];

/// Parses a complete gridded source file.
///
/// `masks` is only consulted for the combined CEUS catalogs; passing `None`
/// for those files skips the craton/margin magnitude tapers with a warning.
pub fn parse_grid(
    src: &NamedSource,
    resources: &dyn GridResources,
    masks: Option<&CratonMasks>,
    report: &mut ParseReport,
) -> Result<GridSourceSet, ParseError> {
    let mut warnings = WarningLog::new();
    let mut cursor = LineCursor::new(src.lines());

    cursor.skip_site_header()?;
    let depths = read_rupture_top(cursor.next()?)?;
    let mech_weights = read_mech_weights(cursor.next()?)?;
    // distance lookup parameters are written as whole kilometers
    let r_dat = read_f64s(cursor.next()?, 2)?;
    let (d_r, r_max) = (r_dat[0].trunc(), r_dat[1].trunc());

    let lat = read_f64s(cursor.next()?, 3)?;
    let lon = read_f64s(cursor.next()?, 3)?;
    let region = GriddedRegion::new(lat[0], lat[1], lat[2], lon[0], lon[1], lon[2]);

    let gr = GrData::from_grid_line(cursor.next()?, &mut warnings)?;

    // iflt, ibmat, maxMat flags plus the taper magnitude
    let flag_line = cursor.next()?;
    let flags = read_ints(flag_line, 3)?;
    let fault_code = FaultCode::from_id(flags[0])?;
    let b_grid = flags[1] > 0;
    let m_max_grid = flags[2] > 0;
    let m_taper = read_f64(flag_line, 3)?;
    let weight_grid = m_taper > 0.0;

    let b_path = if b_grid { Some(cursor.next()?) } else { None };
    let m_max_path = if m_max_grid { Some(cursor.next()?) } else { None };
    let wgt_path = if weight_grid { Some(cursor.next()?) } else { None };
    let a_path = cursor.next()?;

    let rate_line = cursor.next()?;
    let time_span = read_f64(rate_line, 0)?;
    let rate_type = if read_int(rate_line, 1)? == 0 {
        RateType::Incremental
    } else {
        RateType::Cumulative
    };

    let strike = if fault_code == FaultCode::FixedStrike {
        Some(read_f64(cursor.next()?, 0)?)
    } else {
        None
    };
    // remaining lines are attenuation configuration; not consumed here

    let (n_rows, n_cols) = (region.n_rows, region.n_cols);
    let a_dat = read_grid(&resources.grid_bytes(a_path)?, n_rows, n_cols, a_path)?;
    let mut b_dat = match b_path {
        Some(p) => read_grid(&resources.grid_bytes(p)?, n_rows, n_cols, p)?,
        None => vec![gr.b_val; a_dat.len()],
    };
    // zeroed b-value cells fall back to the file-level b
    for b in &mut b_dat {
        if *b == 0.0 {
            *b = gr.b_val;
        }
    }
    let m_max_dat = match m_max_path {
        Some(p) => read_grid(&resources.grid_bytes(p)?, n_rows, n_cols, p)?,
        None => vec![gr.m_max; a_dat.len()],
    };
    let wgt_dat = match wgt_path {
        Some(p) => Some(read_grid(&resources.grid_bytes(p)?, n_rows, n_cols, p)?),
        None => None,
    };

    let mut set = GridSourceSet::new(
        src.name.clone(),
        src.weight,
        depths,
        mech_weights,
        fault_code,
        strike,
        rate_type,
        time_span,
        GeometryModel::WidthAware,
    );
    set.d_r = d_r;
    set.r_max = r_max;

    // compacted active-node pass; indices stay sorted for the border walk
    let mut indices = Vec::new();
    for i in 0..a_dat.len() {
        if a_dat[i] == 0.0 {
            continue;
        }
        // mMax matrix zeros mean "use the file-level value"
        let max_m = if m_max_dat[i] <= 0.0 { gr.m_max } else { m_max_dat[i] };
        let node = GrData::for_grid_node(a_dat[i], b_dat[i], gr.m_min, max_m, gr.d_mag);
        if node.n_mag == 0 {
            warnings.push(format!("node {i}: empty magnitude range, dropped"));
            continue;
        }
        let mut mfd = gutenberg_richter_mfd_at_rate(
            node.m_min,
            node.n_mag,
            node.d_mag,
            node.b_val,
            incr_rate(node.a_val, node.b_val, node.m_min),
        );
        if let Some(wgt) = &wgt_dat {
            if mfd.max_mag() >= m_taper {
                taper_mfd(&mut mfd, m_taper + gr.d_mag / 2.0, wgt[i]);
            }
        }
        set.push_node(region.location_for(i), mfd);
        indices.push(i);
    }

    if !indices.is_empty() {
        set.border = Some(Region::new(trace_border(&region, &indices)));
    }

    // the combined CEUS catalogs get craton/margin magnitude tapers
    if src.name.contains("2007all8") {
        match masks {
            Some(m) => {
                let (cra, mar) = m.decode(n_rows, n_cols)?;
                apply_ceus_tapers(&src.name, &mut set, &indices, &cra, &mar);
            }
            None => warnings.push(format!(
                "{}: craton/margin masks unavailable, tapers not applied",
                src.name
            )),
        }
    }

    info!(file = %src.name, nodes = set.node_count(), "parsed grid file");
    report.model_count = set.node_count();
    report.mfd_count = set.node_count();
    report.absorb(&mut warnings);

    Ok(set)
}

/// The depth line configures a magnitude-dependent distribution of rupture
/// tops, but only two fixed values are used, below and at-or-above the
/// magnitude cut.
fn read_rupture_top(line: &str) -> Result<[f64; 2], ParseError> {
    if read_int(line, 0)? == 1 {
        let d = read_f64(line, 1)?;
        return Ok([d, d]);
    }
    Ok([read_f64(line, 4)?, read_f64(line, 1)?])
}

fn read_mech_weights(line: &str) -> Result<MechWeights, ParseError> {
    let v = read_f64s(line, 3)?;
    Ok(MechWeights {
        strike_slip: v[0],
        reverse: v[1],
        normal: v[2],
    })
}

/// Scales every bin from the one holding `edge_mag` upward by `weight`.
fn taper_mfd(mfd: &mut Mfd, edge_mag: f64, weight: f64) {
    if let Some(j) = mfd.index_of(edge_mag) {
        for k in j..mfd.len() {
            mfd.set_rate(k, mfd.rate(k) * weight);
        }
    }
}

/// Walks the outline of the active nodes clockwise.
///
/// From each border node the sweep resumes just past the direction that
/// points back where it came from, so concave outlines are followed
/// correctly. The walk closes when it returns to the starting node, or
/// when a full sweep finds no neighbor (a single-node grid).
fn trace_border(region: &GriddedRegion, indices: &[usize]) -> Vec<Location> {
    let mut locs = vec![region.location_for(indices[0])];
    let mut curr = indices[0];
    let mut start_dir = Direction::West;
    let mut sweep_dir = start_dir.next();
    while sweep_dir != start_dir {
        let hit = region
            .move_index(curr, sweep_dir)
            .filter(|idx| indices.binary_search(idx).is_ok());
        if let Some(next_idx) = hit {
            if next_idx == indices[0] {
                break;
            }
            locs.push(region.location_for(next_idx));
            curr = next_idx;
            start_dir = sweep_dir.opposite().next();
            sweep_dir = start_dir.next();
            continue;
        }
        sweep_dir = sweep_dir.next();
    }
    // the San Gorgonio outline has 16 points that self-touch; nudging the
    // latitudes apart keeps the polygon simple
    if locs.len() == 16 {
        for (i, loc) in locs.iter_mut().enumerate() {
            if i == 0 || i == 8 {
                continue;
            }
            loc.lat += if i > 8 { 0.01 } else { -0.01 };
        }
    }
    locs
}

/// Tapers high-magnitude bins of craton and extended-margin nodes. The
/// weight table pair depends on which mblg conversion built the catalog.
fn apply_ceus_tapers(
    name: &str,
    set: &mut GridSourceSet,
    indices: &[usize],
    craton: &[bool],
    margin: &[bool],
) {
    let (cra_wt, mar_wt): (&[f64], &[f64]) = if name.contains(".AB.") {
        (&WT_AB_CRATON, &WT_AB_MARGIN)
    } else {
        (&WT_MJ_CRATON, &WT_MJ_MARGIN)
    };
    for (pos, &idx) in indices.iter().enumerate() {
        if !craton[idx] && !margin[idx] {
            continue;
        }
        let weights = if craton[idx] { cra_wt } else { mar_wt };
        let mfd = &mut set.mfds_mut()[pos];
        for k in 0..mfd.len() {
            // bins past the 25-entry tables are fully tapered
            let w = weights.get(k).copied().unwrap_or(0.0);
            if w == 1.0 {
                continue;
            }
            mfd.set_rate(k, mfd.rate(k) * w);
        }
    }
}
