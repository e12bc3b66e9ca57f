//! Recurrence builders: record lists + uncertainty descriptor → MFD lists.
//!
//! Three construction paths keyed by the record fault type. The CH path
//! spreads a delta-function event over epistemic/aleatory branches; the GR
//! path spends a fixed moment budget over a truncated exponential per
//! branch; the GRB0 path doubles every record into a b-value and a
//! moment-matched b=0 variant.

use crate::gaussian::gaussian_mfd;
use crate::gutenberg::gutenberg_richter_mfd;
use crate::mfd::Mfd;
use crate::moment::{gr_rate, mag_to_moment, total_moment_rate};
use crate::recurrence::{ChData, GrData, MagUncertainty};
use crate::types::Balance;
use crate::{ModelError, WarningLog};
use tracing::debug;

/// Result of the GR construction path.
#[derive(Debug)]
pub struct GrOutcome {
    pub mfds: Vec<Mfd>,
    /// True when at least one record degenerated to a characteristic event
    /// (the caller rewrites the source's fault type to CH).
    pub degenerated_to_ch: bool,
}

/// Builds the MFDs for one characteristic-event record.
///
/// Four cases by descriptor flags: a bare single bin, shifted single bins
/// per epistemic branch, a Gaussian spread per epistemic branch, or one
/// Gaussian spread. Spread branches preserve either total moment rate or
/// total event rate per the descriptor's balance flag; every branch is
/// scaled by `weight × branch weight`.
pub fn build_ch_mfds(ch: &ChData, md: &MagUncertainty) -> Vec<Mfd> {
    let total_mo_rate = ch.rate * mag_to_moment(ch.mag);
    let total_event_rate = ch.rate;
    let balance = if md.moment_balance {
        Balance::Moment
    } else {
        Balance::Count
    };
    let balanced_total = if md.moment_balance {
        total_mo_rate
    } else {
        total_event_rate
    };

    let mut mfds = Vec::new();
    if md.has_epistemic {
        for i in 0..md.num_epi_branches {
            let epi_mag = ch.mag + md.epi_deltas[i];
            let branch_wt = ch.weight * md.epi_weights[i];
            if md.has_aleatory {
                let mfd = gaussian_mfd(
                    epi_mag,
                    md.alea_sigma,
                    md.alea_mag_count,
                    balance,
                    balanced_total * branch_wt,
                );
                debug!(branch = i + 1, mag = epi_mag, "CH MFD [+epi +ale]");
                mfds.push(mfd);
            } else {
                // moment is always conserved for the shifted single bin so
                // epistemic branches do not inflate the budget
                let branch_mo_rate = total_mo_rate * branch_wt;
                let rate = branch_mo_rate / mag_to_moment(epi_mag);
                debug!(branch = i + 1, mag = epi_mag, rate, "CH MFD [+epi -ale]");
                mfds.push(Mfd::single(epi_mag, rate));
            }
        }
    } else if md.has_aleatory {
        let mfd = gaussian_mfd(
            ch.mag,
            md.alea_sigma,
            md.alea_mag_count,
            balance,
            balanced_total * ch.weight,
        );
        debug!(mag = ch.mag, "CH MFD [-epi +ale]");
        mfds.push(mfd);
    } else {
        debug!(mag = ch.mag, rate = ch.rate, "CH MFD [-epi -ale]");
        mfds.push(Mfd::single(ch.mag, ch.weight * ch.rate));
    }
    mfds
}

/// Builds the MFDs for a source's GR records.
///
/// Any record tripping the magnitude-exception rule suppresses uncertainty
/// for *every* record of the source before any MFD is built. Records left
/// with a single bin degenerate to characteristic events at `mMin`.
pub fn build_gr_mfds(
    records: &[GrData],
    md: &MagUncertainty,
    source_name: &str,
    warnings: &mut WarningLog,
) -> Result<GrOutcome, ModelError> {
    let suppress = records
        .iter()
        .any(|gr| gr.has_mag_exceptions(md, source_name, warnings));
    let md = if suppress { md.suppressed() } else { md.clone() };

    let mut mfds = Vec::new();
    let mut degenerated = false;
    for gr in records {
        if gr.n_mag > 1 {
            mfds.extend(build_gr_branches(gr, &md, source_name, warnings));
        } else if gr.n_mag == 1 {
            let ch = ChData {
                mag: gr.m_min,
                rate: gr_rate(gr.a_val, gr.b_val, gr.m_min),
                weight: gr.weight,
            };
            degenerated = true;
            mfds.extend(build_ch_mfds(&ch, &md));
        } else {
            return Err(ModelError::EmptyGrRecord {
                m_min: gr.m_min,
                m_max: gr.m_max,
            });
        }
    }
    Ok(GrOutcome {
        mfds,
        degenerated_to_ch: degenerated,
    })
}

/// Builds the MFDs for a source's GRB0 records: each record at half weight,
/// once as parsed and once with `b = 0` and the a-value re-derived so the
/// two variants carry identical total moment rates.
pub fn build_grb0_mfds(
    records: &[GrData],
    md: &MagUncertainty,
    source_name: &str,
    warnings: &mut WarningLog,
) -> Result<Vec<Mfd>, ModelError> {
    if md.has_aleatory {
        return Err(ModelError::AleatoryWithB0 {
            sigma: md.alea_sigma,
        });
    }
    for gr in records {
        if gr.m_max <= gr.m_min {
            return Err(ModelError::B0FloatingCh {
                m_min: gr.m_min,
                m_max: gr.m_max,
            });
        }
    }

    let mut mfds = Vec::new();
    for gr in records {
        let mut gr = gr.clone();
        gr.weight *= 0.5;
        mfds.extend(build_gr_branches(&gr, md, source_name, warnings));

        let tmr = total_moment_rate(gr.m_min, gr.n_mag, gr.d_mag, gr.a_val, gr.b_val);
        let tsm = total_moment_rate(gr.m_min, gr.n_mag, gr.d_mag, 0.0, 0.0);
        gr.a_val = (tmr / tsm).log10();
        gr.b_val = 0.0;
        mfds.extend(build_gr_branches(&gr, md, source_name, warnings));
    }
    Ok(mfds)
}

/// One GR record expanded over its epistemic branches.
///
/// The moment budget is fixed from the unshifted record; each branch then
/// spends `weight × branch weight` of it over its own shifted range. A
/// branch whose shifted range holds no bins is warned and skipped.
fn build_gr_branches(
    gr: &GrData,
    md: &MagUncertainty,
    source_name: &str,
    warnings: &mut WarningLog,
) -> Vec<Mfd> {
    let tmr = total_moment_rate(gr.m_min, gr.n_mag, gr.d_mag, gr.a_val, gr.b_val);

    let mut mfds = Vec::new();
    if md.has_epistemic {
        for i in 0..md.num_epi_branches {
            let mut branch = gr.clone();
            branch.m_max = gr.m_max + md.epi_deltas[i];
            branch.update_mag_count();
            if branch.n_mag > 0 {
                branch.weight = gr.weight * md.epi_weights[i];
                debug!(branch = i + 1, m_max = branch.m_max, "GR MFD, M-branch");
                mfds.push(make_gr(&branch, tmr));
            } else {
                warnings.push(format!(
                    "{source_name}: GR MFD epi branch {} with no mags",
                    i + 1
                ));
            }
        }
    } else {
        debug!(m_min = gr.m_min, n_mag = gr.n_mag, "GR MFD");
        mfds.push(make_gr(gr, tmr));
    }
    mfds
}

fn make_gr(gr: &GrData, total_mo_rate: f64) -> Mfd {
    gutenberg_richter_mfd(
        gr.m_min,
        gr.n_mag,
        gr.d_mag,
        gr.b_val,
        gr.weight * total_mo_rate,
    )
}
