//! Recurrence records and the magnitude-uncertainty descriptor.
//!
//! A fault source's recurrence is described by one or more record lines
//! (characteristic or Gutenberg-Richter) plus a shared 4-line uncertainty
//! block. The uncertainty descriptor is an immutable value: suppression
//! produces a new value, so one source tripping the magnitude-exception rule
//! can never leak cleared flags into another source parsed from the same
//! block.

use crate::fields::{read_f64, read_f64s, read_int};
use crate::{ModelError, WarningLog};
use serde::{Deserialize, Serialize};

/// Bin spacings at or below this collapse numerically and are corrected.
pub const MIN_D_MAG: f64 = 0.004;

/// Replacement spacing for degenerate `dMag` inputs.
pub const DEFAULT_D_MAG: f64 = 0.1;

/// Magnitude floor below which model uncertainty is suppressed.
///
/// Hard-coded legacy domain constant; flagged for domain-expert review, do
/// not generalize.
pub const MAG_EXCEPTION_FLOOR: f64 = 6.5;

/// A characteristic event: a delta-function recurrence spike.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChData {
    pub mag: f64,
    /// Annual event rate.
    pub rate: f64,
    /// Multiplicative branch weight.
    pub weight: f64,
}

impl ChData {
    /// Parses `mag rate weight` from a record line.
    pub fn from_line(line: &str) -> Result<Self, ModelError> {
        let v = read_f64s(line, 3)?;
        Ok(ChData {
            mag: v[0],
            rate: v[1],
            weight: v[2],
        })
    }
}

/// A truncated Gutenberg-Richter recurrence record.
///
/// `m_max` and `weight` vary during epistemic branching; everything else is
/// fixed once parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrData {
    /// log10 a-value for fault records; unused (0) for grid descriptors.
    pub a_val: f64,
    pub b_val: f64,
    pub m_min: f64,
    pub m_max: f64,
    pub d_mag: f64,
    pub weight: f64,
    /// Derived bin count; 0 when the (possibly shifted) range is empty.
    pub n_mag: usize,
}

impl GrData {
    /// Parses `a b mMin mMax dMag weight` from a fault record line, corrects
    /// degenerate spacing, recenters bins and derives the bin count.
    pub fn from_fault_line(line: &str, warnings: &mut WarningLog) -> Result<Self, ModelError> {
        let v = read_f64s(line, 6)?;
        let mut gr = GrData {
            a_val: v[0],
            b_val: v[1],
            m_min: v[2],
            m_max: v[3],
            d_mag: v[4],
            weight: v[5],
            n_mag: 0,
        };
        gr.validate_d_mag(warnings);
        gr.recenter_mag_bins();
        gr.update_mag_count();
        Ok(gr)
    }

    /// Parses the flat `b mMin mMax dMag` grid descriptor. Values stay raw;
    /// recentering happens per node in [`GrData::for_grid_node`].
    pub fn from_grid_line(line: &str, warnings: &mut WarningLog) -> Result<Self, ModelError> {
        let v = read_f64s(line, 4)?;
        let mut gr = GrData {
            a_val: 0.0,
            b_val: v[0],
            m_min: v[1],
            m_max: v[2],
            d_mag: v[3],
            weight: 1.0,
            n_mag: 0,
        };
        gr.validate_d_mag(warnings);
        Ok(gr)
    }

    /// Per-node grid record with the node's (linear) a-value and overlaid b
    /// and mMax grid values.
    pub fn for_grid_node(a_val: f64, b_val: f64, m_min: f64, m_max: f64, d_mag: f64) -> Self {
        let mut gr = GrData {
            a_val,
            b_val,
            m_min,
            m_max,
            d_mag,
            weight: 1.0,
            n_mag: 0,
        };
        gr.recenter_mag_bins();
        gr.update_mag_count();
        gr
    }

    fn validate_d_mag(&mut self, warnings: &mut WarningLog) {
        if self.d_mag <= MIN_D_MAG {
            warnings.push(format!(
                "dMag {} is below {}; corrected to {}",
                self.d_mag, MIN_D_MAG, DEFAULT_D_MAG
            ));
            self.d_mag = DEFAULT_D_MAG;
        }
    }

    /// Moves `m_min`/`m_max` from bin edges to bin centers. A degenerate
    /// record (`m_min == m_max`) stays a single closed magnitude.
    fn recenter_mag_bins(&mut self) {
        if self.m_min == self.m_max {
            return;
        }
        self.m_min += self.d_mag / 2.0;
        // epsilon guards the derived bin count against float drift
        self.m_max += -self.d_mag / 2.0 + 0.0001;
    }

    /// Re-derives `n_mag` from the current magnitude range.
    ///
    /// Called again whenever an epistemic branch shifts `m_max`.
    pub fn update_mag_count(&mut self) {
        let raw = ((self.m_max - self.m_min) / self.d_mag + 1.4).trunc();
        self.n_mag = if raw < 1.0 { 0 } else { raw as usize };
    }

    /// The magnitude-exception rule: uncertainty treatment collapses for
    /// sources whose effective maximum magnitude falls below the floor.
    ///
    /// Multi-bin records test `mMax` shifted by the first epistemic delta;
    /// single-bin records additionally subtract the 2-sigma aleatory spread.
    pub fn has_mag_exceptions(
        &self,
        md: &MagUncertainty,
        source_name: &str,
        warnings: &mut WarningLog,
    ) -> bool {
        let shifted = self.m_max + md.first_epi_delta();
        if self.n_mag > 1 {
            if shifted < MAG_EXCEPTION_FLOOR {
                warnings.push(format!(
                    "{source_name}: mMax + epi {shifted:.3} below {MAG_EXCEPTION_FLOOR}; \
                     uncertainty suppressed"
                ));
                return true;
            }
        } else if self.n_mag == 1 && shifted - 2.0 * md.alea_sigma < MAG_EXCEPTION_FLOOR {
            warnings.push(format!(
                "{source_name}: mMax + epi - 2σ {:.3} below {MAG_EXCEPTION_FLOOR}; \
                 uncertainty suppressed",
                shifted - 2.0 * md.alea_sigma
            ));
            return true;
        }
        false
    }
}

/// Epistemic and aleatory magnitude uncertainty for one source file.
///
/// Immutable value type: [`MagUncertainty::suppressed`] returns a flag-
/// cleared copy rather than mutating in place. Epistemic weights are
/// multiplicative scalings, not a probability partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MagUncertainty {
    pub num_epi_branches: usize,
    pub epi_deltas: Vec<f64>,
    pub epi_weights: Vec<f64>,
    pub alea_sigma: f64,
    /// Always odd (2k + 1 bins around the central magnitude).
    pub alea_mag_count: usize,
    /// Moment-balanced when the raw sigma input was positive.
    pub moment_balance: bool,
    pub has_epistemic: bool,
    pub has_aleatory: bool,
}

impl MagUncertainty {
    /// Parses the 4-line uncertainty block:
    /// branch count / deltas / weights / `sigma nBins`.
    pub fn from_block(lines: &[String]) -> Result<Self, ModelError> {
        assert_eq!(lines.len(), 4, "uncertainty block is 4 lines");
        let count = read_int(&lines[0], 0)?.max(0) as usize;
        let epi_deltas = read_f64s(&lines[1], count)?;
        let epi_weights = read_f64s(&lines[2], count)?;
        let sigma_raw = read_f64(&lines[3], 0)?;
        let half_count = read_f64(&lines[3], 1)?;
        let alea_sigma = sigma_raw.abs();
        let alea_mag_count = (half_count as i64 * 2 + 1).max(1) as usize;
        Ok(MagUncertainty {
            num_epi_branches: count,
            epi_deltas,
            epi_weights,
            alea_sigma,
            alea_mag_count,
            moment_balance: sigma_raw > 0.0,
            has_epistemic: count > 1,
            has_aleatory: alea_mag_count > 1 && alea_sigma != 0.0,
        })
    }

    /// Uncertainty descriptor with no branching at all.
    pub fn none() -> Self {
        MagUncertainty {
            num_epi_branches: 1,
            epi_deltas: vec![0.0],
            epi_weights: vec![1.0],
            alea_sigma: 0.0,
            alea_mag_count: 1,
            moment_balance: false,
            has_epistemic: false,
            has_aleatory: false,
        }
    }

    /// Copy with epistemic and aleatory treatment permanently cleared.
    pub fn suppressed(&self) -> Self {
        MagUncertainty {
            has_epistemic: false,
            has_aleatory: false,
            ..self.clone()
        }
    }

    /// Delta of the first (usually most negative) epistemic branch; zero
    /// when the block declared no branches.
    pub fn first_epi_delta(&self) -> f64 {
        self.epi_deltas.first().copied().unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn block(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_uncertainty_block() {
        let md = MagUncertainty::from_block(&block(&[
            "3",
            "-0.2 0.0 0.2",
            "0.2 0.6 0.2",
            "0.12 5",
        ]))
        .unwrap();
        assert!(md.has_epistemic);
        assert!(md.has_aleatory);
        assert!(md.moment_balance);
        assert_eq!(md.alea_mag_count, 11);
        assert_relative_eq!(md.first_epi_delta(), -0.2);
    }

    #[test]
    fn negative_sigma_means_count_balance() {
        let md =
            MagUncertainty::from_block(&block(&["1", "0.0", "1.0", "-0.12 5"])).unwrap();
        assert!(!md.moment_balance);
        assert!(md.has_aleatory);
        assert!(!md.has_epistemic);
        assert_relative_eq!(md.alea_sigma, 0.12);
    }

    #[test]
    fn zero_sigma_disables_aleatory() {
        let md = MagUncertainty::from_block(&block(&["1", "0.0", "1.0", "0.0 5"])).unwrap();
        assert!(!md.has_aleatory);
    }

    #[test]
    fn suppression_returns_new_value() {
        let md = MagUncertainty::from_block(&block(&[
            "3",
            "-0.2 0.0 0.2",
            "0.2 0.6 0.2",
            "0.12 5",
        ]))
        .unwrap();
        let sup = md.suppressed();
        assert!(md.has_epistemic && md.has_aleatory);
        assert!(!sup.has_epistemic && !sup.has_aleatory);
        // everything else carries over
        assert_eq!(sup.epi_weights, md.epi_weights);
        assert_eq!(sup.moment_balance, md.moment_balance);
    }

    #[test]
    fn gr_recentring_and_count() {
        let mut warnings = WarningLog::new();
        let gr =
            GrData::from_fault_line("2.5 0.8 6.0 7.0 0.1 1.0", &mut warnings).unwrap();
        assert_relative_eq!(gr.m_min, 6.05);
        assert_relative_eq!(gr.m_max, 6.9501);
        assert_eq!(gr.n_mag, 10);
        assert!(warnings.is_empty());
    }

    #[test]
    fn degenerate_gr_stays_single_magnitude() {
        let mut warnings = WarningLog::new();
        let gr =
            GrData::from_fault_line("3.0 0.9 6.0 6.0 0.1 1.0", &mut warnings).unwrap();
        assert_relative_eq!(gr.m_min, 6.0);
        assert_relative_eq!(gr.m_max, 6.0);
        assert_eq!(gr.n_mag, 1);
    }

    #[test]
    fn d_mag_correction_is_idempotent() {
        let mut w1 = WarningLog::new();
        let mut w2 = WarningLog::new();
        let a = GrData::from_fault_line("2.0 0.9 5.0 7.0 0.001 1.0", &mut w1).unwrap();
        let b = GrData::from_fault_line("2.0 0.9 5.0 7.0 0.001 1.0", &mut w2).unwrap();
        assert_relative_eq!(a.d_mag, DEFAULT_D_MAG);
        assert_eq!(a, b);
        assert_eq!(w1.len(), 1);
    }

    #[test]
    fn mag_exception_multi_bin() {
        let mut warnings = WarningLog::new();
        let md = MagUncertainty::from_block(&block(&[
            "3",
            "-0.2 0.0 0.2",
            "0.2 0.6 0.2",
            "0.12 5",
        ]))
        .unwrap();
        // recentered mMax ~6.45; 6.45 - 0.2 < 6.5
        let gr = GrData::from_fault_line("2.0 0.9 5.0 6.5 0.1 1.0", &mut warnings).unwrap();
        assert!(gr.has_mag_exceptions(&md, "test src", &mut warnings));
        // comfortably above the floor
        let gr = GrData::from_fault_line("2.0 0.9 5.0 7.5 0.1 1.0", &mut warnings).unwrap();
        assert!(!gr.has_mag_exceptions(&md, "test src", &mut warnings));
    }

    #[test]
    fn mag_exception_single_bin_uses_sigma() {
        let mut warnings = WarningLog::new();
        let md =
            MagUncertainty::from_block(&block(&["1", "0.0", "1.0", "0.12 5"])).unwrap();
        // single closed magnitude at 6.6: 6.6 - 0.24 < 6.5
        let gr = GrData::from_fault_line("2.0 0.9 6.6 6.6 0.1 1.0", &mut warnings).unwrap();
        assert_eq!(gr.n_mag, 1);
        assert!(gr.has_mag_exceptions(&md, "test src", &mut warnings));
        // at 7.0: 7.0 - 0.24 >= 6.5
        let gr = GrData::from_fault_line("2.0 0.9 7.0 7.0 0.1 1.0", &mut warnings).unwrap();
        assert!(!gr.has_mag_exceptions(&md, "test src", &mut warnings));
    }

    #[test]
    fn epi_shift_can_empty_a_branch() {
        let mut warnings = WarningLog::new();
        let mut gr =
            GrData::from_fault_line("2.0 0.9 6.4 6.6 0.1 1.0", &mut warnings).unwrap();
        assert_eq!(gr.n_mag, 2);
        gr.m_max -= 0.5;
        gr.update_mag_count();
        assert_eq!(gr.n_mag, 0);
    }
}
