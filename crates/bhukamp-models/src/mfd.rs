//! Evenly discretized incremental magnitude-frequency distribution.

use crate::moment::mag_to_moment;
use serde::{Deserialize, Serialize};

/// An incremental MFD: annual event rates at fixed magnitude spacing.
///
/// Bin count, first magnitude and spacing are immutable after construction;
/// individual rates stay mutable for the pre-publication rescaling passes
/// (grid craton/margin tapers, weight scaling).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mfd {
    min: f64,
    delta: f64,
    rates: Vec<f64>,
}

impl Mfd {
    /// Creates a zero-rate MFD of `num` bins starting at `min` with spacing
    /// `delta`. A single-bin MFD carries delta 0.
    pub fn new(min: f64, num: usize, delta: f64) -> Self {
        assert!(num > 0, "MFD needs at least one bin");
        Mfd {
            min,
            delta: if num == 1 { 0.0 } else { delta },
            rates: vec![0.0; num],
        }
    }

    /// Creates a `num`-bin MFD spanning `[min, max]` inclusive.
    pub fn spanning(min: f64, max: f64, num: usize) -> Self {
        assert!(num > 0, "MFD needs at least one bin");
        let delta = if num == 1 { 0.0 } else { (max - min) / (num - 1) as f64 };
        Mfd {
            min,
            delta,
            rates: vec![0.0; num],
        }
    }

    /// Creates an MFD from explicit per-bin rates.
    pub fn with_rates(min: f64, delta: f64, rates: Vec<f64>) -> Self {
        assert!(!rates.is_empty(), "MFD needs at least one bin");
        Mfd {
            min,
            delta: if rates.len() == 1 { 0.0 } else { delta },
            rates,
        }
    }

    /// Single delta-function bin at `mag` with the given rate.
    pub fn single(mag: f64, rate: f64) -> Self {
        Mfd {
            min: mag,
            delta: 0.0,
            rates: vec![rate],
        }
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Magnitude at bin `i`.
    pub fn mag(&self, i: usize) -> f64 {
        self.min + i as f64 * self.delta
    }

    pub fn min_mag(&self) -> f64 {
        self.min
    }

    pub fn max_mag(&self) -> f64 {
        self.mag(self.rates.len() - 1)
    }

    pub fn delta(&self) -> f64 {
        self.delta
    }

    pub fn rate(&self, i: usize) -> f64 {
        self.rates[i]
    }

    pub fn set_rate(&mut self, i: usize, rate: f64) {
        self.rates[i] = rate;
    }

    /// Index of the bin whose center is nearest `mag`, if within half a bin.
    pub fn index_of(&self, mag: f64) -> Option<usize> {
        if self.rates.len() == 1 {
            return ((mag - self.min).abs() < 1e-6).then_some(0);
        }
        let raw = (mag - self.min) / self.delta;
        let i = raw.round();
        if i < 0.0 || i as usize >= self.rates.len() {
            return None;
        }
        ((raw - i).abs() <= 0.5).then_some(i as usize)
    }

    /// `(magnitude, rate)` pairs in bin order.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.rates
            .iter()
            .enumerate()
            .map(|(i, &r)| (self.mag(i), r))
    }

    /// Sum of incremental rates (total annual event rate).
    pub fn total_incr_rate(&self) -> f64 {
        self.rates.iter().sum()
    }

    /// Total annual moment rate implied by the distribution.
    pub fn total_moment_rate(&self) -> f64 {
        self.iter().map(|(m, r)| r * mag_to_moment(m)).sum()
    }

    /// Multiplies every rate by `factor`.
    pub fn scale(&mut self, factor: f64) {
        for r in &mut self.rates {
            *r *= factor;
        }
    }

    /// Rescales so the total moment rate equals `target`.
    pub fn scale_to_total_moment_rate(&mut self, target: f64) {
        let current = self.total_moment_rate();
        if current > 0.0 {
            self.scale(target / current);
        }
    }

    /// Rescales so the total event rate equals `target`.
    pub fn scale_to_total_incr_rate(&mut self, target: f64) {
        let current = self.total_incr_rate();
        if current > 0.0 {
            self.scale(target / current);
        }
    }

    /// Rescales so the rate in the bin at `mag` equals `target`.
    ///
    /// No-op scaling when the current rate at `mag` is zero would divide by
    /// zero; such distributions are rejected upstream.
    pub fn scale_to_incr_rate(&mut self, mag: f64, target: f64) {
        if let Some(i) = self.index_of(mag) {
            let current = self.rates[i];
            if current > 0.0 {
                self.scale(target / current);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use crate::moment::mag_to_moment;

    #[test]
    fn single_bin_has_zero_delta() {
        let mfd = Mfd::single(6.5, 0.002);
        assert_eq!(mfd.len(), 1);
        assert_eq!(mfd.mag(0), 6.5);
        assert_eq!(mfd.rate(0), 0.002);
        assert_eq!(mfd.delta(), 0.0);
    }

    #[test]
    fn spanning_bins_are_even() {
        let mfd = Mfd::spanning(6.0, 7.0, 11);
        assert_relative_eq!(mfd.delta(), 0.1);
        assert_relative_eq!(mfd.max_mag(), 7.0);
        assert_eq!(mfd.index_of(6.5), Some(5));
        assert_eq!(mfd.index_of(7.2), None);
    }

    #[test]
    fn moment_rate_scaling() {
        let mut mfd = Mfd::new(6.05, 5, 0.1);
        for i in 0..5 {
            mfd.set_rate(i, 0.01);
        }
        mfd.scale_to_total_moment_rate(1e17);
        assert_relative_eq!(mfd.total_moment_rate(), 1e17, max_relative = 1e-12);
    }

    #[test]
    fn incr_rate_scaling_pins_one_bin() {
        let mut mfd = Mfd::new(5.05, 3, 0.1);
        mfd.set_rate(0, 2.0);
        mfd.set_rate(1, 1.0);
        mfd.set_rate(2, 0.5);
        mfd.scale_to_incr_rate(5.05, 0.04);
        assert_relative_eq!(mfd.rate(0), 0.04);
        assert_relative_eq!(mfd.rate(1), 0.02);
    }

    #[test]
    fn moment_total_matches_hand_sum() {
        let mut mfd = Mfd::new(6.0, 2, 0.5);
        mfd.set_rate(0, 0.1);
        mfd.set_rate(1, 0.2);
        let expect = 0.1 * mag_to_moment(6.0) + 0.2 * mag_to_moment(6.5);
        assert_relative_eq!(mfd.total_moment_rate(), expect);
    }
}
