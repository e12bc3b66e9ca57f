//! Seismic moment and Gutenberg-Richter rate math.
//!
//! These are exact numeric contracts shared with the legacy hazard codes;
//! the constants (including the 1e-10 moment-rate seed) must not change.

/// Total seismic moment (N·m) of an earthquake of moment magnitude `mag`.
pub fn mag_to_moment(mag: f64) -> f64 {
    10f64.powf(1.5 * mag + 9.05)
}

/// Incremental GR rate at `mag` for a log10 a-value: `10^(a - b·M)`.
pub fn gr_rate(a: f64, b: f64, mag: f64) -> f64 {
    10f64.powf(a - b * mag)
}

/// Incremental GR rate at `mag` for a linear a-value: `a·10^(-b·M)`.
///
/// Grid a-value files store the linear coefficient; fault records store
/// log10 a-values. The two conventions are deliberately kept as separate
/// functions.
pub fn incr_rate(a: f64, b: f64, mag: f64) -> f64 {
    a * 10f64.powf(-b * mag)
}

/// Total moment rate of an incremental GR distribution over `n_mag` bins.
///
/// Seeded with a small non-zero rate so downstream log and ratio operations
/// never see an exact zero.
pub fn total_moment_rate(m_min: f64, n_mag: usize, d_mag: f64, a: f64, b: f64) -> f64 {
    let mut mo_rate = 1e-10;
    for i in 0..n_mag {
        let m = m_min + i as f64 * d_mag;
        mo_rate += gr_rate(a, b, m) * mag_to_moment(m);
    }
    mo_rate
}

/// Poisson probability of at least one occurrence in `time` years given an
/// annual `rate`.
pub fn rate_to_prob(rate: f64, time: f64) -> f64 {
    1.0 - (-rate * time).exp()
}

/// Annual rate recovered from a Poisson probability over `time` years.
pub fn prob_to_rate(p: f64, time: f64) -> f64 {
    -(1.0 - p).ln() / time
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn moment_of_m0_is_reference_value() {
        assert_relative_eq!(mag_to_moment(0.0), 10f64.powf(9.05));
    }

    #[test]
    fn gr_rate_conventions_agree_when_linear_a_is_pow10() {
        let (a, b, m) = (3.0, 0.9, 6.5);
        assert_relative_eq!(gr_rate(a, b, m), incr_rate(10f64.powf(a), b, m));
    }

    #[test]
    fn total_moment_rate_is_seeded() {
        // zero bins leaves only the seed
        assert_relative_eq!(total_moment_rate(6.0, 0, 0.1, 3.0, 0.9), 1e-10);
    }

    #[test]
    fn total_moment_rate_sums_bins() {
        let tmr = total_moment_rate(6.0, 2, 0.1, 3.0, 0.9);
        let expect = 1e-10
            + gr_rate(3.0, 0.9, 6.0) * mag_to_moment(6.0)
            + gr_rate(3.0, 0.9, 6.1) * mag_to_moment(6.1);
        assert_relative_eq!(tmr, expect);
    }

    #[test]
    fn rate_prob_round_trip() {
        let rate = 0.002;
        let p = rate_to_prob(rate, 50.0);
        assert_relative_eq!(prob_to_rate(p, 50.0), rate, max_relative = 1e-12);
    }
}
