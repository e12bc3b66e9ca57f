//! Truncated-Gaussian MFD construction.
//!
//! Models aleatory magnitude spread: event likelihood falls off as a normal
//! density around the central magnitude, truncated two-sided at 2 sigma.

use crate::mfd::Mfd;
use crate::types::Balance;

/// Two-sided truncation level, in sigma units. The bin range spans exactly
/// the truncated support, so no density is clipped inside it.
pub const TRUNC_LEVEL: f64 = 2.0;

/// Builds a Gaussian-spread MFD centered on `mean` with standard deviation
/// `sigma` and `num` bins over `[mean - 2σ, mean + 2σ]`.
///
/// `total` is either the target total moment rate or the target total event
/// rate, selected by `balance`.
pub fn gaussian_mfd(mean: f64, sigma: f64, num: usize, balance: Balance, total: f64) -> Mfd {
    let mut mfd = Mfd::spanning(mean - TRUNC_LEVEL * sigma, mean + TRUNC_LEVEL * sigma, num);
    for i in 0..num {
        let z = (mfd.mag(i) - mean) / sigma;
        let density = if z.abs() > TRUNC_LEVEL {
            0.0
        } else {
            (-0.5 * z * z).exp()
        };
        mfd.set_rate(i, density);
    }
    match balance {
        Balance::Moment => mfd.scale_to_total_moment_rate(total),
        Balance::Count => mfd.scale_to_total_incr_rate(total),
    }
    mfd
}
