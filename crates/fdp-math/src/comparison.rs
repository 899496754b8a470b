//! Floating-point comparison utilities.

use fdp_core::Real;

/// Default epsilon for close-enough comparisons.
pub const EPSILON: Real = 1e-10;

/// Return `true` if `|a - b| <= epsilon`.
#[inline]
pub fn close(a: Real, b: Real, epsilon: Real) -> bool {
    (a - b).abs() <= epsilon
}

/// Return `true` if `|a - b| <= n * epsilon` where `epsilon` is the
/// machine-epsilon relative to `max(|a|, |b|)`.
#[inline]
pub fn close_enough(a: Real, b: Real, n: u32) -> bool {
    if a == b {
        return true;
    }
    let eps = (a.abs().max(b.abs())) * f64::EPSILON * n as f64;
    (a - b).abs() <= eps
}
