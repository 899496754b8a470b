//! 1D interpolation.
//!
//! The finite-difference layer stores a discrete solution per grid node and
//! answers continuous queries through an interpolant, so the trait here
//! exposes the value *and* its first two derivatives — the derivative
//! queries are what delta and gamma are made of.

use fdp_core::Real;

mod monotone_cubic;

pub use monotone_cubic::MonotonicCubicSpline;

/// A 1D interpolation function `f: R → R` defined by a set of known points.
pub trait Interpolation1D: std::fmt::Debug {
    /// Evaluate the interpolation at `x`.
    fn value(&self, x: Real) -> Real;

    /// Evaluate the first derivative `f'(x)`.
    fn derivative(&self, x: Real) -> Real;

    /// Evaluate the second derivative `f''(x)`.
    fn second_derivative(&self, x: Real) -> Real;

    /// Return the lower bound of the interpolation domain.
    fn x_min(&self) -> Real;

    /// Return the upper bound of the interpolation domain.
    fn x_max(&self) -> Real;

    /// Return `true` if `x` is within the interpolation range.
    fn is_in_range(&self, x: Real) -> bool {
        x >= self.x_min() && x <= self.x_max()
    }
}

/// Binary search: find `i` such that `xs[i] <= x < xs[i+1]`, clamped.
pub(crate) fn locate(xs: &[Real], x: Real) -> usize {
    let n = xs.len();
    if x <= xs[0] {
        return 0;
    }
    if x >= xs[n - 1] {
        return n - 2;
    }
    let mut lo = 0;
    let mut hi = n - 1;
    while hi - lo > 1 {
        let mid = (lo + hi) / 2;
        if xs[mid] <= x {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    lo
}

/// Convert slopes (`ts`) + data (`xs`, `ys`) into polynomial coefficients.
///
/// For each interval `[x_i, x_{i+1}]`:
///
///   `f(x) = y_i + dx*(a_i + dx*(b_i + dx*c_i))`
///
/// where `dx = x - x_i`.
pub(crate) fn compute_coefficients(
    xs: &[Real],
    ys: &[Real],
    ts: &[Real],
) -> (Vec<Real>, Vec<Real>, Vec<Real>) {
    let n = xs.len();
    let mut a = Vec::with_capacity(n - 1);
    let mut b = Vec::with_capacity(n - 1);
    let mut c = Vec::with_capacity(n - 1);

    for i in 0..n - 1 {
        let dx = xs[i + 1] - xs[i];
        let s = (ys[i + 1] - ys[i]) / dx;
        a.push(ts[i]);
        b.push((3.0 * s - ts[i + 1] - 2.0 * ts[i]) / dx);
        c.push((ts[i + 1] + ts[i] - 2.0 * s) / (dx * dx));
    }

    (a, b, c)
}
