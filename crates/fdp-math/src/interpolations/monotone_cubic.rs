//! Monotone-preserving cubic Hermite interpolation.
//!
//! Implements the Fritsch-Carlson algorithm that modifies cubic Hermite
//! slopes to guarantee monotonicity on each sub-interval where the data is
//! monotone.  Monotonicity matters when the interpolated data is a PDE
//! solution near a payoff kink: an unconstrained spline can overshoot and
//! report negative option values between nodes.

use fdp_core::{errors::Result, Real};

use super::{compute_coefficients, locate, Interpolation1D};

/// Monotone-preserving cubic Hermite spline.
///
/// Stores per-interval polynomial coefficients, so the value and the first
/// two derivatives are evaluations of the same piecewise cubic.
#[derive(Debug, Clone)]
pub struct MonotonicCubicSpline {
    xs: Vec<Real>,
    ys: Vec<Real>,
    a: Vec<Real>,
    b: Vec<Real>,
    c: Vec<Real>,
}

impl MonotonicCubicSpline {
    /// Build a monotone cubic spline through the given data.
    ///
    /// # Errors
    /// Fails if there are fewer than 2 points, the lengths differ, or the
    /// abscissae are not strictly increasing.
    pub fn new(xs: &[Real], ys: &[Real]) -> Result<Self> {
        let n = xs.len();
        fdp_core::ensure!(n >= 2, "need at least 2 points, got {n}");
        fdp_core::ensure!(xs.len() == ys.len(), "xs and ys must match in length");
        for i in 0..n - 1 {
            fdp_core::ensure!(
                xs[i + 1] > xs[i],
                "abscissae must be strictly increasing: x[{}]={} >= x[{}]={}",
                i,
                xs[i],
                i + 1,
                xs[i + 1]
            );
        }

        let xs = xs.to_vec();
        let ys = ys.to_vec();

        // Step 1: compute secant slopes δ_i
        let mut delta = Vec::with_capacity(n - 1);
        for i in 0..n - 1 {
            delta.push((ys[i + 1] - ys[i]) / (xs[i + 1] - xs[i]));
        }

        // Step 2: initial tangent estimates (three-point formula)
        let mut ts = vec![0.0; n];
        ts[0] = delta[0];
        ts[n - 1] = delta[n - 2];
        for i in 1..n - 1 {
            ts[i] = 0.5 * (delta[i - 1] + delta[i]);
        }

        // Step 3: Fritsch-Carlson monotonicity corrections
        for i in 0..n - 1 {
            if delta[i].abs() < 1e-30 {
                // Flat segment — force both tangents to zero
                ts[i] = 0.0;
                ts[i + 1] = 0.0;
            } else {
                let alpha = ts[i] / delta[i];
                let beta = ts[i + 1] / delta[i];
                // Stay inside the monotone region: α² + β² ≤ 9
                let r2 = alpha * alpha + beta * beta;
                if r2 > 9.0 {
                    let tau = 3.0 / r2.sqrt();
                    ts[i] = tau * alpha * delta[i];
                    ts[i + 1] = tau * beta * delta[i];
                }
            }
        }

        let (a, b, c) = compute_coefficients(&xs, &ys, &ts);
        Ok(Self { xs, ys, a, b, c })
    }
}

impl Interpolation1D for MonotonicCubicSpline {
    fn x_min(&self) -> Real {
        self.xs[0]
    }

    fn x_max(&self) -> Real {
        *self.xs.last().unwrap()
    }

    fn value(&self, x: Real) -> Real {
        let i = locate(&self.xs, x);
        let dx = x - self.xs[i];
        self.ys[i] + dx * (self.a[i] + dx * (self.b[i] + dx * self.c[i]))
    }

    fn derivative(&self, x: Real) -> Real {
        let i = locate(&self.xs, x);
        let dx = x - self.xs[i];
        self.a[i] + dx * (2.0 * self.b[i] + dx * 3.0 * self.c[i])
    }

    fn second_derivative(&self, x: Real) -> Real {
        let i = locate(&self.xs, x);
        let dx = x - self.xs[i];
        2.0 * self.b[i] + dx * 6.0 * self.c[i]
    }
}
