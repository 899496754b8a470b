//! Base trait for one-dimensional stochastic processes.

use fdp_core::{Real, Time};

/// A one-dimensional Itô process `dX = μ(t,X) dt + σ(t,X) dW`.
pub trait StochasticProcess1D: std::fmt::Debug {
    /// Initial value of the process.
    fn x0(&self) -> Real;

    /// Drift `μ(t, x)`.
    fn drift(&self, t: Time, x: Real) -> Real;

    /// Diffusion `σ(t, x)`.
    fn diffusion(&self, t: Time, x: Real) -> Real;
}
