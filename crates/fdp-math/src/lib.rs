//! # fdp-math
//!
//! Mathematical utilities for fdpricer-rs: the `Array` newtype over
//! nalgebra, 1D interpolation schemes (including the monotone cubic spline
//! used to read values off a finite-difference grid), floating-point
//! comparison helpers, and the normal distribution.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// 1D array of reals (nalgebra-backed).
pub mod array;

/// Floating-point comparison utilities.
pub mod comparison;

/// Probability distributions.
pub mod distributions;

/// 1D interpolation schemes.
pub mod interpolations;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use array::Array;
pub use comparison::{close, close_enough};
pub use distributions::{normal_cdf, normal_pdf};
pub use interpolations::{Interpolation1D, MonotonicCubicSpline};
