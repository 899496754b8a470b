//! Time-stepping scheme descriptors.

use fdp_core::{ensure, errors::Result, Real};

/// Describes a θ-scheme time step.
///
/// One step from `t + Δt` to `t` solves
///
/// `(I − θ·Δt·L)·aₜ = (I + (1−θ)·Δt·L)·a_{t+Δt}`
///
/// θ = 0 is explicit Euler, θ = 1 implicit Euler, θ = ½ Crank-Nicolson.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FdmSchemeDesc {
    /// Implicitness weight in `[0, 1]`.
    pub theta: Real,
}

impl FdmSchemeDesc {
    /// A scheme with an arbitrary implicitness weight.
    ///
    /// # Errors
    /// Fails unless `0 ≤ θ ≤ 1`.
    pub fn new(theta: Real) -> Result<Self> {
        ensure!((0.0..=1.0).contains(&theta), "theta must be in [0, 1], got {theta}");
        Ok(Self { theta })
    }

    /// The default scheme for one-factor problems (θ = ½).
    pub fn douglas() -> Self {
        Self { theta: 0.5 }
    }

    /// Crank-Nicolson (θ = ½).
    pub fn crank_nicolson() -> Self {
        Self { theta: 0.5 }
    }

    /// Implicit Euler (θ = 1): unconditionally stable, first order,
    /// strongly damping.  Used for the damping phase.
    pub fn implicit_euler() -> Self {
        Self { theta: 1.0 }
    }

    /// Explicit Euler (θ = 0): conditionally stable, test use only.
    pub fn explicit_euler() -> Self {
        Self { theta: 0.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_schemes() {
        assert_eq!(FdmSchemeDesc::douglas().theta, 0.5);
        assert_eq!(FdmSchemeDesc::crank_nicolson().theta, 0.5);
        assert_eq!(FdmSchemeDesc::implicit_euler().theta, 1.0);
        assert_eq!(FdmSchemeDesc::explicit_euler().theta, 0.0);
    }

    #[test]
    fn theta_is_bounded() {
        assert!(FdmSchemeDesc::new(0.3).is_ok());
        assert!(FdmSchemeDesc::new(-0.1).is_err());
        assert!(FdmSchemeDesc::new(1.1).is_err());
    }
}
