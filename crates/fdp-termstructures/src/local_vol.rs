//! Local-volatility term structures.

use fdp_core::{Real, Time, Volatility};

/// A local-volatility surface: `σ_local(t, S)`.
pub trait LocalVolTermStructure: std::fmt::Debug {
    /// Return the local volatility for time `t` and underlying price
    /// `underlying`.
    fn local_vol(&self, t: Time, underlying: Real) -> Volatility;
}

/// A constant local volatility surface.
///
/// `σ_local(t, S) = constant` for all `t` and `S`.
#[derive(Debug, Clone)]
pub struct LocalConstantVol {
    volatility: Volatility,
}

impl LocalConstantVol {
    /// Create a constant local vol surface.
    pub fn new(volatility: Volatility) -> Self {
        Self { volatility }
    }
}

impl LocalVolTermStructure for LocalConstantVol {
    fn local_vol(&self, _t: Time, _underlying: Real) -> Volatility {
        self.volatility
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn constant_local_vol() {
        let lv = LocalConstantVol::new(0.25);
        assert_abs_diff_eq!(lv.local_vol(0.5, 80.0), 0.25, epsilon = 1e-15);
        assert_abs_diff_eq!(lv.local_vol(2.0, 120.0), 0.25, epsilon = 1e-15);
    }
}
