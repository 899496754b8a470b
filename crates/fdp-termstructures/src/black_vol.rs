//! Black-volatility term structures.

use fdp_core::{Real, Time, Volatility};

/// A Black-volatility term structure.
///
/// Implementors must provide **exactly one** of:
/// * [`black_vol`](BlackVolTermStructure::black_vol) — σ(t, k)
/// * [`black_variance`](BlackVolTermStructure::black_variance) — σ²·t
///
/// The other is derived automatically.
pub trait BlackVolTermStructure: std::fmt::Debug {
    /// Return the Black volatility for time `t` and strike `strike`.
    fn black_vol(&self, t: Time, strike: Real) -> Volatility {
        let var = self.black_variance(t, strike);
        if t <= 0.0 {
            return 0.0;
        }
        (var / t).sqrt()
    }

    /// Return the Black variance `σ²·t` for time `t` and strike `strike`.
    fn black_variance(&self, t: Time, strike: Real) -> Real {
        let vol = self.black_vol(t, strike);
        vol * vol * t
    }

    /// The forward variance between `t1` and `t2` at the given strike,
    /// divided by the interval length.
    fn forward_variance(&self, t1: Time, t2: Time, strike: Real) -> Real {
        if (t2 - t1).abs() < 1e-12 {
            let vol = self.black_vol(t1.max(0.0), strike);
            vol * vol
        } else {
            (self.black_variance(t2, strike) - self.black_variance(t1, strike)) / (t2 - t1)
        }
    }
}

/// A flat Black volatility surface.
#[derive(Debug, Clone)]
pub struct BlackConstantVol {
    volatility: Volatility,
}

impl BlackConstantVol {
    /// Create a constant Black vol surface.
    pub fn new(volatility: Volatility) -> Self {
        Self { volatility }
    }
}

impl BlackVolTermStructure for BlackConstantVol {
    fn black_vol(&self, _t: Time, _strike: Real) -> Volatility {
        self.volatility
    }
}
