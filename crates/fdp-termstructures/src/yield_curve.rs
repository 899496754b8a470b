//! Yield term structures.

use fdp_core::{DiscountFactor, Rate, Time};

/// A continuously-compounded yield curve.
///
/// Implementors provide the zero rate; discount factors and forward rates
/// are derived from it.
pub trait YieldTermStructure: std::fmt::Debug {
    /// The continuously-compounded zero rate for maturity `t`.
    fn zero_rate(&self, t: Time) -> Rate;

    /// The discount factor `P(t) = exp(-z(t)·t)`.
    fn discount(&self, t: Time) -> DiscountFactor {
        (-self.zero_rate(t) * t).exp()
    }

    /// The continuously-compounded forward rate between `t1` and `t2`.
    ///
    /// Collapses to the instantaneous rate when the interval degenerates.
    fn forward_rate(&self, t1: Time, t2: Time) -> Rate {
        if (t2 - t1).abs() < 1e-12 {
            self.zero_rate(t1.max(0.0))
        } else {
            (self.discount(t1) / self.discount(t2)).ln() / (t2 - t1)
        }
    }
}

/// A flat (constant) forward-rate yield curve.
///
/// The simplest possible curve: one continuously-compounded rate for all
/// maturities.
#[derive(Debug, Clone)]
pub struct FlatForward {
    rate: Rate,
}

impl FlatForward {
    /// Create a flat curve from a continuously-compounded rate.
    pub fn new(rate: Rate) -> Self {
        Self { rate }
    }
}

impl YieldTermStructure for FlatForward {
    fn zero_rate(&self, _t: Time) -> Rate {
        self.rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn flat_discount() {
        let curve = FlatForward::new(0.05);
        assert_abs_diff_eq!(curve.discount(0.0), 1.0, epsilon = 1e-15);
        assert_abs_diff_eq!(curve.discount(2.0), (-0.1_f64).exp(), epsilon = 1e-15);
    }

    #[test]
    fn flat_forward_rate() {
        let curve = FlatForward::new(0.03);
        assert_abs_diff_eq!(curve.forward_rate(0.5, 1.5), 0.03, epsilon = 1e-12);
        // Degenerate interval → instantaneous rate
        assert_abs_diff_eq!(curve.forward_rate(1.0, 1.0), 0.03, epsilon = 1e-12);
    }
}
