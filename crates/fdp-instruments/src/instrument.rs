//! Pricing-engine trait and results container.

use fdp_core::{errors::Result, Real};
use std::collections::HashMap;

/// Results of pricing an instrument.
///
/// Contains the NPV and optionally additional named results
/// (e.g. "delta", "gamma", "theta").
#[derive(Debug, Clone, Default)]
pub struct PricingResults {
    /// Net present value.
    pub npv: Real,
    /// Additional named results.
    pub additional_results: HashMap<String, Real>,
}

impl PricingResults {
    /// Create pricing results with just an NPV.
    pub fn from_npv(npv: Real) -> Self {
        Self {
            npv,
            additional_results: HashMap::new(),
        }
    }

    /// Add a named result.
    pub fn with_result(mut self, key: impl Into<String>, value: Real) -> Self {
        self.additional_results.insert(key.into(), value);
        self
    }
}

/// Base trait for all pricing engines.
///
/// A pricing engine computes `PricingResults` for a specific instrument
/// type, described by its arguments.
pub trait PricingEngine<Args>: std::fmt::Debug {
    /// Price the instrument described by `args`.
    fn calculate(&self, args: &Args) -> Result<PricingResults>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pricing_results_builder() {
        let r = PricingResults::from_npv(42.0)
            .with_result("delta", 0.55)
            .with_result("gamma", 0.02);
        assert!((r.npv - 42.0).abs() < 1e-15);
        assert!((r.additional_results["delta"] - 0.55).abs() < 1e-15);
        assert!((r.additional_results["gamma"] - 0.02).abs() < 1e-15);
    }
}
