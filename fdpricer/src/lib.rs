//! # fdpricer
//!
//! A finite-difference PDE pricing library for derivative contracts.
//!
//! This crate is a **façade** that re-exports the public items of the
//! underlying workspace crates.  Application code should depend on this
//! crate rather than the individual `fdp-*` crates.
//!
//! ## Quick start
//!
//! ```toml
//! [dependencies]
//! fdpricer = "0.1"
//! ```
//!
//! ```rust
//! use std::rc::Rc;
//! use fdpricer::instruments::{Exercise, OptionType, PlainVanillaPayoff,
//!     PricingEngine, VanillaOptionArguments};
//! use fdpricer::pricingengines::FdBlackScholesVanillaEngine;
//! use fdpricer::processes::GeneralizedBlackScholesProcess;
//! use fdpricer::termstructures::{BlackConstantVol, FlatForward};
//!
//! let process = Rc::new(GeneralizedBlackScholesProcess::new(
//!     100.0,
//!     Rc::new(FlatForward::new(0.05)),
//!     Rc::new(FlatForward::new(0.0)),
//!     Rc::new(BlackConstantVol::new(0.20)),
//! ));
//! let engine = FdBlackScholesVanillaEngine::new(process, 100, 201);
//! let args = VanillaOptionArguments {
//!     payoff: Rc::new(PlainVanillaPayoff::new(OptionType::Call, 100.0)),
//!     exercise: Exercise::european(1.0),
//! };
//! let result = engine.calculate(&args).unwrap();
//! assert!((result.npv - 10.45).abs() < 0.1);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Core types, aliases, and error definitions.
pub use fdp_core as core;

/// Mathematical utilities: arrays, interpolation, distributions.
pub use fdp_math as math;

/// Time-parameterised yield and volatility term structures.
pub use fdp_termstructures as termstructures;

/// Stochastic process definitions.
pub use fdp_processes as processes;

/// Payoffs, exercise schedules, and the pricing-engine trait.
pub use fdp_instruments as instruments;

/// Finite-difference methods for PDE-based pricing.
pub use fdp_methods as methods;

/// Vanilla option pricing engines.
pub use fdp_pricingengines as pricingengines;

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use fdp_instruments::{
        Exercise, OptionType, PlainVanillaPayoff, PricingEngine, VanillaOptionArguments,
    };
    use fdp_pricingengines::{AnalyticEuropeanEngine, FdBlackScholesVanillaEngine};
    use fdp_processes::GeneralizedBlackScholesProcess;
    use fdp_termstructures::{BlackConstantVol, FlatForward};
    use std::rc::Rc;

    #[test]
    fn facade_prices_a_call_both_ways() {
        let process = Rc::new(GeneralizedBlackScholesProcess::new(
            100.0,
            Rc::new(FlatForward::new(0.05)),
            Rc::new(FlatForward::new(0.0)),
            Rc::new(BlackConstantVol::new(0.20)),
        ));
        let args = VanillaOptionArguments {
            payoff: Rc::new(PlainVanillaPayoff::new(OptionType::Call, 100.0)),
            exercise: Exercise::european(1.0),
        };

        let analytic = AnalyticEuropeanEngine::new(process.clone())
            .calculate(&args)
            .unwrap();
        let fd = FdBlackScholesVanillaEngine::new(process, 100, 201)
            .calculate(&args)
            .unwrap();
        assert_abs_diff_eq!(analytic.npv, fd.npv, epsilon = 1e-2);
    }
}
