//! # fdp-pricingengines
//!
//! Pricing engines for vanilla options: the closed-form
//! Black-Scholes-Merton engine for European exercise, and the
//! finite-difference engine that handles both European and American
//! exercise through the PDE solver in `fdp-methods`.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod analytic_european;
pub mod fd_vanilla;

pub use analytic_european::{black_scholes_merton, AnalyticEuropeanEngine};
pub use fd_vanilla::FdBlackScholesVanillaEngine;
