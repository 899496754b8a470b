//! # fdp-processes
//!
//! Stochastic process definitions.  The pricing layer consumes a process
//! through two channels: its current market parameters (spot, rates,
//! volatility surfaces) and its change notifications — bumping any
//! parameter notifies registered observers so cached solutions can be
//! invalidated.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod black_scholes;
pub mod stochastic_process;

pub use black_scholes::GeneralizedBlackScholesProcess;
pub use stochastic_process::StochasticProcess1D;
