//! # fdp-termstructures
//!
//! Yield and volatility term structures, parameterised directly by time in
//! year fractions.  The finite-difference layer only ever asks "what is the
//! rate / variance between `t1` and `t2`", so everything here takes `Time`
//! rather than calendar dates.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod black_vol;
pub mod local_vol;
pub mod yield_curve;

pub use black_vol::{BlackConstantVol, BlackVolTermStructure};
pub use local_vol::{LocalConstantVol, LocalVolTermStructure};
pub use yield_curve::{FlatForward, YieldTermStructure};
