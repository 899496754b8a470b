//! # fdp-instruments
//!
//! The instrument-facing vocabulary: option payoffs, exercise schedules
//! (in year fractions), and the pricing-engine trait with its results map.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod exercise;
pub mod instrument;
pub mod option;
pub mod payoff;

pub use exercise::{Exercise, ExerciseType};
pub use instrument::{PricingEngine, PricingResults};
pub use option::VanillaOptionArguments;
pub use payoff::{OptionType, Payoff, PlainVanillaPayoff, StrikedPayoff};
