//! Error types for fdpricer-rs.
//!
//! A single `thiserror`-derived enum covers the whole workspace: structural
//! input problems (`Precondition`, `InvalidArgument`), queries that are
//! undefined for the current state (`Domain`), and failures of the numerical
//! machinery itself (`Numerical`).  The `ensure!` and `fail!` macros are the
//! short-hand used at validation sites.

use thiserror::Error;

/// The top-level error type used throughout fdpricer-rs.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// General runtime error.
    #[error("{0}")]
    Runtime(String),

    /// Precondition violated.
    #[error("precondition not satisfied: {0}")]
    Precondition(String),

    /// Postcondition violated.
    #[error("postcondition not satisfied: {0}")]
    Postcondition(String),

    /// A query that is well-formed but undefined for the current state
    /// (e.g. theta when the nearest constraint time is zero).
    #[error("domain error: {0}")]
    Domain(String),

    /// The numerical machinery could not produce a solution
    /// (e.g. a singular linear system during rollback).
    #[error("numerical failure: {0}")]
    Numerical(String),

    /// Index out of range.
    #[error("index ({index}) out of range [0, {size})")]
    IndexOutOfRange {
        /// The index that was out of range.
        index: usize,
        /// The size of the container.
        size: usize,
    },

    /// Invalid argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Shorthand `Result` type used throughout fdpricer-rs.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Validate a precondition.
///
/// Returns `Err(Error::Precondition(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use fdp_core::{ensure, errors::Error};
/// fn positive(x: f64) -> fdp_core::errors::Result<f64> {
///     ensure!(x > 0.0, "x must be positive, got {x}");
///     Ok(x)
/// }
/// assert!(positive(1.0).is_ok());
/// assert!(positive(-1.0).is_err());
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::Precondition(
                format!($($msg)*)
            ));
        }
    };
}

/// Validate a postcondition.
///
/// Returns `Err(Error::Postcondition(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use fdp_core::{ensure_post, errors::Error};
/// fn compute(x: f64) -> fdp_core::errors::Result<f64> {
///     let result = x * 2.0;
///     ensure_post!(result > 0.0, "result must be positive, got {result}");
///     Ok(result)
/// }
/// assert!(compute(1.0).is_ok());
/// assert!(compute(-1.0).is_err());
/// ```
#[macro_export]
macro_rules! ensure_post {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::Postcondition(
                format!($($msg)*)
            ));
        }
    };
}

/// Fail unconditionally with a runtime error.
///
/// Returns `Err(Error::Runtime(...))` immediately.
///
/// # Example
/// ```
/// use fdp_core::{fail, errors::Error};
/// fn always_err() -> fdp_core::errors::Result<()> {
///     fail!("something went wrong");
/// }
/// assert!(always_err().is_err());
/// ```
#[macro_export]
macro_rules! fail {
    ($($msg:tt)*) => {
        return Err($crate::errors::Error::Runtime(format!($($msg)*)))
    };
}
