//! Option exercise types.
//!
//! An `Exercise` defines *when* an option can be exercised, in year
//! fractions from the valuation date.

use fdp_core::Time;

/// Type of exercise right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExerciseType {
    /// Can only be exercised at expiry.
    European,
    /// Can be exercised at any time up to expiry.
    American,
}

/// Exercise specification for an option.
#[derive(Debug, Clone)]
pub struct Exercise {
    /// The exercise type.
    pub exercise_type: ExerciseType,
    /// The exercise time(s).
    ///
    /// - European: single time (the expiry).
    /// - American: two times (earliest, latest).
    times: Vec<Time>,
}

impl Exercise {
    /// Create a European exercise (single expiry time).
    pub fn european(expiry: Time) -> Self {
        Self {
            exercise_type: ExerciseType::European,
            times: vec![expiry],
        }
    }

    /// Create an American exercise (earliest to latest).
    pub fn american(earliest: Time, latest: Time) -> Self {
        Self {
            exercise_type: ExerciseType::American,
            times: vec![earliest, latest],
        }
    }

    /// The last possible exercise time.
    pub fn last_time(&self) -> Time {
        *self.times.last().expect("exercise has at least one time")
    }

    /// All exercise times.
    pub fn times(&self) -> &[Time] {
        &self.times
    }
}
