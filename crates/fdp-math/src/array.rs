//! `Array` — a one-dimensional vector of reals.
//!
//! This is a thin newtype around `nalgebra::DVector<f64>` that exposes the
//! vocabulary the finite-difference layer needs: indexing, element-wise
//! arithmetic, and map/iterate helpers.  Solution arrays during rollback,
//! initial payoff values, and snapshot copies are all `Array`s.

use fdp_core::Real;
use nalgebra::DVector;
use std::ops::{Add, Index, IndexMut, Mul, Sub};

/// A dynamically-sized 1D vector of `Real` values.
#[derive(Debug, Clone, PartialEq)]
pub struct Array(DVector<Real>);

impl Array {
    /// Create a zero-filled array of length `n`.
    pub fn zeros(n: usize) -> Self {
        Self(DVector::zeros(n))
    }

    /// Create an array filled with `value`.
    pub fn from_element(n: usize, value: Real) -> Self {
        Self(DVector::from_element(n, value))
    }

    /// Create an array from a slice.
    pub fn from_slice(data: &[Real]) -> Self {
        Self(DVector::from_column_slice(data))
    }

    /// Create an array from a `Vec`.
    pub fn from_vec(data: Vec<Real>) -> Self {
        Self(DVector::from_vec(data))
    }

    /// Number of elements.
    pub fn size(&self) -> usize {
        self.0.len()
    }

    /// Return `true` if empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Return the elements as a slice.
    pub fn as_slice(&self) -> &[Real] {
        self.0.as_slice()
    }

    /// Return the elements as a mutable slice.
    pub fn as_mut_slice(&mut self) -> &mut [Real] {
        self.0.as_mut_slice()
    }

    /// Apply a function element-wise, returning a new array.
    pub fn map<F: Fn(Real) -> Real>(&self, f: F) -> Self {
        Self(self.0.map(f))
    }

    /// Multiply every element by `scalar`.
    pub fn scale(&self, scalar: Real) -> Self {
        Self(&self.0 * scalar)
    }

    /// Minimum element.
    pub fn min(&self) -> Real {
        self.0.min()
    }

    /// Maximum element.
    pub fn max(&self) -> Real {
        self.0.max()
    }

    /// Iterator over elements.
    pub fn iter(&self) -> impl Iterator<Item = &Real> {
        self.0.iter()
    }
}

// ── From / Into conversions ───────────────────────────────────────────────────

impl From<Vec<Real>> for Array {
    fn from(v: Vec<Real>) -> Self {
        Self::from_vec(v)
    }
}

impl From<&[Real]> for Array {
    fn from(s: &[Real]) -> Self {
        Self::from_slice(s)
    }
}

// ── Index ─────────────────────────────────────────────────────────────────────

impl Index<usize> for Array {
    type Output = Real;
    fn index(&self, i: usize) -> &Real {
        &self.0[i]
    }
}

impl IndexMut<usize> for Array {
    fn index_mut(&mut self, i: usize) -> &mut Real {
        &mut self.0[i]
    }
}

// ── Element-wise arithmetic ───────────────────────────────────────────────────

impl Add for &Array {
    type Output = Array;
    fn add(self, rhs: &Array) -> Array {
        Array(&self.0 + &rhs.0)
    }
}

impl Add for Array {
    type Output = Array;
    fn add(self, rhs: Array) -> Array {
        Array(self.0 + rhs.0)
    }
}

impl Sub for &Array {
    type Output = Array;
    fn sub(self, rhs: &Array) -> Array {
        Array(&self.0 - &rhs.0)
    }
}

impl Sub for Array {
    type Output = Array;
    fn sub(self, rhs: Array) -> Array {
        Array(self.0 - rhs.0)
    }
}

impl Mul<Real> for &Array {
    type Output = Array;
    fn mul(self, rhs: Real) -> Array {
        Array(&self.0 * rhs)
    }
}

impl Mul<Real> for Array {
    type Output = Array;
    fn mul(self, rhs: Real) -> Array {
        Array(self.0 * rhs)
    }
}

// ── Display ───────────────────────────────────────────────────────────────────

impl std::fmt::Display for Array {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{v}")?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zeros() {
        let a = Array::zeros(5);
        assert_eq!(a.size(), 5);
        assert!(a.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn from_vec_and_index() {
        let mut a = Array::from_vec(vec![1.0, 2.0, 3.0]);
        assert_eq!(a.size(), 3);
        assert!((a[1] - 2.0).abs() < 1e-15);
        a[1] = 5.0;
        assert!((a[1] - 5.0).abs() < 1e-15);
    }

    #[test]
    fn elementwise_arithmetic() {
        let a = Array::from_slice(&[1.0, 2.0]);
        let b = Array::from_slice(&[3.0, 4.0]);
        let sum = &a + &b;
        assert!((sum[0] - 4.0).abs() < 1e-15);
        assert!((sum[1] - 6.0).abs() < 1e-15);
        let diff = &b - &a;
        assert!((diff[0] - 2.0).abs() < 1e-15);
        let scaled = &a * 2.0;
        assert!((scaled[1] - 4.0).abs() < 1e-15);
    }

    #[test]
    fn map_and_minmax() {
        let a = Array::from_slice(&[-1.0, 2.0, -3.0]);
        let abs = a.map(|x| x.abs());
        assert!((abs.min() - 1.0).abs() < 1e-15);
        assert!((abs.max() - 3.0).abs() < 1e-15);
    }
}
