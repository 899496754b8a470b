//! Tridiagonal operator with a Thomas-algorithm solver.

use fdp_core::{ensure, errors::Error, errors::Result, Real, Size};
use fdp_math::Array;

/// A tridiagonal matrix stored as three bands.
///
/// Row `i` reads `lower[i-1] * x[i-1] + diag[i] * x[i] + upper[i] * x[i+1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct TridiagonalOperator {
    lower: Vec<Real>,
    diag: Vec<Real>,
    upper: Vec<Real>,
}

impl TridiagonalOperator {
    /// Create a zero operator of dimension `n`.
    ///
    /// # Errors
    /// Fails if `n < 2`.
    pub fn new(n: Size) -> Result<Self> {
        ensure!(n >= 2, "tridiagonal operator needs dimension >= 2, got {n}");
        Ok(Self {
            lower: vec![0.0; n - 1],
            diag: vec![0.0; n],
            upper: vec![0.0; n - 1],
        })
    }

    /// Matrix dimension.
    pub fn size(&self) -> Size {
        self.diag.len()
    }

    /// Set the first row: `diag * x[0] + upper * x[1]`.
    pub fn set_first_row(&mut self, diag: Real, upper: Real) {
        self.diag[0] = diag;
        self.upper[0] = upper;
    }

    /// Set an interior row `i` (`0 < i < n-1`).
    pub fn set_mid_row(&mut self, i: Size, lower: Real, diag: Real, upper: Real) {
        debug_assert!(i > 0 && i < self.size() - 1);
        self.lower[i - 1] = lower;
        self.diag[i] = diag;
        self.upper[i] = upper;
    }

    /// Set the last row: `lower * x[n-2] + diag * x[n-1]`.
    pub fn set_last_row(&mut self, lower: Real, diag: Real) {
        let n = self.size();
        self.lower[n - 2] = lower;
        self.diag[n - 1] = diag;
    }

    /// Multiply every coefficient by `s`.
    pub fn scale(&mut self, s: Real) {
        for v in self
            .lower
            .iter_mut()
            .chain(self.diag.iter_mut())
            .chain(self.upper.iter_mut())
        {
            *v *= s;
        }
    }

    /// Add `s` to every diagonal entry (i.e. add `s·I`).
    pub fn add_identity(&mut self, s: Real) {
        for v in self.diag.iter_mut() {
            *v += s;
        }
    }

    /// Matrix-vector product.
    ///
    /// Panics in debug builds if the dimensions disagree.
    pub fn apply(&self, x: &Array) -> Array {
        let n = self.size();
        debug_assert_eq!(x.size(), n);
        let mut y = Array::zeros(n);
        y[0] = self.diag[0] * x[0] + self.upper[0] * x[1];
        for i in 1..n - 1 {
            y[i] = self.lower[i - 1] * x[i - 1] + self.diag[i] * x[i] + self.upper[i] * x[i + 1];
        }
        y[n - 1] = self.lower[n - 2] * x[n - 2] + self.diag[n - 1] * x[n - 1];
        y
    }

    /// Solve `A·x = rhs` with the Thomas algorithm.
    ///
    /// # Errors
    /// Fails with [`Error::Numerical`] if a pivot vanishes; the operators
    /// produced by the θ-scheme are diagonally dominant, so this indicates
    /// corrupted inputs rather than an unlucky matrix.
    pub fn solve(&self, rhs: &Array) -> Result<Array> {
        let n = self.size();
        ensure!(
            rhs.size() == n,
            "rhs size ({}) does not match operator dimension ({n})",
            rhs.size()
        );

        let mut c_prime = vec![0.0; n - 1];
        let mut d_prime = vec![0.0; n];

        let mut pivot = self.diag[0];
        if pivot.abs() < 1e-300 {
            return Err(Error::Numerical("vanishing pivot in row 0".into()));
        }
        c_prime[0] = self.upper[0] / pivot;
        d_prime[0] = rhs[0] / pivot;

        for i in 1..n {
            pivot = self.diag[i] - self.lower[i - 1] * c_prime[i - 1];
            if pivot.abs() < 1e-300 {
                return Err(Error::Numerical(format!("vanishing pivot in row {i}")));
            }
            if i < n - 1 {
                c_prime[i] = self.upper[i] / pivot;
            }
            d_prime[i] = (rhs[i] - self.lower[i - 1] * d_prime[i - 1]) / pivot;
        }

        let mut x = Array::zeros(n);
        x[n - 1] = d_prime[n - 1];
        for i in (0..n - 1).rev() {
            x[i] = d_prime[i] - c_prime[i] * x[i + 1];
        }
        Ok(x)
    }
}
