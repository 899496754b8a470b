//! Boundary conditions applied around each rollback step.

use crate::finite_differences::layout::FdmLinearOpLayout;
use fdp_core::{ensure, errors::Result, Real, Time};
use fdp_math::Array;
use std::rc::Rc;

/// A boundary condition hooked into the four phases of a θ-scheme step.
///
/// The explicit leg calls `apply_before_applying` / `apply_after_applying`
/// around the operator application; the implicit leg calls
/// `apply_before_solving` / `apply_after_solving` around the linear solve.
pub trait FdmBoundaryCondition: std::fmt::Debug {
    /// Inform the condition of the time the next step lands on.
    fn set_time(&self, t: Time);

    /// Called before the operator is applied (explicit leg).
    fn apply_before_applying(&self, a: &mut Array);

    /// Called after the operator is applied (explicit leg).
    fn apply_after_applying(&self, a: &mut Array);

    /// Called before the implicit system is solved.
    fn apply_before_solving(&self, a: &mut Array);

    /// Called after the implicit system is solved.
    fn apply_after_solving(&self, a: &mut Array);
}

/// The set of boundary conditions attached to a solver.
pub type FdmBoundaryConditionSet = Vec<Rc<dyn FdmBoundaryCondition>>;

/// Which edge of the grid a boundary condition pins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundarySide {
    /// The first node along the axis.
    Lower,
    /// The last node along the axis.
    Upper,
}

/// Pins the solution to a fixed value on one grid edge.
#[derive(Debug, Clone)]
pub struct FdmDirichletBoundary {
    value: Real,
    index: usize,
}

impl FdmDirichletBoundary {
    /// Create a Dirichlet condition on the given edge of axis 0.
    ///
    /// # Errors
    /// Fails if the layout is not one-dimensional.
    pub fn new(layout: &FdmLinearOpLayout, value: Real, side: BoundarySide) -> Result<Self> {
        ensure!(
            layout.dimensions() == 1,
            "Dirichlet boundary supports one-dimensional layouts, got {} axes",
            layout.dimensions()
        );
        let index = match side {
            BoundarySide::Lower => 0,
            BoundarySide::Upper => layout.dim(0) - 1,
        };
        Ok(Self { value, index })
    }
}

impl FdmBoundaryCondition for FdmDirichletBoundary {
    fn set_time(&self, _t: Time) {}

    fn apply_before_applying(&self, _a: &mut Array) {}

    fn apply_after_applying(&self, a: &mut Array) {
        a[self.index] = self.value;
    }

    fn apply_before_solving(&self, _a: &mut Array) {}

    fn apply_after_solving(&self, a: &mut Array) {
        a[self.index] = self.value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn pins_the_chosen_edge() {
        let layout = FdmLinearOpLayout::new(vec![4]).unwrap();
        let lower = FdmDirichletBoundary::new(&layout, 0.0, BoundarySide::Lower).unwrap();
        let upper = FdmDirichletBoundary::new(&layout, 9.0, BoundarySide::Upper).unwrap();

        let mut a = Array::from_slice(&[1.0, 2.0, 3.0, 4.0]);
        lower.apply_after_solving(&mut a);
        upper.apply_after_applying(&mut a);
        assert_abs_diff_eq!(a[0], 0.0, epsilon = 1e-15);
        assert_abs_diff_eq!(a[1], 2.0, epsilon = 1e-15);
        assert_abs_diff_eq!(a[3], 9.0, epsilon = 1e-15);
    }

    #[test]
    fn before_hooks_leave_array_untouched() {
        let layout = FdmLinearOpLayout::new(vec![3]).unwrap();
        let bc = FdmDirichletBoundary::new(&layout, 5.0, BoundarySide::Lower).unwrap();
        let mut a = Array::from_slice(&[1.0, 2.0, 3.0]);
        bc.apply_before_applying(&mut a);
        bc.apply_before_solving(&mut a);
        assert_abs_diff_eq!(a[0], 1.0, epsilon = 1e-15);
    }
}
