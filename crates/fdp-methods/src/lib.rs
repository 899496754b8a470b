//! # fdp-methods
//!
//! Numerical methods for derivative pricing.  The single family implemented
//! here is the finite-difference machinery for backward PDE solving: grid
//! layout and meshers, inner-value calculators, boundary and step
//! conditions, spatial operators, time-stepping schemes, and the
//! Black-Scholes solver that ties them together.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Finite difference methods for PDE-based option pricing.
pub mod finite_differences;

pub use finite_differences::{
    black_scholes_mesher, join_conditions, vanilla_composite, Fdm1dMesher,
    FdmAmericanStepCondition, FdmBackwardSolver, FdmBlackScholesOp, FdmBlackScholesSolver,
    FdmBoundaryCondition, FdmBoundaryConditionSet, FdmDirichletBoundary, FdmInnerValueCalculator,
    FdmLinearOpComposite, FdmLinearOpLayout, FdmLinearOpNode, FdmLogInnerValue, FdmMesher,
    FdmSchemeDesc, FdmSnapshotCondition, FdmSolverDesc, FdmStepConditionComposite, StepCondition,
    TridiagonalOperator,
};
