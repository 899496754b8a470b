//! Finite difference methods for PDE-based option pricing.
//!
//! The pricing problem is posed backward in time: the payoff provides the
//! terminal condition at maturity, and the solution array is rolled back to
//! the valuation date under the discretised generator of the underlying
//! process.  The pieces compose as follows:
//!
//! * [`FdmLinearOpLayout`] — enumerates grid nodes and flattens them to
//!   linear offsets
//! * [`FdmMesher`] / [`Fdm1dMesher`] — node coordinates and spacings;
//!   [`black_scholes_mesher`] builds a log-spot grid for a given process
//! * [`FdmInnerValueCalculator`] / [`FdmLogInnerValue`] — payoff values per
//!   node, optionally cell-averaged to soften kinks
//! * [`FdmBoundaryCondition`] — hooks applied around each time step
//! * [`StepCondition`] — constraints applied at chosen times during
//!   rollback (early exercise, snapshots)
//! * [`TridiagonalOperator`] / [`FdmBlackScholesOp`] — the spatial operator
//! * [`FdmSchemeDesc`] / [`FdmBackwardSolver`] — θ-scheme time stepping
//!   with an implicit damping phase
//! * [`FdmBlackScholesSolver`] — the user-facing solver answering
//!   value/delta/gamma/theta queries via spline interpolation

mod backward_solver;
mod black_scholes_solver;
mod boundary;
mod inner_value;
mod layout;
mod mesher;
mod operator;
mod scheme;
mod step_condition;
mod tridiagonal;

pub use backward_solver::{FdmBackwardSolver, FdmSolverDesc};
pub use black_scholes_solver::FdmBlackScholesSolver;
pub use boundary::{BoundarySide, FdmBoundaryCondition, FdmBoundaryConditionSet, FdmDirichletBoundary};
pub use inner_value::{FdmInnerValueCalculator, FdmLogInnerValue};
pub use layout::{FdmLinearOpLayout, FdmLinearOpNode};
pub use mesher::{black_scholes_mesher, Fdm1dMesher, FdmMesher};
pub use operator::{FdmBlackScholesOp, FdmLinearOpComposite};
pub use scheme::FdmSchemeDesc;
pub use step_condition::{
    join_conditions, vanilla_composite, FdmAmericanStepCondition, FdmSnapshotCondition,
    FdmStepConditionComposite, StepCondition,
};
pub use tridiagonal::TridiagonalOperator;
