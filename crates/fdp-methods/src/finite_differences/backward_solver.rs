//! Backward time-stepping: the θ-scheme rollback driver.

use crate::finite_differences::boundary::FdmBoundaryConditionSet;
use crate::finite_differences::inner_value::FdmInnerValueCalculator;
use crate::finite_differences::mesher::FdmMesher;
use crate::finite_differences::operator::FdmLinearOpComposite;
use crate::finite_differences::scheme::FdmSchemeDesc;
use crate::finite_differences::step_condition::{FdmStepConditionComposite, StepCondition};
use fdp_core::{ensure, errors::Result, Real, Size, Time};
use fdp_math::Array;
use std::rc::Rc;

/// Times closer than this count as the same rollback instant.
const TIME_EPS: Real = 1e-10;

/// Everything a solver needs besides the process: grid, conditions,
/// terminal values and step counts.
#[derive(Debug, Clone)]
pub struct FdmSolverDesc {
    /// The spatial grid.
    pub mesher: Rc<dyn FdmMesher>,
    /// Boundary conditions applied around every step.
    pub bc_set: FdmBoundaryConditionSet,
    /// Step conditions and their stopping times.
    pub condition: Rc<FdmStepConditionComposite>,
    /// Payoff values per node (terminal condition, exercise floors).
    pub calculator: Rc<dyn FdmInnerValueCalculator>,
    /// Maturity in year fractions; rollback runs from here to zero.
    pub maturity: Time,
    /// Number of main-scheme time steps.
    pub time_steps: Size,
    /// Number of implicit-Euler damping steps taken before the main scheme.
    pub damping_steps: Size,
}

/// Rolls a solution array backward in time under a spatial operator.
///
/// The rollback interval is split in proportion to the step counts: with
/// `steps` main steps and `damping_steps` damping steps over `Δt`, the
/// damping phase covers the first `Δt · damping_steps / (steps +
/// damping_steps)` using implicit Euler, and the main scheme covers the
/// rest.  Damping suppresses the oscillations Crank-Nicolson exhibits for
/// non-smooth terminal conditions.
///
/// Stopping times that fall inside a step are inserted as intermediate
/// steps, so conditions always fire at their exact times.
#[derive(Debug)]
pub struct FdmBackwardSolver {
    map: Rc<dyn FdmLinearOpComposite>,
    bc_set: FdmBoundaryConditionSet,
    condition: Rc<FdmStepConditionComposite>,
    scheme: FdmSchemeDesc,
}

impl FdmBackwardSolver {
    /// Create a rollback driver.
    pub fn new(
        map: Rc<dyn FdmLinearOpComposite>,
        bc_set: FdmBoundaryConditionSet,
        condition: Rc<FdmStepConditionComposite>,
        scheme: FdmSchemeDesc,
    ) -> Self {
        Self {
            map,
            bc_set,
            condition,
            scheme,
        }
    }

    /// Roll `rhs` back from `from` to `to`.
    ///
    /// # Errors
    /// Fails if the interval is empty or degenerate, `steps` is zero, or
    /// the linear solver fails during a step.
    pub fn rollback(
        &self,
        rhs: &mut Array,
        from: Time,
        to: Time,
        steps: Size,
        damping_steps: Size,
    ) -> Result<()> {
        ensure!(from > to + TIME_EPS, "rollback interval [{to}, {from}] is empty");
        ensure!(steps > 0, "rollback needs at least one time step");

        let delta_t = from - to;
        let all_steps = steps + damping_steps;
        let damping_to = from - delta_t * damping_steps as Real / all_steps as Real;

        if damping_steps > 0 {
            self.roll_phase(rhs, from, damping_to, damping_steps, 1.0)?;
        }
        self.roll_phase(rhs, damping_to, to, steps, self.scheme.theta)
    }

    fn roll_phase(
        &self,
        a: &mut Array,
        from: Time,
        to: Time,
        steps: Size,
        theta: Real,
    ) -> Result<()> {
        if from - to <= TIME_EPS {
            return Ok(());
        }
        let dt = (from - to) / steps as Real;
        let mut now = from;
        for i in 1..=steps {
            let target = if i == steps {
                to
            } else {
                from - i as Real * dt
            };

            // Stopping times strictly inside (target, now) become
            // intermediate steps; ones landing on `target` are caught by
            // the regular condition application below.
            let events: Vec<Time> = self
                .condition
                .stopping_times()
                .iter()
                .copied()
                .filter(|&ts| ts > target + TIME_EPS && ts < now - TIME_EPS)
                .collect();
            for &ts in events.iter().rev() {
                self.single_step(a, ts, now, theta)?;
                self.condition.apply_to(a, ts);
                now = ts;
            }

            self.single_step(a, target, now, theta)?;
            self.condition.apply_to(a, target);
            now = target;
        }
        Ok(())
    }

    /// One θ-scheme step from `t_from` down to `t_to`.
    fn single_step(&self, a: &mut Array, t_to: Time, t_from: Time, theta: Real) -> Result<()> {
        let dt = t_from - t_to;
        if dt <= TIME_EPS {
            return Ok(());
        }
        self.map.set_time(t_to, t_from)?;
        for bc in &self.bc_set {
            bc.set_time(t_to);
        }

        // Explicit leg: (I + (1−θ)·Δt·L)·a
        let mut y = if theta < 1.0 {
            for bc in &self.bc_set {
                bc.apply_before_applying(a);
            }
            let mut y = &*a + &(self.map.apply(a) * ((1.0 - theta) * dt));
            for bc in &self.bc_set {
                bc.apply_after_applying(&mut y);
            }
            y
        } else {
            a.clone()
        };

        // Implicit leg: solve (I − θ·Δt·L)·x = y
        if theta > 0.0 {
            for bc in &self.bc_set {
                bc.apply_before_solving(&mut y);
            }
            y = self.map.solve_splitting(&y, -theta * dt)?;
            for bc in &self.bc_set {
                bc.apply_after_solving(&mut y);
            }
        }

        *a = y;
        Ok(())
    }
}
