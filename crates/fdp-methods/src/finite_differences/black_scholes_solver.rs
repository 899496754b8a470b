//! The Black-Scholes PDE solver: rollback, caching, and Greek queries.

use crate::finite_differences::backward_solver::{FdmBackwardSolver, FdmSolverDesc};
use crate::finite_differences::operator::FdmBlackScholesOp;
use crate::finite_differences::scheme::FdmSchemeDesc;
use crate::finite_differences::step_condition::{
    join_conditions, FdmSnapshotCondition, FdmStepConditionComposite,
};
use fdp_core::patterns::observable::Observer;
use fdp_core::{ensure, errors::Error, errors::Result, Real, Time};
use fdp_math::{Array, Interpolation1D, MonotonicCubicSpline};
use fdp_processes::GeneralizedBlackScholesProcess;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// One day in year fractions; the scale of the theta snapshot offset.
const ONE_DAY: Time = 1.0 / 365.0;

/// The rolled-back solution, memoised between queries.
#[derive(Debug)]
struct CachedSolution {
    values: Array,
    interpolation: MonotonicCubicSpline,
}

/// Prices an instrument by rolling its payoff back through the
/// Black-Scholes PDE, then answers value and Greek queries by monotone
/// cubic interpolation of the solution in log-spot.
///
/// The solution is computed lazily on the first query and cached.  The
/// cache is **not** tied to the process automatically: after bumping market
/// data, call [`invalidate`](FdmBlackScholesSolver::invalidate), or
/// register the solver as an observer of the process so bumps invalidate
/// it for you.
///
/// Delta and gamma come from the chain rule on the log-spot interpolant:
///
/// `∂V/∂S = f′(x)/S`,  `∂²V/∂S² = (f″(x) − f′(x))/S²`  with `x = ln S`.
///
/// Theta is a forward difference against a snapshot of the solution taken
/// just above the valuation date, at
/// `0.99 · min(1/365, first stopping time or maturity)`.
#[derive(Debug)]
pub struct FdmBlackScholesSolver {
    process: Rc<GeneralizedBlackScholesProcess>,
    strike: Real,
    solver_desc: FdmSolverDesc,
    scheme_desc: FdmSchemeDesc,
    use_local_vol: bool,
    illegal_local_vol_overwrite: Option<Real>,

    theta_condition: Rc<FdmSnapshotCondition>,
    conditions: Rc<FdmStepConditionComposite>,
    x: Vec<Real>,
    initial_values: Array,

    cache: RefCell<Option<CachedSolution>>,
    calculations: Cell<usize>,
}

impl FdmBlackScholesSolver {
    /// Create a solver.
    ///
    /// The terminal condition is taken from the descriptor's inner-value
    /// calculator (cell-averaged, so payoff kinks between nodes do not
    /// bias the terminal data), and a theta snapshot is merged into the
    /// step conditions.
    ///
    /// # Errors
    /// Fails if the maturity or step count is not positive, or the grid
    /// locations are not strictly increasing.
    pub fn new(
        process: Rc<GeneralizedBlackScholesProcess>,
        strike: Real,
        solver_desc: FdmSolverDesc,
        scheme_desc: FdmSchemeDesc,
        use_local_vol: bool,
        illegal_local_vol_overwrite: Option<Real>,
    ) -> Result<Self> {
        ensure!(
            solver_desc.maturity > 0.0,
            "maturity must be positive, got {}",
            solver_desc.maturity
        );
        ensure!(solver_desc.time_steps > 0, "need at least one time step");

        let first_stop = solver_desc
            .condition
            .stopping_times()
            .first()
            .copied()
            .unwrap_or(solver_desc.maturity);
        let snapshot_time = 0.99 * ONE_DAY.min(first_stop);
        let theta_condition = Rc::new(FdmSnapshotCondition::new(snapshot_time));
        let conditions = Rc::new(join_conditions(
            theta_condition.clone(),
            &solver_desc.condition,
        ));

        let layout = solver_desc.mesher.layout();
        let mut initial_values = Array::zeros(layout.size());
        let mut x = Vec::with_capacity(layout.dim(0));
        for node in layout.nodes() {
            initial_values[node.index] = solver_desc
                .calculator
                .avg_inner_value(&node, solver_desc.maturity);
            if node.coordinates[1..].iter().all(|&c| c == 0) {
                x.push(solver_desc.mesher.location(&node, 0));
            }
        }
        for i in 1..x.len() {
            ensure!(
                x[i] > x[i - 1],
                "grid locations must be strictly increasing: x[{}]={} >= x[{}]={}",
                i - 1,
                x[i - 1],
                i,
                x[i]
            );
        }

        Ok(Self {
            process,
            strike,
            solver_desc,
            scheme_desc,
            use_local_vol,
            illegal_local_vol_overwrite,
            theta_condition,
            conditions,
            x,
            initial_values,
            cache: RefCell::new(None),
            calculations: Cell::new(0),
        })
    }

    /// Drop the cached solution; the next query recomputes it.
    ///
    /// Call this after bumping the process's market data (or register the
    /// solver as an observer of the process, which calls it on `update`).
    pub fn invalidate(&self) {
        *self.cache.borrow_mut() = None;
    }

    /// How many times the PDE has been solved.  Repeated queries against
    /// unchanged market data keep this at one.
    pub fn calculation_count(&self) -> usize {
        self.calculations.get()
    }

    /// The present value for spot `s`.
    ///
    /// # Errors
    /// Fails if `s` is not positive, `ln s` lies outside the grid, or the
    /// rollback fails.
    pub fn value_at(&self, s: Real) -> Result<Real> {
        self.with_solution(s, |c, x| c.interpolation.value(x))
    }

    /// The spot delta `∂V/∂S` for spot `s`.
    ///
    /// # Errors
    /// Same conditions as [`value_at`](FdmBlackScholesSolver::value_at).
    pub fn delta_at(&self, s: Real) -> Result<Real> {
        self.with_solution(s, |c, x| c.interpolation.derivative(x) / s)
    }

    /// The spot gamma `∂²V/∂S²` for spot `s`.
    ///
    /// # Errors
    /// Same conditions as [`value_at`](FdmBlackScholesSolver::value_at).
    pub fn gamma_at(&self, s: Real) -> Result<Real> {
        self.with_solution(s, |c, x| {
            (c.interpolation.second_derivative(x) - c.interpolation.derivative(x)) / (s * s)
        })
    }

    /// The calendar theta `∂V/∂t` for spot `s`, from a forward difference
    /// against the snapshot taken just above the valuation date.
    ///
    /// # Errors
    /// Fails with [`Error::Domain`] when the first stopping time is zero
    /// (the snapshot would coincide with the valuation date), plus the
    /// conditions of [`value_at`](FdmBlackScholesSolver::value_at).
    pub fn theta_at(&self, s: Real) -> Result<Real> {
        ensure!(s > 0.0, "spot must be positive, got {s}");
        let first_stop = self
            .conditions
            .stopping_times()
            .first()
            .copied()
            .unwrap_or(0.0);
        if first_stop <= 0.0 {
            return Err(Error::Domain(
                "cannot compute theta: a constraint applies at the valuation date".into(),
            ));
        }

        let value = self.value_at(s)?;
        let snapshot = self.theta_condition.values();
        let n = self.x.len();
        if snapshot.size() < n {
            return Err(Error::Numerical(
                "theta snapshot was not captured during rollback".into(),
            ));
        }
        let spline = MonotonicCubicSpline::new(&self.x, &snapshot.as_slice()[..n])?;
        Ok((spline.value(s.ln()) - value) / self.theta_condition.time())
    }

    /// Run a query against the cached solution at log-spot `ln s`.
    fn with_solution<T>(&self, s: Real, f: impl FnOnce(&CachedSolution, Real) -> T) -> Result<T> {
        ensure!(s > 0.0, "spot must be positive, got {s}");
        self.calculate()?;
        let x = s.ln();
        let borrow = self.cache.borrow();
        match borrow.as_ref() {
            Some(c) => {
                ensure!(
                    c.interpolation.is_in_range(x),
                    "log-spot {x} lies outside the grid [{}, {}]",
                    c.interpolation.x_min(),
                    c.interpolation.x_max()
                );
                Ok(f(c, x))
            }
            None => Err(Error::Runtime(
                "solution cache empty after calculation".into(),
            )),
        }
    }

    /// Solve the PDE if no cached solution exists.  All-or-nothing: on
    /// failure the cache stays empty and the next query retries.
    fn calculate(&self) -> Result<()> {
        if self.cache.borrow().is_some() {
            return Ok(());
        }

        let map = Rc::new(FdmBlackScholesOp::new(
            self.solver_desc.mesher.clone(),
            self.process.clone(),
            self.strike,
            self.use_local_vol,
            self.illegal_local_vol_overwrite,
        )?);
        let solver = FdmBackwardSolver::new(
            map,
            self.solver_desc.bc_set.clone(),
            self.conditions.clone(),
            self.scheme_desc,
        );

        let mut rhs = self.initial_values.clone();
        solver.rollback(
            &mut rhs,
            self.solver_desc.maturity,
            0.0,
            self.solver_desc.time_steps,
            self.solver_desc.damping_steps,
        )?;

        let n = self.x.len();
        let values = Array::from_slice(&rhs.as_slice()[..n]);
        let interpolation = MonotonicCubicSpline::new(&self.x, values.as_slice())?;

        *self.cache.borrow_mut() = Some(CachedSolution {
            values,
            interpolation,
        });
        self.calculations.set(self.calculations.get() + 1);
        Ok(())
    }

    /// The rolled-back solution at the grid nodes, in node order.
    ///
    /// # Errors
    /// Fails if the rollback fails.
    pub fn grid_values(&self) -> Result<Array> {
        self.calculate()?;
        let borrow = self.cache.borrow();
        match borrow.as_ref() {
            Some(c) => Ok(c.values.clone()),
            None => Err(Error::Runtime("solution cache empty".into())),
        }
    }
}

impl Observer for FdmBlackScholesSolver {
    fn update(&self) {
        self.invalidate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finite_differences::inner_value::FdmLogInnerValue;
    use crate::finite_differences::mesher::{black_scholes_mesher, Fdm1dMesher, FdmMesher};
    use crate::finite_differences::step_condition::vanilla_composite;
    use approx::assert_abs_diff_eq;
    use fdp_core::patterns::observable::Observable;
    use fdp_instruments::{Exercise, OptionType, Payoff, PlainVanillaPayoff};
    use fdp_termstructures::{BlackConstantVol, FlatForward};
    use std::rc::Weak;

    // Reference values for S = K = 100, r = 5%, q = 0, σ = 20%, T = 1:
    //   value 10.450584, delta 0.636831, gamma 0.018762, theta −6.414096
    const BS_VALUE: Real = 10.450584;
    const BS_DELTA: Real = 0.636831;
    const BS_GAMMA: Real = 0.018762;
    const BS_THETA: Real = -6.414096;

    fn make_process(vol: Real) -> Rc<GeneralizedBlackScholesProcess> {
        Rc::new(GeneralizedBlackScholesProcess::new(
            100.0,
            Rc::new(FlatForward::new(0.05)),
            Rc::new(FlatForward::new(0.0)),
            Rc::new(BlackConstantVol::new(vol)),
        ))
    }

    fn make_solver(
        process: Rc<GeneralizedBlackScholesProcess>,
        option_type: OptionType,
        exercise: Exercise,
        damping_steps: usize,
    ) -> (FdmBlackScholesSolver, Rc<Fdm1dMesher>) {
        let strike = 100.0;
        let maturity = exercise.last_time();
        let mesher = Rc::new(
            black_scholes_mesher(201, &process, maturity, strike, None, None).unwrap(),
        );
        let payoff: Rc<dyn Payoff> = Rc::new(PlainVanillaPayoff::new(option_type, strike));
        let calculator = Rc::new(FdmLogInnerValue::new(
            payoff,
            mesher.clone(),
            0,
            Some(strike),
        ));
        let condition = Rc::new(vanilla_composite(
            mesher.clone(),
            calculator.clone(),
            &exercise,
        ));
        let desc = FdmSolverDesc {
            mesher: mesher.clone(),
            bc_set: Vec::new(),
            condition,
            calculator,
            maturity,
            time_steps: 100,
            damping_steps,
        };
        let solver = FdmBlackScholesSolver::new(
            process,
            strike,
            desc,
            FdmSchemeDesc::douglas(),
            false,
            None,
        )
        .unwrap();
        (solver, mesher)
    }

    #[test]
    fn european_call_matches_closed_form() {
        let (solver, _) = make_solver(
            make_process(0.2),
            OptionType::Call,
            Exercise::european(1.0),
            0,
        );
        assert_abs_diff_eq!(solver.value_at(100.0).unwrap(), BS_VALUE, epsilon = 1e-2);
        assert_abs_diff_eq!(solver.delta_at(100.0).unwrap(), BS_DELTA, epsilon = 5e-3);
        assert_abs_diff_eq!(solver.gamma_at(100.0).unwrap(), BS_GAMMA, epsilon = 5e-4);
    }

    #[test]
    fn value_is_exact_at_grid_nodes() {
        let (solver, mesher) = make_solver(
            make_process(0.2),
            OptionType::Call,
            Exercise::european(1.0),
            0,
        );
        let values = solver.grid_values().unwrap();
        for (i, x) in mesher.locations(0).iter().enumerate() {
            assert_abs_diff_eq!(
                solver.value_at(x.exp()).unwrap(),
                values[i],
                epsilon = 1e-10
            );
        }
    }

    #[test]
    fn repeated_queries_solve_once() {
        let (solver, _) = make_solver(
            make_process(0.2),
            OptionType::Call,
            Exercise::european(1.0),
            0,
        );
        assert_eq!(solver.calculation_count(), 0);
        solver.value_at(100.0).unwrap();
        solver.delta_at(95.0).unwrap();
        solver.gamma_at(105.0).unwrap();
        solver.theta_at(100.0).unwrap();
        assert_eq!(solver.calculation_count(), 1);
    }

    #[test]
    fn invalidation_picks_up_bumped_market_data() {
        let process = make_process(0.2);
        let (solver, _) = make_solver(
            process.clone(),
            OptionType::Call,
            Exercise::european(1.0),
            0,
        );
        let before = solver.value_at(100.0).unwrap();

        process.set_black_volatility(Rc::new(BlackConstantVol::new(0.3)));
        // Stale until told otherwise
        assert_abs_diff_eq!(solver.value_at(100.0).unwrap(), before, epsilon = 1e-15);

        solver.invalidate();
        let after = solver.value_at(100.0).unwrap();
        assert!(after > before + 2.0, "vol bump had no effect: {before} -> {after}");
        assert_eq!(solver.calculation_count(), 2);
    }

    #[test]
    fn registered_solver_is_invalidated_by_process_bumps() {
        let process = make_process(0.2);
        let (solver, _) = make_solver(
            process.clone(),
            OptionType::Call,
            Exercise::european(1.0),
            0,
        );
        let solver = Rc::new(solver);
        process.register_observer(Rc::downgrade(&solver) as Weak<dyn Observer>);

        let before = solver.value_at(100.0).unwrap();
        process.set_black_volatility(Rc::new(BlackConstantVol::new(0.3)));
        let after = solver.value_at(100.0).unwrap();
        assert!(after > before + 2.0);
        assert_eq!(solver.calculation_count(), 2);
    }

    #[test]
    fn delta_is_consistent_with_a_value_difference() {
        let (solver, _) = make_solver(
            make_process(0.2),
            OptionType::Call,
            Exercise::european(1.0),
            0,
        );
        let s = 103.0;
        let h = s * 1e-5;
        let fd = (solver.value_at(s + h).unwrap() - solver.value_at(s - h).unwrap()) / (2.0 * h);
        assert_abs_diff_eq!(solver.delta_at(s).unwrap(), fd, epsilon = 1e-4);
    }

    #[test]
    fn theta_matches_closed_form() {
        let (solver, _) = make_solver(
            make_process(0.2),
            OptionType::Call,
            Exercise::european(1.0),
            0,
        );
        let theta = solver.theta_at(100.0).unwrap();
        assert!(theta < 0.0, "call theta should be negative, got {theta}");
        assert_abs_diff_eq!(theta, BS_THETA, epsilon = 0.1);
    }

    #[test]
    fn theta_is_undefined_with_a_constraint_at_the_valuation_date() {
        let process = make_process(0.2);
        let mesher = Rc::new(
            black_scholes_mesher(51, &process, 1.0, 100.0, None, None).unwrap(),
        );
        let payoff: Rc<dyn Payoff> = Rc::new(PlainVanillaPayoff::new(OptionType::Call, 100.0));
        let calculator = Rc::new(FdmLogInnerValue::new(payoff, mesher.clone(), 0, None));
        // A condition firing at t = 0 pins the snapshot to the valuation
        // date, leaving no interval for the forward difference.
        let condition = Rc::new(FdmStepConditionComposite::new(Vec::new(), vec![0.0]));
        let desc = FdmSolverDesc {
            mesher: mesher.clone(),
            bc_set: Vec::new(),
            condition,
            calculator,
            maturity: 1.0,
            time_steps: 50,
            damping_steps: 0,
        };
        let solver = FdmBlackScholesSolver::new(
            process,
            100.0,
            desc,
            FdmSchemeDesc::douglas(),
            false,
            None,
        )
        .unwrap();

        assert!(solver.value_at(100.0).is_ok());
        assert!(matches!(solver.theta_at(100.0), Err(Error::Domain(_))));
    }

    #[test]
    fn american_put_dominates_european_and_intrinsic() {
        let process = make_process(0.2);
        let (american, _) = make_solver(
            process.clone(),
            OptionType::Put,
            Exercise::american(0.0, 1.0),
            2,
        );
        let (european, _) = make_solver(process, OptionType::Put, Exercise::european(1.0), 2);

        let am = american.value_at(100.0).unwrap();
        let eu = european.value_at(100.0).unwrap();
        assert!(am > eu + 0.2, "early exercise premium missing: {am} vs {eu}");
        // Reference value from lattice methods is about 6.09
        assert!((5.8..6.4).contains(&am), "American put value off: {am}");

        // The floor holds pointwise, also in the money
        let deep = american.value_at(70.0).unwrap();
        assert!(deep >= 30.0 - 1e-6, "below intrinsic: {deep}");
    }

    #[test]
    fn rejects_nonpositive_spot_queries() {
        let (solver, _) = make_solver(
            make_process(0.2),
            OptionType::Call,
            Exercise::european(1.0),
            0,
        );
        assert!(solver.value_at(0.0).is_err());
        assert!(solver.delta_at(-1.0).is_err());
        assert!(solver.gamma_at(0.0).is_err());
        assert!(solver.theta_at(-5.0).is_err());
    }

    #[test]
    fn rejects_spots_outside_the_grid() {
        let (solver, _) = make_solver(
            make_process(0.2),
            OptionType::Call,
            Exercise::european(1.0),
            0,
        );
        // Grid spans ln(100) ± 1, so spots beyond ~e^{±1} of spot are out
        assert!(solver.value_at(1.0e6).is_err());
        assert!(solver.delta_at(1.0).is_err());
    }

    #[test]
    fn rejects_degenerate_setup() {
        let process = make_process(0.2);
        let mesher = Rc::new(
            black_scholes_mesher(11, &process, 1.0, 100.0, None, None).unwrap(),
        );
        let payoff: Rc<dyn Payoff> = Rc::new(PlainVanillaPayoff::new(OptionType::Call, 100.0));
        let calculator = Rc::new(FdmLogInnerValue::new(payoff, mesher.clone(), 0, None));
        let desc = FdmSolverDesc {
            mesher: mesher.clone(),
            bc_set: Vec::new(),
            condition: Rc::new(FdmStepConditionComposite::default()),
            calculator,
            maturity: -1.0,
            time_steps: 50,
            damping_steps: 0,
        };
        assert!(FdmBlackScholesSolver::new(
            process,
            100.0,
            desc,
            FdmSchemeDesc::douglas(),
            false,
            None,
        )
        .is_err());
    }
}
