//! Step conditions applied to the solution array during rollback.

use crate::finite_differences::inner_value::FdmInnerValueCalculator;
use crate::finite_differences::mesher::FdmMesher;
use fdp_core::{Real, Time};
use fdp_instruments::{Exercise, ExerciseType};
use fdp_math::comparison::{close, EPSILON};
use fdp_math::Array;
use std::cell::RefCell;
use std::rc::Rc;

/// A constraint applied to the solution array at chosen times.
pub trait StepCondition: std::fmt::Debug {
    /// Apply the condition to `a` at time `t`.
    fn apply_to(&self, a: &mut Array, t: Time);
}

/// Captures a copy of the solution array when rollback reaches a given time.
///
/// The snapshot does not modify the array, so when several conditions fire
/// at the same time the snapshot must run before any of them (see
/// [`join_conditions`]): it records the solution as rolled back to its time,
/// untouched by coincident constraints.
#[derive(Debug)]
pub struct FdmSnapshotCondition {
    time: Time,
    values: RefCell<Array>,
}

impl FdmSnapshotCondition {
    /// Create a snapshot that fires at `time`.
    pub fn new(time: Time) -> Self {
        Self {
            time,
            values: RefCell::new(Array::zeros(0)),
        }
    }

    /// The time the snapshot fires at.
    pub fn time(&self) -> Time {
        self.time
    }

    /// The captured solution array (empty until rollback reaches the
    /// snapshot time).
    pub fn values(&self) -> Array {
        self.values.borrow().clone()
    }
}

impl StepCondition for FdmSnapshotCondition {
    fn apply_to(&self, a: &mut Array, t: Time) {
        if close(t, self.time, EPSILON) {
            *self.values.borrow_mut() = a.clone();
        }
    }
}

/// Early-exercise constraint: floors the solution at the exercise value.
#[derive(Debug)]
pub struct FdmAmericanStepCondition {
    mesher: Rc<dyn FdmMesher>,
    calculator: Rc<dyn FdmInnerValueCalculator>,
}

impl FdmAmericanStepCondition {
    /// Create an American exercise condition.
    pub fn new(mesher: Rc<dyn FdmMesher>, calculator: Rc<dyn FdmInnerValueCalculator>) -> Self {
        Self { mesher, calculator }
    }
}

impl StepCondition for FdmAmericanStepCondition {
    fn apply_to(&self, a: &mut Array, t: Time) {
        let layout = self.mesher.layout();
        for node in layout.nodes() {
            let intrinsic = self.calculator.inner_value(&node, t);
            if a[node.index] < intrinsic {
                a[node.index] = intrinsic;
            }
        }
    }
}

/// An ordered collection of step conditions plus the times the rollback
/// must land on exactly.
///
/// Conditions with no stopping times of their own (such as the American
/// constraint) are applied at every step the rollback takes.
#[derive(Debug, Default)]
pub struct FdmStepConditionComposite {
    stopping_times: Vec<Time>,
    conditions: Vec<Rc<dyn StepCondition>>,
}

impl FdmStepConditionComposite {
    /// Create a composite from conditions and stopping times.
    ///
    /// The stopping times are sorted and de-duplicated (times closer than
    /// the comparison tolerance count as equal).
    pub fn new(conditions: Vec<Rc<dyn StepCondition>>, stopping_times: Vec<Time>) -> Self {
        let mut times = stopping_times;
        times.sort_by(|a, b| a.partial_cmp(b).expect("stopping times are not NaN"));
        times.dedup_by(|a, b| close(*a, *b, EPSILON));
        Self {
            stopping_times: times,
            conditions,
        }
    }

    /// The sorted, de-duplicated stopping times.
    pub fn stopping_times(&self) -> &[Time] {
        &self.stopping_times
    }

    /// The conditions, in application order.
    pub fn conditions(&self) -> &[Rc<dyn StepCondition>] {
        &self.conditions
    }
}

impl StepCondition for FdmStepConditionComposite {
    fn apply_to(&self, a: &mut Array, t: Time) {
        for condition in &self.conditions {
            condition.apply_to(a, t);
        }
    }
}

/// Merge a snapshot condition into an existing composite.
///
/// The snapshot is placed *first* so that at a coincident time it records
/// the solution before any mutating condition runs; its time is merged into
/// the stopping times so the rollback lands on it exactly.
pub fn join_conditions(
    snapshot: Rc<FdmSnapshotCondition>,
    other: &FdmStepConditionComposite,
) -> FdmStepConditionComposite {
    let mut times = other.stopping_times.clone();
    times.push(snapshot.time());
    let mut conditions: Vec<Rc<dyn StepCondition>> = vec![snapshot];
    conditions.extend(other.conditions.iter().cloned());
    FdmStepConditionComposite::new(conditions, times)
}

/// Build the step conditions for a vanilla option.
///
/// European exercise needs no condition; American exercise adds the
/// intrinsic-value floor, applied at every rollback step.
pub fn vanilla_composite(
    mesher: Rc<dyn FdmMesher>,
    calculator: Rc<dyn FdmInnerValueCalculator>,
    exercise: &Exercise,
) -> FdmStepConditionComposite {
    let mut conditions: Vec<Rc<dyn StepCondition>> = Vec::new();
    if exercise.exercise_type == ExerciseType::American {
        conditions.push(Rc::new(FdmAmericanStepCondition::new(mesher, calculator)));
    }
    FdmStepConditionComposite::new(conditions, Vec::new())
}

/// Floors every entry of the solution at a constant.
#[cfg(test)]
#[derive(Debug)]
pub struct FloorCondition(pub Real);

#[cfg(test)]
impl StepCondition for FloorCondition {
    fn apply_to(&self, a: &mut Array, _t: Time) {
        for i in 0..a.size() {
            if a[i] < self.0 {
                a[i] = self.0;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finite_differences::inner_value::FdmLogInnerValue;
    use crate::finite_differences::mesher::Fdm1dMesher;
    use approx::assert_abs_diff_eq;
    use fdp_instruments::{OptionType, Payoff, PlainVanillaPayoff};

    #[test]
    fn snapshot_fires_only_at_its_time() {
        let snap = FdmSnapshotCondition::new(0.5);
        let mut a = Array::from_slice(&[1.0, 2.0]);
        snap.apply_to(&mut a, 0.7);
        assert!(snap.values().is_empty());
        snap.apply_to(&mut a, 0.5);
        assert_eq!(snap.values().size(), 2);
        assert_abs_diff_eq!(snap.values()[1], 2.0, epsilon = 1e-15);
        // A snapshot reads, never writes
        assert_abs_diff_eq!(a[0], 1.0, epsilon = 1e-15);
    }

    #[test]
    fn american_condition_floors_at_intrinsic() {
        let k: Real = 100.0;
        let xs = vec![k.ln() - 0.2, k.ln() - 0.1, k.ln(), k.ln() + 0.1, k.ln() + 0.2];
        let mesher = Rc::new(Fdm1dMesher::from_locations(xs).unwrap());
        let payoff: Rc<dyn Payoff> = Rc::new(PlainVanillaPayoff::new(OptionType::Put, k));
        let calc = Rc::new(FdmLogInnerValue::new(payoff, mesher.clone(), 0, Some(k)));
        let cond = FdmAmericanStepCondition::new(mesher.clone(), calc.clone());

        let mut a = Array::zeros(5);
        cond.apply_to(&mut a, 0.5);
        for node in mesher.layout().nodes() {
            let intrinsic = calc.inner_value(&node, 0.5);
            assert!(a[node.index] >= intrinsic - 1e-15);
            assert_abs_diff_eq!(a[node.index], intrinsic, epsilon = 1e-12);
        }
    }

    #[test]
    fn composite_sorts_and_dedups_stopping_times() {
        let c = FdmStepConditionComposite::new(vec![], vec![0.5, 0.1, 0.5 + 1e-12, 0.3]);
        assert_eq!(c.stopping_times().len(), 3);
        assert_abs_diff_eq!(c.stopping_times()[0], 0.1, epsilon = 1e-15);
        assert_abs_diff_eq!(c.stopping_times()[2], 0.5, epsilon = 1e-15);
    }

    #[test]
    fn join_puts_snapshot_first_and_merges_times() {
        let floor: Rc<dyn StepCondition> = Rc::new(FloorCondition(3.0));
        let base = FdmStepConditionComposite::new(vec![floor], vec![0.25]);
        let snap = Rc::new(FdmSnapshotCondition::new(0.25));
        let joined = join_conditions(snap.clone(), &base);

        assert_eq!(joined.stopping_times().len(), 1);
        assert_eq!(joined.conditions().len(), 2);

        // At the coincident time the snapshot sees the pre-floor solution.
        let mut a = Array::from_slice(&[1.0, 5.0]);
        joined.apply_to(&mut a, 0.25);
        assert_abs_diff_eq!(snap.values()[0], 1.0, epsilon = 1e-15);
        assert_abs_diff_eq!(a[0], 3.0, epsilon = 1e-15);
    }

    #[test]
    fn vanilla_composite_is_empty_for_european() {
        let mesher = Rc::new(Fdm1dMesher::from_locations(vec![0.0, 1.0]).unwrap());
        let payoff: Rc<dyn Payoff> = Rc::new(PlainVanillaPayoff::new(OptionType::Call, 1.0));
        let calc = Rc::new(FdmLogInnerValue::new(payoff, mesher.clone(), 0, None));

        let eu = vanilla_composite(mesher.clone(), calc.clone(), &Exercise::european(1.0));
        assert!(eu.conditions().is_empty());
        assert!(eu.stopping_times().is_empty());

        let am = vanilla_composite(mesher, calc, &Exercise::american(0.0, 1.0));
        assert_eq!(am.conditions().len(), 1);
    }
}
