//! Inner-value calculators: payoff values attached to grid nodes.

use crate::finite_differences::layout::FdmLinearOpNode;
use crate::finite_differences::mesher::FdmMesher;
use fdp_core::{Real, Time};
use fdp_instruments::Payoff;
use std::rc::Rc;

/// Values an instrument payoff at grid nodes.
pub trait FdmInnerValueCalculator: std::fmt::Debug {
    /// Payoff value at the node location.
    fn inner_value(&self, node: &FdmLinearOpNode, t: Time) -> Real;

    /// Payoff value averaged over the node's grid cell.
    ///
    /// Averaging softens the payoff kink so the discretisation error of the
    /// terminal condition does not depend on where the kink falls between
    /// nodes.
    fn avg_inner_value(&self, node: &FdmLinearOpNode, t: Time) -> Real;
}

/// Inner values for a payoff on a log-spot axis.
///
/// `inner_value` evaluates `payoff(exp(x))`.  `avg_inner_value` integrates
/// the payoff over the cell `[x − dminus/2, x + dplus/2]` with Simpson's
/// rule, splitting the integral at the payoff kink when one is given so each
/// piece is smooth.
pub struct FdmLogInnerValue {
    payoff: Rc<dyn Payoff>,
    mesher: Rc<dyn FdmMesher>,
    direction: usize,
    /// Underlying level at which the payoff has a kink (e.g. the strike).
    critical_price: Option<Real>,
}

impl std::fmt::Debug for FdmLogInnerValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FdmLogInnerValue")
            .field("payoff", &self.payoff.name())
            .field("direction", &self.direction)
            .field("critical_price", &self.critical_price)
            .finish()
    }
}

impl FdmLogInnerValue {
    /// Create a log-spot inner-value calculator.
    pub fn new(
        payoff: Rc<dyn Payoff>,
        mesher: Rc<dyn FdmMesher>,
        direction: usize,
        critical_price: Option<Real>,
    ) -> Self {
        Self {
            payoff,
            mesher,
            direction,
            critical_price,
        }
    }

    fn payoff_at_log(&self, x: Real) -> Real {
        self.payoff.value(x.exp())
    }
}

/// Composite Simpson's rule with `n` (even) subintervals.
fn simpson(f: impl Fn(Real) -> Real, a: Real, b: Real, n: usize) -> Real {
    debug_assert!(n >= 2 && n % 2 == 0);
    let h = (b - a) / n as Real;
    let mut sum = f(a) + f(b);
    for i in 1..n {
        let w = if i % 2 == 1 { 4.0 } else { 2.0 };
        sum += w * f(a + i as Real * h);
    }
    sum * h / 3.0
}

impl FdmInnerValueCalculator for FdmLogInnerValue {
    fn inner_value(&self, node: &FdmLinearOpNode, _t: Time) -> Real {
        self.payoff_at_log(self.mesher.location(node, self.direction))
    }

    fn avg_inner_value(&self, node: &FdmLinearOpNode, t: Time) -> Real {
        let dminus = self.mesher.dminus(node, self.direction);
        let dplus = self.mesher.dplus(node, self.direction);
        let (dminus, dplus) = match (dminus, dplus) {
            (Some(m), Some(p)) => (m, p),
            // Edge nodes have no full cell; fall back to the point value.
            _ => return self.inner_value(node, t),
        };

        let x = self.mesher.location(node, self.direction);
        let a = x - 0.5 * dminus;
        let b = x + 0.5 * dplus;

        let f = |x: Real| self.payoff_at_log(x);
        let kink = self.critical_price.map(Real::ln);
        let integral = match kink {
            Some(k) if k > a && k < b => simpson(&f, a, k, 8) + simpson(&f, k, b, 8),
            _ => simpson(&f, a, b, 8),
        };
        integral / (b - a)
    }
}
