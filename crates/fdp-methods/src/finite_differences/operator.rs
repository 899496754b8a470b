//! Spatial operators: the discretised generator of the pricing PDE.

use crate::finite_differences::mesher::FdmMesher;
use crate::finite_differences::tridiagonal::TridiagonalOperator;
use fdp_core::{ensure, errors::Error, errors::Result, Real, Size, Time};
use fdp_math::Array;
use fdp_processes::GeneralizedBlackScholesProcess;
use fdp_termstructures::{BlackVolTermStructure, LocalVolTermStructure, YieldTermStructure};
use std::cell::RefCell;
use std::rc::Rc;

/// The spatial operator seen by the time-stepping scheme.
///
/// `set_time` loads coefficients for the step `[t1, t2]`; `apply` is the
/// explicit leg `L·a` and `solve_splitting` the implicit leg
/// `(I + s·L)·x = rhs`.
pub trait FdmLinearOpComposite: std::fmt::Debug {
    /// Operator dimension (number of grid nodes).
    fn size(&self) -> Size;

    /// Load the coefficients for the time interval `[t1, t2]`, `t1 < t2`.
    fn set_time(&self, t1: Time, t2: Time) -> Result<()>;

    /// Apply the operator: `L·a`.
    fn apply(&self, a: &Array) -> Array;

    /// Solve `(I + s·L)·x = rhs`.
    fn solve_splitting(&self, rhs: &Array, s: Real) -> Result<Array>;
}

/// Discretised Black-Scholes generator on a log-spot grid.
///
/// In `x = ln S` the backward operator is
///
/// `L f = ½σ² f″ + (r − q − ½σ²) f′ − r f`
///
/// discretised with central differences on the non-uniform grid.  At the
/// grid edges the convection term uses a one-sided difference and the
/// diffusion term is dropped (zero-curvature edges); the grid is wide
/// enough that the edge rows carry negligible weight at the centre.
#[derive(Debug)]
pub struct FdmBlackScholesOp {
    mesher: Rc<dyn FdmMesher>,
    process: Rc<GeneralizedBlackScholesProcess>,
    strike: Real,
    use_local_vol: bool,
    illegal_local_vol_overwrite: Option<Real>,
    op: RefCell<TridiagonalOperator>,
}

impl FdmBlackScholesOp {
    /// Create the operator.
    ///
    /// With `use_local_vol` the diffusion coefficient is read per node from
    /// the process's local-volatility surface; otherwise the forward Black
    /// variance at `strike` is used for the whole grid.  A non-finite or
    /// non-positive local volatility is replaced by
    /// `illegal_local_vol_overwrite` when given, and is an error otherwise.
    ///
    /// # Errors
    /// Fails if the mesher is not one-dimensional, or `use_local_vol` is
    /// set but the process carries no local-volatility surface.
    pub fn new(
        mesher: Rc<dyn FdmMesher>,
        process: Rc<GeneralizedBlackScholesProcess>,
        strike: Real,
        use_local_vol: bool,
        illegal_local_vol_overwrite: Option<Real>,
    ) -> Result<Self> {
        let layout = mesher.layout();
        ensure!(
            layout.dimensions() == 1,
            "Black-Scholes operator needs a one-dimensional grid, got {} axes",
            layout.dimensions()
        );
        ensure!(
            !use_local_vol || process.local_volatility().is_some(),
            "local-volatility pricing requested but the process has no local-vol surface"
        );
        let op = TridiagonalOperator::new(layout.size())?;
        Ok(Self {
            mesher,
            process,
            strike,
            use_local_vol,
            illegal_local_vol_overwrite,
            op: RefCell::new(op),
        })
    }

    fn local_variance(&self, t: Time, x: Real) -> Result<Real> {
        let lv = self
            .process
            .local_volatility()
            .ok_or_else(|| Error::Precondition("local-vol surface disappeared".into()))?;
        let mut sigma = lv.local_vol(t, x.exp());
        if !sigma.is_finite() || sigma <= 0.0 {
            match self.illegal_local_vol_overwrite {
                Some(overwrite) => sigma = overwrite,
                None => {
                    return Err(Error::Numerical(format!(
                        "illegal local volatility {sigma} at t={t}, x={x}"
                    )))
                }
            }
        }
        Ok(sigma * sigma)
    }
}

impl FdmLinearOpComposite for FdmBlackScholesOp {
    fn size(&self) -> Size {
        self.mesher.layout().size()
    }

    fn set_time(&self, t1: Time, t2: Time) -> Result<()> {
        ensure!(t1 < t2, "need t1 < t2, got [{t1}, {t2}]");
        let r = self.process.risk_free_rate().forward_rate(t1, t2);
        let q = self.process.dividend_yield().forward_rate(t1, t2);

        let flat_variance = if self.use_local_vol {
            None
        } else {
            let bv = self.process.black_volatility().ok_or_else(|| {
                Error::Precondition("process has no Black-volatility surface".into())
            })?;
            Some(bv.forward_variance(t1, t2, self.strike))
        };
        let t_mid = 0.5 * (t1 + t2);

        let layout = self.mesher.layout();
        let n = layout.size();
        let mut op = self.op.borrow_mut();

        for node in layout.nodes() {
            let i = node.index;
            let x = self.mesher.location(&node, 0);
            let v = match flat_variance {
                Some(v) => v,
                None => self.local_variance(t_mid, x)?,
            };
            let mu = r - q - 0.5 * v;

            match (self.mesher.dminus(&node, 0), self.mesher.dplus(&node, 0)) {
                (Some(hm), Some(hp)) => {
                    // Non-uniform central differences
                    let lower = v / (hm * (hm + hp)) - mu * hp / (hm * (hm + hp));
                    let diag = -v / (hm * hp) + mu * (hp - hm) / (hm * hp) - r;
                    let upper = v / (hp * (hm + hp)) + mu * hm / (hp * (hm + hp));
                    op.set_mid_row(i, lower, diag, upper);
                }
                (None, Some(hp)) => {
                    // Lower edge: forward difference, no curvature
                    op.set_first_row(-mu / hp - r, mu / hp);
                }
                (Some(hm), None) => {
                    // Upper edge: backward difference, no curvature
                    op.set_last_row(-mu / hm, mu / hm - r);
                }
                (None, None) => {
                    return Err(Error::Precondition(format!(
                        "grid node {i} of {n} has no neighbours"
                    )))
                }
            }
        }
        Ok(())
    }

    fn apply(&self, a: &Array) -> Array {
        self.op.borrow().apply(a)
    }

    fn solve_splitting(&self, rhs: &Array, s: Real) -> Result<Array> {
        let mut m = self.op.borrow().clone();
        m.scale(s);
        m.add_identity(1.0);
        m.solve(rhs)
    }
}
