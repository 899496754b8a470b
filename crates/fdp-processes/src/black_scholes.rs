//! Generalized Black-Scholes process.
//!
//! `dS/S = (r(t) − q(t)) dt + σ(t, S) dW`
//!
//! where `r` is the risk-free rate, `q` the continuous dividend yield, and
//! `σ` either a Black volatility surface or a local-volatility function.
//!
//! Market parameters are held behind interior-mutable cells so a shared
//! process can be bumped in place; every setter notifies registered
//! observers.  Consumers that cache derived results (e.g. a PDE solver)
//! register explicitly or are invalidated explicitly by whoever performs
//! the bump.

use crate::stochastic_process::StochasticProcess1D;
use fdp_core::patterns::observable::{Observable, ObservableImpl, Observer};
use fdp_core::{Real, Time};
use fdp_termstructures::{
    BlackVolTermStructure, LocalVolTermStructure, YieldTermStructure,
};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

/// A generalized Black-Scholes stochastic process.
///
/// `dS = (r(t) − q(t)) · S · dt + σ(t, S) · S · dW`
#[derive(Debug)]
pub struct GeneralizedBlackScholesProcess {
    spot: Cell<Real>,
    risk_free_rate: RefCell<Rc<dyn YieldTermStructure>>,
    dividend_yield: RefCell<Rc<dyn YieldTermStructure>>,
    black_vol: RefCell<Option<Rc<dyn BlackVolTermStructure>>>,
    local_vol: RefCell<Option<Rc<dyn LocalVolTermStructure>>>,
    observable: ObservableImpl,
}

impl GeneralizedBlackScholesProcess {
    /// Create a new process with a Black volatility surface.
    pub fn new(
        spot: Real,
        risk_free_rate: Rc<dyn YieldTermStructure>,
        dividend_yield: Rc<dyn YieldTermStructure>,
        black_vol: Rc<dyn BlackVolTermStructure>,
    ) -> Self {
        Self {
            spot: Cell::new(spot),
            risk_free_rate: RefCell::new(risk_free_rate),
            dividend_yield: RefCell::new(dividend_yield),
            black_vol: RefCell::new(Some(black_vol)),
            local_vol: RefCell::new(None),
            observable: ObservableImpl::new(),
        }
    }

    /// Create with a local volatility surface instead.
    pub fn with_local_vol(
        spot: Real,
        risk_free_rate: Rc<dyn YieldTermStructure>,
        dividend_yield: Rc<dyn YieldTermStructure>,
        local_vol: Rc<dyn LocalVolTermStructure>,
    ) -> Self {
        Self {
            spot: Cell::new(spot),
            risk_free_rate: RefCell::new(risk_free_rate),
            dividend_yield: RefCell::new(dividend_yield),
            black_vol: RefCell::new(None),
            local_vol: RefCell::new(Some(local_vol)),
            observable: ObservableImpl::new(),
        }
    }

    /// The spot price.
    pub fn spot(&self) -> Real {
        self.spot.get()
    }

    /// The risk-free rate term structure.
    pub fn risk_free_rate(&self) -> Rc<dyn YieldTermStructure> {
        self.risk_free_rate.borrow().clone()
    }

    /// The dividend yield term structure.
    pub fn dividend_yield(&self) -> Rc<dyn YieldTermStructure> {
        self.dividend_yield.borrow().clone()
    }

    /// The Black volatility surface (if set).
    pub fn black_volatility(&self) -> Option<Rc<dyn BlackVolTermStructure>> {
        self.black_vol.borrow().clone()
    }

    /// The local volatility surface (if set).
    pub fn local_volatility(&self) -> Option<Rc<dyn LocalVolTermStructure>> {
        self.local_vol.borrow().clone()
    }

    /// Replace the spot price and notify observers.
    pub fn set_spot(&self, spot: Real) {
        self.spot.set(spot);
        self.observable.notify();
    }

    /// Replace the risk-free curve and notify observers.
    pub fn set_risk_free_rate(&self, curve: Rc<dyn YieldTermStructure>) {
        *self.risk_free_rate.borrow_mut() = curve;
        self.observable.notify();
    }

    /// Replace the dividend curve and notify observers.
    pub fn set_dividend_yield(&self, curve: Rc<dyn YieldTermStructure>) {
        *self.dividend_yield.borrow_mut() = curve;
        self.observable.notify();
    }

    /// Replace the Black volatility surface and notify observers.
    pub fn set_black_volatility(&self, vol: Rc<dyn BlackVolTermStructure>) {
        *self.black_vol.borrow_mut() = Some(vol);
        self.observable.notify();
    }

    /// Replace the local volatility surface and notify observers.
    pub fn set_local_volatility(&self, vol: Rc<dyn LocalVolTermStructure>) {
        *self.local_vol.borrow_mut() = Some(vol);
        self.observable.notify();
    }

    /// Get the volatility at time `t` and underlying `x`.
    fn vol(&self, t: Time, x: Real) -> Real {
        if let Some(lv) = self.local_vol.borrow().as_ref() {
            lv.local_vol(t, x)
        } else if let Some(bv) = self.black_vol.borrow().as_ref() {
            bv.black_vol(t, x)
        } else {
            0.0
        }
    }
}

impl Observable for GeneralizedBlackScholesProcess {
    fn register_observer(&self, observer: Weak<dyn Observer>) {
        self.observable.register(observer);
    }

    fn unregister_observer(&self, observer: &Weak<dyn Observer>) {
        self.observable.unregister(observer);
    }

    fn notify_observers(&self) {
        self.observable.notify();
    }
}

impl StochasticProcess1D for GeneralizedBlackScholesProcess {
    fn x0(&self) -> Real {
        self.spot.get()
    }

    fn drift(&self, t: Time, x: Real) -> Real {
        let r = self.risk_free_rate.borrow().zero_rate(t);
        let q = self.dividend_yield.borrow().zero_rate(t);
        (r - q) * x
    }

    fn diffusion(&self, t: Time, x: Real) -> Real {
        self.vol(t, x) * x
    }
}
