//! Grid meshers: node locations and spacings along each axis.

use crate::finite_differences::layout::{FdmLinearOpLayout, FdmLinearOpNode};
use fdp_core::{ensure, errors::Result, Real, Size, Time};
use fdp_processes::GeneralizedBlackScholesProcess;
use fdp_termstructures::{BlackVolTermStructure, LocalVolTermStructure};
use std::rc::Rc;

/// Provides node locations and neighbour spacings for a grid.
///
/// `dplus`/`dminus` return `None` at the respective grid edge; operators and
/// inner-value calculators use that to detect boundary nodes.
pub trait FdmMesher: std::fmt::Debug {
    /// The layout describing the grid.
    fn layout(&self) -> Rc<FdmLinearOpLayout>;

    /// Coordinate of `node` along `axis`.
    fn location(&self, node: &FdmLinearOpNode, axis: usize) -> Real;

    /// Distance to the next node along `axis`, `None` at the upper edge.
    fn dplus(&self, node: &FdmLinearOpNode, axis: usize) -> Option<Real>;

    /// Distance to the previous node along `axis`, `None` at the lower edge.
    fn dminus(&self, node: &FdmLinearOpNode, axis: usize) -> Option<Real>;

    /// All node locations along `axis`, in increasing order.
    fn locations(&self, axis: usize) -> Vec<Real>;
}

/// A one-dimensional mesher backed by an explicit list of locations.
#[derive(Debug, Clone)]
pub struct Fdm1dMesher {
    layout: Rc<FdmLinearOpLayout>,
    locations: Vec<Real>,
    dplus: Vec<Option<Real>>,
    dminus: Vec<Option<Real>>,
}

impl Fdm1dMesher {
    /// Build a mesher from explicit node locations.
    ///
    /// # Errors
    /// Fails if fewer than 2 locations are given or they are not strictly
    /// increasing.
    pub fn from_locations(locations: Vec<Real>) -> Result<Self> {
        let n = locations.len();
        ensure!(n >= 2, "mesher needs at least 2 nodes, got {n}");
        for i in 0..n - 1 {
            ensure!(
                locations[i + 1] > locations[i],
                "node locations must be strictly increasing: x[{}]={} >= x[{}]={}",
                i,
                locations[i],
                i + 1,
                locations[i + 1]
            );
        }

        let mut dplus = Vec::with_capacity(n);
        let mut dminus = Vec::with_capacity(n);
        for i in 0..n {
            dminus.push((i > 0).then(|| locations[i] - locations[i - 1]));
            dplus.push((i < n - 1).then(|| locations[i + 1] - locations[i]));
        }

        Ok(Self {
            layout: Rc::new(FdmLinearOpLayout::new(vec![n])?),
            locations,
            dplus,
            dminus,
        })
    }
}

impl FdmMesher for Fdm1dMesher {
    fn layout(&self) -> Rc<FdmLinearOpLayout> {
        self.layout.clone()
    }

    fn location(&self, node: &FdmLinearOpNode, axis: usize) -> Real {
        debug_assert_eq!(axis, 0);
        self.locations[node.coordinates[axis]]
    }

    fn dplus(&self, node: &FdmLinearOpNode, axis: usize) -> Option<Real> {
        self.dplus[node.coordinates[axis]]
    }

    fn dminus(&self, node: &FdmLinearOpNode, axis: usize) -> Option<Real> {
        self.dminus[node.coordinates[axis]]
    }

    fn locations(&self, _axis: usize) -> Vec<Real> {
        self.locations.clone()
    }
}

/// Build a uniform log-spot grid for a Black-Scholes process.
///
/// The grid is centred on `ln(spot)` and spans five standard deviations of
/// the terminal log-spot distribution on each side, widened if necessary so
/// the strike lies at least one standard deviation inside the grid.
/// Explicit `x_min`/`x_max` constraints override the computed edges.
///
/// # Errors
/// Fails if `size < 3`, the spot or strike is not positive, `maturity` is
/// not positive, or the volatility read off the process is not positive.
pub fn black_scholes_mesher(
    size: Size,
    process: &GeneralizedBlackScholesProcess,
    maturity: Time,
    strike: Real,
    x_min: Option<Real>,
    x_max: Option<Real>,
) -> Result<Fdm1dMesher> {
    ensure!(size >= 3, "log-spot grid needs at least 3 nodes, got {size}");
    let spot = process.spot();
    ensure!(spot > 0.0, "spot must be positive, got {spot}");
    ensure!(strike > 0.0, "strike must be positive, got {strike}");
    ensure!(maturity > 0.0, "maturity must be positive, got {maturity}");

    let sigma = match process.local_volatility() {
        Some(lv) => lv.local_vol(0.0, spot),
        None => match process.black_volatility() {
            Some(bv) => bv.black_vol(maturity, strike),
            None => 0.0,
        },
    };
    ensure!(sigma > 0.0, "volatility must be positive, got {sigma}");

    let std_dev = sigma * maturity.sqrt();
    let center = spot.ln();
    let log_strike = strike.ln();

    let mut lo = (center - 5.0 * std_dev).min(log_strike - std_dev);
    let mut hi = (center + 5.0 * std_dev).max(log_strike + std_dev);
    if let Some(x) = x_min {
        lo = x;
    }
    if let Some(x) = x_max {
        hi = x;
    }
    ensure!(hi > lo, "empty log-spot range [{lo}, {hi}]");

    let dx = (hi - lo) / (size - 1) as Real;
    let locations = (0..size).map(|i| lo + i as Real * dx).collect();
    Fdm1dMesher::from_locations(locations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use fdp_termstructures::{BlackConstantVol, FlatForward, YieldTermStructure};

    #[test]
    fn spacings_match_locations() {
        let m = Fdm1dMesher::from_locations(vec![0.0, 0.5, 1.5, 3.0]).unwrap();
        let nodes: Vec<_> = m.layout().nodes().collect();
        assert_eq!(nodes.len(), 4);

        assert!(m.dminus(&nodes[0], 0).is_none());
        assert!(m.dplus(&nodes[3], 0).is_none());
        assert_abs_diff_eq!(m.dplus(&nodes[0], 0).unwrap(), 0.5, epsilon = 1e-15);
        assert_abs_diff_eq!(m.dminus(&nodes[2], 0).unwrap(), 1.0, epsilon = 1e-15);
        assert_abs_diff_eq!(m.dplus(&nodes[2], 0).unwrap(), 1.5, epsilon = 1e-15);
        assert_abs_diff_eq!(m.location(&nodes[1], 0), 0.5, epsilon = 1e-15);
    }

    #[test]
    fn rejects_unsorted_locations() {
        assert!(Fdm1dMesher::from_locations(vec![0.0, 1.0, 1.0]).is_err());
        assert!(Fdm1dMesher::from_locations(vec![1.0]).is_err());
    }

    fn make_process(spot: Real) -> GeneralizedBlackScholesProcess {
        let r: Rc<dyn YieldTermStructure> = Rc::new(FlatForward::new(0.05));
        let q: Rc<dyn YieldTermStructure> = Rc::new(FlatForward::new(0.0));
        let v: Rc<dyn BlackVolTermStructure> = Rc::new(BlackConstantVol::new(0.20));
        GeneralizedBlackScholesProcess::new(spot, r, q, v)
    }

    #[test]
    fn log_spot_grid_covers_spot_and_strike() {
        let p = make_process(100.0);
        let m = black_scholes_mesher(101, &p, 1.0, 100.0, None, None).unwrap();
        let xs = m.locations(0);
        assert_eq!(xs.len(), 101);
        let center = 100.0f64.ln();
        assert!(xs[0] < center && center < *xs.last().unwrap());
        // ±5 standard deviations at σ√T = 0.2
        assert_abs_diff_eq!(xs[0], center - 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(*xs.last().unwrap(), center + 1.0, epsilon = 1e-12);
    }

    #[test]
    fn grid_widens_for_distant_strike() {
        let p = make_process(100.0);
        let m = black_scholes_mesher(101, &p, 1.0, 500.0, None, None).unwrap();
        let xs = m.locations(0);
        let log_strike = 500.0f64.ln();
        assert!(*xs.last().unwrap() >= log_strike + 0.2 - 1e-12);
    }

    #[test]
    fn explicit_constraints_override_edges() {
        let p = make_process(100.0);
        let m = black_scholes_mesher(11, &p, 1.0, 100.0, Some(4.0), Some(5.0)).unwrap();
        let xs = m.locations(0);
        assert_abs_diff_eq!(xs[0], 4.0, epsilon = 1e-15);
        assert_abs_diff_eq!(*xs.last().unwrap(), 5.0, epsilon = 1e-15);
    }

    #[test]
    fn rejects_bad_inputs() {
        let p = make_process(100.0);
        assert!(black_scholes_mesher(2, &p, 1.0, 100.0, None, None).is_err());
        assert!(black_scholes_mesher(11, &p, 0.0, 100.0, None, None).is_err());
        assert!(black_scholes_mesher(11, &p, 1.0, -100.0, None, None).is_err());
    }
}
