//! Benchmarks for the PDE rollback at several grid resolutions.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use fdp_instruments::{Exercise, OptionType, Payoff, PlainVanillaPayoff};
use fdp_methods::{
    black_scholes_mesher, vanilla_composite, FdmBlackScholesSolver, FdmLogInnerValue,
    FdmSchemeDesc, FdmSolverDesc,
};
use fdp_processes::GeneralizedBlackScholesProcess;
use fdp_termstructures::{BlackConstantVol, FlatForward};
use std::rc::Rc;

fn make_solver(space_steps: usize, time_steps: usize) -> FdmBlackScholesSolver {
    let process = Rc::new(GeneralizedBlackScholesProcess::new(
        100.0,
        Rc::new(FlatForward::new(0.05)),
        Rc::new(FlatForward::new(0.0)),
        Rc::new(BlackConstantVol::new(0.20)),
    ));
    let strike = 100.0;
    let maturity = 1.0;
    let mesher = Rc::new(
        black_scholes_mesher(space_steps, &process, maturity, strike, None, None).unwrap(),
    );
    let payoff: Rc<dyn Payoff> = Rc::new(PlainVanillaPayoff::new(OptionType::Call, strike));
    let calculator = Rc::new(FdmLogInnerValue::new(payoff, mesher.clone(), 0, Some(strike)));
    let condition = Rc::new(vanilla_composite(
        mesher.clone(),
        calculator.clone(),
        &Exercise::european(maturity),
    ));
    let desc = FdmSolverDesc {
        mesher,
        bc_set: Vec::new(),
        condition,
        calculator,
        maturity,
        time_steps,
        damping_steps: 0,
    };
    FdmBlackScholesSolver::new(process, strike, desc, FdmSchemeDesc::douglas(), false, None)
        .unwrap()
}

fn bench_rollback(c: &mut Criterion) {
    let mut group = c.benchmark_group("rollback");
    for &(nodes, steps) in &[(101usize, 50usize), (201, 100), (401, 200)] {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{nodes}x{steps}")),
            &(nodes, steps),
            |b, &(nodes, steps)| {
                b.iter(|| {
                    let solver = make_solver(nodes, steps);
                    solver.value_at(100.0).unwrap()
                });
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_rollback);
criterion_main!(benches);
