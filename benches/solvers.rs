//! Benchmarks for the diode and JFET solvers.

use clipper_core::analysis::{linspace, sine};
use clipper_core::precision::cast_slice;
use clipper_core::solver::JfetConfig;
use clipper_core::{DiodeParams, DiodeSolver, Formulation, JfetParams, JfetSolver, Real};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

const BLOCK: usize = 512;

fn j201<T: Real>() -> JfetParams<T> {
    JfetParams::<f64>::new(1.304e-3, 2.8e-3, -0.8, 4.4e3, 1e3, 9.0)
        .with_device_resistances(1.0, 1.0)
        .cast()
}

fn bench_diode_block<T: Real>(c: &mut Criterion, label: &str) {
    let mut group = c.benchmark_group(format!("diode_{}", label));
    let solver = DiodeSolver::<T>::new(DiodeParams::d1n4148(), T::from_wide(1e3), T::from_wide(20.0));
    let input: Vec<T> = cast_slice(&linspace(-2.0, 2.0, BLOCK));
    let mut output = vec![T::zero(); BLOCK];

    for formulation in Formulation::ALL {
        group.bench_with_input(
            BenchmarkId::from_parameter(formulation.name()),
            &formulation,
            |bencher, &formulation| {
                bencher.iter(|| {
                    solver
                        .process_into(formulation, black_box(&input), &mut output)
                        .unwrap()
                });
            },
        );
    }

    group.finish();
}

fn bench_diode(c: &mut Criterion) {
    bench_diode_block::<f32>(c, "f32");
    bench_diode_block::<f64>(c, "f64");
}

fn bench_jfet(c: &mut Criterion) {
    let mut group = c.benchmark_group("jfet");
    let input = sine(1.3, 20.0, BLOCK as f64 / 48_000.0, 48_000.0);

    for steps in [0, 2, 4] {
        let config = JfetConfig::new().with_newton_steps(steps);
        let wide = JfetSolver::<f64>::with_config(j201(), config);
        let narrow = JfetSolver::<f32>::with_config(j201(), config);
        let narrow_input: Vec<f32> = cast_slice(&input);
        let mut id = vec![0.0; input.len()];
        let mut vout = vec![0.0; input.len()];
        let mut id32 = vec![0.0f32; input.len()];
        let mut vout32 = vec![0.0f32; input.len()];

        group.bench_with_input(BenchmarkId::new("f64", steps), &steps, |bencher, _| {
            bencher.iter(|| wide.process_into(black_box(&input), &mut id, &mut vout).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("f32", steps), &steps, |bencher, _| {
            bencher.iter(|| {
                narrow
                    .process_into(black_box(&narrow_input), &mut id32, &mut vout32)
                    .unwrap()
            });
        });
    }

    group.finish();
}

fn bench_single_sample(c: &mut Criterion) {
    let diode = DiodeSolver::<f32>::new(DiodeParams::d1n4148(), 1e3, 20.0);
    let jfet = JfetSolver::<f32>::new(j201());

    c.bench_function("diode_omega_approx_sample", |b| {
        b.iter(|| black_box(diode.solve(Formulation::OmegaApprox, black_box(0.7))))
    });
    c.bench_function("jfet_sample", |b| b.iter(|| black_box(jfet.solve(black_box(0.3)))));
}

criterion_group!(benches, bench_diode, bench_jfet, bench_single_sample);
criterion_main!(benches);
