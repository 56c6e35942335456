//! Criterion benchmarks for sensitivity_core
//!
//! Run with: cargo bench -p sensitivity_core

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use sensitivity_core::optimization::{BinOptimizer, OptimizerConfig};
use sensitivity_core::significance::SignificanceSolver;
use sensitivity_core::units::{Energy, EnergyExt};
use sensitivity_core::{
    SampleKind, SensitivityConfig, SensitivityCurveBuilder, ShowerEvent, SimulatedSample, Spectrum,
    WorkerPool,
};

fn random_events(rng: &mut SmallRng, n: usize, signal: bool) -> Vec<ShowerEvent> {
    (0..n)
        .map(|_| {
            let u: f64 = rng.random();
            let gammaness: f64 = rng.random();
            let theta_squared = if signal {
                0.002 * rng.random::<f64>()
            } else {
                0.2 * rng.random::<f64>()
            };
            ShowerEvent {
                energy: Energy::from_tev(0.05 * 2000f64.powf(u)),
                gammaness: if signal { 0.5 + 0.5 * gammaness } else { gammaness },
                theta_squared,
                weight: if signal { 1.0 } else { 0.1 },
            }
        })
        .collect()
}

fn samples(n_signal: usize, n_background: usize) -> (SimulatedSample, SimulatedSample) {
    let mut rng = SmallRng::seed_from_u64(42);
    let signal = random_events(&mut rng, n_signal, true);
    let background = random_events(&mut rng, n_background, false);
    (
        SimulatedSample::from_events(SampleKind::Signal, signal).unwrap(),
        SimulatedSample::from_events(SampleKind::Background, background).unwrap(),
    )
}

fn bench_relative_flux(c: &mut Criterion) {
    let solver = SignificanceSolver::default();
    c.bench_function("relative_flux", |b| {
        b.iter(|| solver.relative_flux(black_box(42.0), black_box(17.5)))
    });
}

fn bench_grid_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("bin_grid_search");
    let optimizer = BinOptimizer::new(OptimizerConfig::default()).unwrap();

    for n_background in [1_000, 10_000].iter() {
        let (signal, background) = samples(1_000, *n_background);
        group.bench_with_input(
            BenchmarkId::new("background_events", n_background),
            n_background,
            |b, _| {
                b.iter(|| {
                    optimizer.optimize(
                        black_box(signal.events()),
                        black_box(background.events()),
                        black_box(&Spectrum::crab()),
                    )
                })
            },
        );
    }

    group.finish();
}

fn bench_curve_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("curve_build");
    let (signal, background) = samples(5_000, 50_000);
    let config = SensitivityConfig {
        n_bins: 8,
        ..SensitivityConfig::default()
    };

    for threads in [1, 4].iter() {
        let builder = SensitivityCurveBuilder::new(config).with_pool(WorkerPool::new(*threads));
        group.bench_with_input(BenchmarkId::new("threads", threads), threads, |b, _| {
            b.iter(|| {
                builder.build(
                    black_box(&signal),
                    black_box(&background),
                    black_box(&Spectrum::crab()),
                )
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_relative_flux,
    bench_grid_search,
    bench_curve_build,
);
criterion_main!(benches);
