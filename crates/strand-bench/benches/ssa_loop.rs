//! Criterion benchmarks for the SSA loop.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use strand_bench::{reference_profile, stress_profile};
use strand_test_utils::phage_simulation;

fn bench_step_reference(c: &mut Criterion) {
    let mut sim = reference_profile(42, 1e6);

    // Warm up until transcripts and ribosomes are on the books.
    for _ in 0..10_000 {
        sim.execute().unwrap();
    }

    c.bench_function("step_reference", |b| {
        b.iter(|| {
            let fired = sim.execute().unwrap();
            black_box(fired);
        });
    });
}

fn bench_step_stress(c: &mut Criterion) {
    let mut sim = stress_profile(42, 1e6);
    for _ in 0..10_000 {
        sim.execute().unwrap();
    }

    c.bench_function("step_stress", |b| {
        b.iter(|| {
            let fired = sim.execute().unwrap();
            black_box(fired);
        });
    });
}

fn bench_run_phage_60s(c: &mut Criterion) {
    c.bench_function("run_phage_60s", |b| {
        b.iter(|| {
            let mut sim = phage_simulation(42, 60.0, 0.5);
            let report = sim.run().unwrap();
            black_box(report.metrics.steps);
        });
    });
}

criterion_group!(
    benches,
    bench_step_reference,
    bench_step_stress,
    bench_run_phage_60s
);
criterion_main!(benches);
