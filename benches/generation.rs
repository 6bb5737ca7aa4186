use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use conjoint::efficiency::{d_efficiency, d_optimality, design_matrix};
use conjoint::generate::{AnnealingConfig, DOptimalGenerator, Generator, Method};
use conjoint::sample_size::{optimize_parameters, OptimizationRequest};
use conjoint::{Attribute, Grid};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn grid(attributes: usize, levels: usize) -> Grid {
    Grid::new(
        (0..attributes)
            .map(|a| Attribute::new(format!("A{a}"), (0..levels).map(|l| format!("L{l}"))))
            .collect(),
    )
}

fn bench_generators(c: &mut Criterion) {
    let mut group = c.benchmark_group("Generators");
    let grid = grid(5, 4);

    for method in [Method::Random, Method::Balanced, Method::Orthogonal] {
        group.bench_with_input(BenchmarkId::from_parameter(method), &method, |b, &method| {
            let generator = method.generator(&AnnealingConfig::default());
            let mut rng = StdRng::seed_from_u64(0);
            b.iter(|| generator.generate(&grid, 4, 12, &mut rng).unwrap());
        });
    }
    group.finish();
}

fn bench_doptimal(c: &mut Criterion) {
    let mut group = c.benchmark_group("DOptimal");
    group.sample_size(20);

    for attributes in [3, 5, 8] {
        let grid = grid(attributes, 3);
        group.bench_with_input(BenchmarkId::from_parameter(attributes), &grid, |b, grid| {
            let generator = DOptimalGenerator::new(AnnealingConfig::default());
            let mut rng = StdRng::seed_from_u64(1);
            b.iter(|| generator.anneal(grid, 3, 12, &mut rng).unwrap());
        });
    }
    group.finish();
}

fn bench_efficiency(c: &mut Criterion) {
    let mut group = c.benchmark_group("Efficiency");

    for screens in [10, 20, 40] {
        let grid = grid(6, 4);
        let design = Method::Random
            .generator(&AnnealingConfig::default())
            .generate(&grid, 4, screens, &mut StdRng::seed_from_u64(2))
            .unwrap();
        group.bench_with_input(BenchmarkId::new("d_efficiency", screens), &design, |b, design| {
            b.iter(|| d_efficiency(design, &grid));
        });
        let x = design_matrix(&design, &grid);
        group.bench_with_input(BenchmarkId::new("log_det", screens), &x, |b, x| {
            b.iter(|| d_optimality(x));
        });
    }
    group.finish();
}

fn bench_optimize_parameters(c: &mut Criterion) {
    let grid = grid(6, 4);
    c.bench_function("optimize_parameters", |b| {
        b.iter(|| optimize_parameters(&grid, &OptimizationRequest::default()).unwrap());
    });
}

criterion_group!(
    benches,
    bench_generators,
    bench_doptimal,
    bench_efficiency,
    bench_optimize_parameters
);
criterion_main!(benches);
