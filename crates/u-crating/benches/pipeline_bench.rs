//! Benchmarks for the full crate design pipeline.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use u_crating::{CrateConfiguration, CratePipeline};

fn pipeline_benchmark(c: &mut Criterion) {
    let pipeline = CratePipeline::new();

    let standard = CrateConfiguration::new().with_product(48.0, 40.0, 40.0).with_weight(500.0);
    c.bench_function("design_standard_crate", |b| {
        b.iter(|| {
            let result = pipeline.run(black_box(&standard));
            black_box(result)
        })
    });

    let large = CrateConfiguration::new()
        .with_product(180.0, 90.0, 96.0)
        .with_weight(20_000.0);
    c.bench_function("design_large_crate", |b| {
        b.iter(|| {
            let result = pipeline.run(black_box(&large));
            black_box(result)
        })
    });
}

criterion_group!(benches, pipeline_benchmark);
criterion_main!(benches);
