//! Benchmarks for plywood splicing and cleat placement.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use u_crating_core::PanelDimensions;
use u_crating_layout::{
    calculate_cleat_positions, calculate_plywood_pieces, CleatOptions, PlywoodOptions,
};

fn plywood_benchmark(c: &mut Criterion) {
    let options = PlywoodOptions::default();
    let panels: Vec<PanelDimensions> = (0..20)
        .map(|i| PanelDimensions::new(40.0 + 9.5 * i as f64, 30.0 + 6.0 * i as f64))
        .collect();

    c.bench_function("splice_20_panels", |b| {
        b.iter(|| {
            for panel in &panels {
                let layout = calculate_plywood_pieces(black_box(*panel), "BENCH_PANEL", &options);
                black_box(layout).ok();
            }
        })
    });

    let large = PanelDimensions::new(240.0, 144.0);
    let layout = calculate_plywood_pieces(large, "BENCH_PANEL", &options).ok();
    let splices = layout.map(|l| l.splices).unwrap_or_default();
    let cleat_options = CleatOptions::default();

    c.bench_function("cleats_large_panel", |b| {
        b.iter(|| {
            let placement = calculate_cleat_positions(
                black_box(large),
                "BENCH_PANEL",
                &splices,
                &cleat_options,
            );
            black_box(placement)
        })
    });
}

criterion_group!(benches, plywood_benchmark);
criterion_main!(benches);
