//! Benchmarks for swath indexing and nearest-neighbour resampling.
//!
//! Run with: cargo bench --package grid-processor --bench swath_benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use grid_processor::{ResampleConfig, ResamplingEngine, SwathIndex};
use rand::Rng;
use geo_common::{BoundingBox, GeoGrid};
use test_utils::{create_swath, create_swath_raster, fixtures::projections};

fn lonlat_grid(extent: BoundingBox, size: usize) -> GeoGrid {
    GeoGrid::new(projections::lonlat(), extent, size, size).expect("benchmark grid is valid")
}

// =============================================================================
// INDEX BUILD BENCHMARKS
// =============================================================================

fn bench_index_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("swath_index_build");
    group.sample_size(20);

    for (rows, cols, name) in [
        (100, 100, "100x100"),
        (500, 500, "500x500"),
        (1000, 1500, "1000x1500"),
    ] {
        let swath = create_swath(rows, cols, 10.0, 45.0, 0.01, 7);
        group.throughput(Throughput::Elements((rows * cols) as u64));
        group.bench_with_input(BenchmarkId::new("build", name), &swath, |b, swath| {
            b.iter(|| SwathIndex::build(black_box(swath)));
        });
    }

    group.finish();
}

// =============================================================================
// QUERY BENCHMARKS
// =============================================================================

fn bench_index_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("swath_index_query");

    let swath = create_swath(500, 500, 10.0, 45.0, 0.01, 7);
    let index = SwathIndex::build(&swath);

    // Random points inside the swath footprint
    let mut rng = rand::thread_rng();
    let queries: Vec<(f64, f64)> = (0..1000)
        .map(|_| (rng.gen_range(7.6..12.4), rng.gen_range(42.6..47.4)))
        .collect();

    for radius in [1_000.0, 5_000.0, 50_000.0] {
        group.throughput(Throughput::Elements(queries.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("1000_queries", format!("{}m", radius)),
            &radius,
            |b, &radius| {
                b.iter(|| {
                    for &(lon, lat) in &queries {
                        black_box(index.nearest_within(lon, lat, radius));
                    }
                });
            },
        );
    }

    group.finish();
}

// =============================================================================
// END-TO-END RESAMPLING BENCHMARKS
// =============================================================================

fn bench_swath_resample(c: &mut Criterion) {
    let mut group = c.benchmark_group("swath_resample");
    group.sample_size(10);

    let swath = create_swath(500, 500, 10.0, 45.0, 0.01, 7);
    let source = create_swath_raster(&swath);
    let index = SwathIndex::build(&swath);

    for (size, name) in [(128, "128x128"), (256, "256x256"), (512, "512x512")] {
        let target = lonlat_grid(BoundingBox::new(7.5, 42.5, 12.5, 47.5), size);

        for parallel in [false, true] {
            let engine = ResamplingEngine::new(ResampleConfig {
                parallel,
                ..Default::default()
            })
            .expect("default config is valid");
            let mode = if parallel { "parallel" } else { "sequential" };

            group.throughput(Throughput::Elements((size * size) as u64));
            group.bench_with_input(BenchmarkId::new(mode, name), &target, |b, target| {
                b.iter(|| engine.resample_swath(black_box(&source), &index, black_box(target)));
            });
        }
    }

    group.finish();
}

fn bench_index_reuse(c: &mut Criterion) {
    let mut group = c.benchmark_group("swath_index_reuse");
    group.sample_size(10);

    let swath = create_swath(300, 300, 10.0, 45.0, 0.01, 3);
    let source = create_swath_raster(&swath);
    let index = SwathIndex::build(&swath);
    let engine = ResamplingEngine::default();
    let target = lonlat_grid(BoundingBox::new(8.5, 43.5, 11.5, 46.5), 256);

    group.bench_function("fresh_index", |b| {
        b.iter(|| engine.resample_to(black_box(&source), &target));
    });
    group.bench_function("prebuilt_index", |b| {
        b.iter(|| engine.resample_swath(black_box(&source), &index, &target));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_index_build,
    bench_index_query,
    bench_swath_resample,
    bench_index_reuse,
);
criterion_main!(benches);
