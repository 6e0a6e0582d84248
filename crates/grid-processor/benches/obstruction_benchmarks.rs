//! Benchmarks for depth resampling, obstruction synthesis and flood fill.
//!
//! Run with: cargo bench --package grid-processor --bench obstruction_benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use grid_processor::{
    create_obstr, generate_grid, remove_lake, ObstructionParams, ResampleParams,
};
use gridgen_common::{BoundarySet, GridField, TargetGrid};
use test_utils::{circle_island, constant_raster, sloping_raster};

fn small_islands(count: usize, extent: f64, seed: u64) -> BoundarySet {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let cx = rng.gen_range(0.0..extent);
            let cy = rng.gen_range(0.0..extent);
            circle_island(cx, cy, rng.gen_range(0.01..0.08), 24)
        })
        .collect::<Vec<_>>()
        .into()
}

// =============================================================================
// RESAMPLING BENCHMARKS
// =============================================================================

fn bench_generate_grid(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate_grid");
    let raster = sloping_raster([-1.0, 11.0], [-1.0, 11.0], 0.02, 5.0, -10.0);
    let params = ResampleParams::default();

    // bilinear below the raster spacing, area averaging above it
    for d in [0.01, 0.1, 0.5] {
        let grid = TargetGrid::new([0.0, 10.0], [0.0, 10.0], d, d, false).unwrap();
        let coords = grid.coords();
        group.throughput(Throughput::Elements((coords.nx() * coords.ny()) as u64));
        group.bench_with_input(BenchmarkId::new("spacing", d), &coords, |b, coords| {
            b.iter(|| generate_grid(black_box(coords), &raster, &params))
        });
    }

    group.finish();
}

// =============================================================================
// OBSTRUCTION BENCHMARKS
// =============================================================================

fn bench_create_obstr(c: &mut Criterion) {
    let mut group = c.benchmark_group("create_obstr");
    group.sample_size(20);

    let grid = TargetGrid::new([0.0, 5.0], [0.0, 5.0], 0.1, 0.1, false).unwrap();
    let coords = grid.coords();
    let mask = GridField::filled(coords.nx(), coords.ny(), 1u8);

    for count in [50, 500] {
        let islands = small_islands(count, 5.0, 3);
        for offset in [0, 1] {
            let params = ObstructionParams::symmetric(offset, false);
            group.bench_with_input(
                BenchmarkId::new(format!("offset_{}", offset), count),
                &islands,
                |b, islands| b.iter(|| create_obstr(black_box(&coords), islands, &mask, &params)),
            );
        }
    }

    group.finish();
}

// =============================================================================
// FLOOD FILL BENCHMARKS
// =============================================================================

fn bench_remove_lake(c: &mut Criterion) {
    let mut group = c.benchmark_group("remove_lake");
    let mut rng = StdRng::seed_from_u64(11);

    for n in [100, 500] {
        let data: Vec<u8> = (0..n * n).map(|_| u8::from(rng.gen_bool(0.7))).collect();
        let mask = GridField::from_vec(n, n, data).unwrap();
        group.throughput(Throughput::Elements((n * n) as u64));
        group.bench_with_input(BenchmarkId::new("cells", n * n), &mask, |b, mask| {
            b.iter_batched(
                || mask.clone(),
                |mut m| remove_lake(&mut m, -1, false),
                criterion::BatchSize::LargeInput,
            )
        });
    }

    // all-wet ocean, the common case for a regional grid
    let ocean = constant_raster([-1.0, 6.0], [-1.0, 6.0], 0.1, -50.0);
    let grid = TargetGrid::new([0.0, 5.0], [0.0, 5.0], 0.05, 0.05, false).unwrap();
    let depth = generate_grid(&grid.coords(), &ocean, &ResampleParams::default()).unwrap();
    let mask = depth.map(|&d| u8::from(d < 0.1));
    group.bench_function("ocean_101x101", |b| {
        b.iter_batched(
            || mask.clone(),
            |mut m| remove_lake(&mut m, -1, false),
            criterion::BatchSize::LargeInput,
        )
    });

    group.finish();
}

criterion_group!(benches, bench_generate_grid, bench_create_obstr, bench_remove_lake);
criterion_main!(benches);
