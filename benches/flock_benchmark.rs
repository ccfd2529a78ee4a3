/*
 * Flock Benchmark
 *
 * Measures the cost of neighbor discovery and of whole ticks for both
 * search strategies at several population sizes, which is the complexity
 * tradeoff the grid exists to demonstrate.
 */

use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use std::time::Duration;

use flock_grid::{
    Bounds, BruteForce, FlockConfig, FlockSimulation, GridFinder, NeighborFinder, NeighborStrategy,
};

const POPULATIONS: [usize; 4] = [100, 500, 1000, 2000];

// Bounds grow with the population so density stays roughly constant
fn bounds_for(n: usize) -> Bounds {
    let side = (n as f32 * 60.0).cbrt();
    Bounds::new(side * 2.0, side, side * 2.0)
}

fn config_for(n: usize, strategy: NeighborStrategy) -> FlockConfig {
    FlockConfig::default()
        .with_num_boids(n)
        .with_bounds(bounds_for(n))
        .with_strategy(strategy)
        .with_seed(0xB01D)
}

// Benchmark one query per agent with each strategy
fn bench_neighbor_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("neighbor_queries");

    for &n in POPULATIONS.iter() {
        let sim = FlockSimulation::new(config_for(n, NeighborStrategy::BruteForce))
            .expect("valid bench config");
        let boids = sim.agents().to_vec();
        let radius = sim.weights().neighbor_radius;

        group.bench_with_input(BenchmarkId::new("brute_force", n), &n, |b, _| {
            b.iter(|| {
                for i in 0..boids.len() {
                    black_box(BruteForce.query(&boids, i, radius));
                }
            });
        });

        let mut grid = GridFinder::new(radius, bounds_for(n)).expect("valid grid");
        group.bench_with_input(BenchmarkId::new("grid", n), &n, |b, _| {
            b.iter(|| {
                grid.rebuild(&boids);
                for i in 0..boids.len() {
                    black_box(grid.query(&boids, i, radius));
                }
            });
        });
    }

    group.finish();
}

// Benchmark full ticks, sequential and parallel
fn bench_update_loop(c: &mut Criterion) {
    let mut group = c.benchmark_group("update_loop");
    let cell_size = FlockConfig::default().weights.neighbor_radius;

    for &n in POPULATIONS.iter() {
        for (label, strategy, parallel) in [
            ("brute_force", NeighborStrategy::BruteForce, false),
            ("grid", NeighborStrategy::Grid { cell_size }, false),
            ("grid_parallel", NeighborStrategy::Grid { cell_size }, true),
        ] {
            group.bench_with_input(BenchmarkId::new(label, n), &n, |b, &n| {
                b.iter_batched(
                    || {
                        FlockSimulation::new(config_for(n, strategy).with_parallel(parallel))
                            .expect("valid bench config")
                    },
                    |mut sim| {
                        sim.step(1.0 / 60.0);
                        black_box(sim.last_stats())
                    },
                    BatchSize::LargeInput,
                );
            });
        }
    }

    group.finish();
}

// Configure the benchmarks
criterion_group! {
    name = benches;
    config = Criterion::default()
        .sample_size(10)
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(1));
    targets = bench_neighbor_queries, bench_update_loop
}

criterion_main!(benches);
