/*
 * Physics Module
 *
 * The two phases of a tick.
 *
 * Phase 1 (`compute_forces`) reads the tick-start population and returns one
 * outcome per agent without touching any agent. Phase 2 (`apply_forces` then
 * `integrate`) lets each agent mutate only itself. Because neither phase
 * observes another agent's updated state, both can run on rayon and the
 * result does not depend on iteration order.
 */

use glam::Vec3;
use rayon::prelude::*;

use crate::boid::{Boid, ForceSnapshot};
use crate::debug::TickStats;
use crate::neighbors::NeighborFinder;
use crate::params::{Bounds, RuleWeights};

// Phase 1 result for a single agent
#[derive(Debug, Clone)]
pub struct FlockOutcome {
    pub force: Vec3,
    pub snapshot: ForceSnapshot,
    pub candidates_checked: usize,
    pub visited_cells: usize,
}

fn flock_one(
    boids: &[Boid],
    index: usize,
    finder: &dyn NeighborFinder,
    weights: &RuleWeights,
    bounds: &Bounds,
) -> FlockOutcome {
    let boid = &boids[index];

    let wide = finder.query(boids, index, weights.neighbor_radius);
    let close = finder.query(boids, index, weights.separation_distance);

    let neighbors = wide.within(boids, boid.position, weights.neighbor_radius);
    let close_neighbors = close.within(boids, boid.position, weights.separation_distance);

    let (force, snapshot) = boid.compute_flock(boids, &neighbors, &close_neighbors, weights, bounds);

    FlockOutcome {
        force,
        snapshot,
        candidates_checked: wide.candidate_count() + close.candidate_count(),
        visited_cells: wide.visited_cell_count() + close.visited_cell_count(),
    }
}

// Phase 1: steering for every agent, from tick-start state only
pub fn compute_forces(
    boids: &[Boid],
    finder: &dyn NeighborFinder,
    weights: &RuleWeights,
    bounds: &Bounds,
    parallel: bool,
) -> Vec<FlockOutcome> {
    if parallel {
        (0..boids.len())
            .into_par_iter()
            .map(|i| flock_one(boids, i, finder, weights, bounds))
            .collect()
    } else {
        (0..boids.len())
            .map(|i| flock_one(boids, i, finder, weights, bounds))
            .collect()
    }
}

// Store each outcome on its agent and tally the counters
pub fn apply_forces(boids: &mut [Boid], outcomes: Vec<FlockOutcome>) -> TickStats {
    debug_assert_eq!(boids.len(), outcomes.len());

    let mut stats = TickStats {
        agents: boids.len(),
        queries: boids.len() * 2,
        ..TickStats::default()
    };

    for (boid, outcome) in boids.iter_mut().zip(outcomes) {
        stats.candidates_checked += outcome.candidates_checked;
        stats.visited_cells += outcome.visited_cells;
        stats.true_neighbors += outcome.snapshot.neighbors.len();
        stats.separation_neighbors += outcome.snapshot.separation_neighbors.len();

        boid.apply_force(outcome.force);
        boid.last_forces = Some(outcome.snapshot);
    }

    stats
}

// Phase 2: scale accumulated acceleration then integrate every agent
pub fn integrate(boids: &mut [Boid], delta_time: f32, acceleration_scale: f32, parallel: bool) {
    let step = |boid: &mut Boid| {
        boid.acceleration *= acceleration_scale;
        boid.update(delta_time);
    };

    if parallel {
        boids.par_iter_mut().for_each(step);
    } else {
        boids.iter_mut().for_each(step);
    }
}
