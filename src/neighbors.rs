/*
 * Neighbor Search Module
 *
 * Two interchangeable ways of finding the agents near a given agent:
 * - BruteForce: test every other agent, O(n) per query
 * - GridFinder: look only at nearby spatial grid cells
 *
 * Both hand back raw candidates; `filter_within` reduces them to the exact
 * neighbor set. After filtering the two strategies agree on membership,
 * while the raw candidate counts are what the complexity demo compares.
 */

use glam::Vec3;

use crate::boid::Boid;
use crate::error::FlockError;
use crate::params::{Bounds, NeighborStrategy};
use crate::spatial_grid::{CellCoord, SpatialGrid};

// Candidates for one query plus the cells looked at to find them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NeighborQuery {
    pub candidates: Vec<usize>,
    pub visited_cells: Vec<CellCoord>,
}

impl NeighborQuery {
    #[inline]
    pub fn candidate_count(&self) -> usize {
        self.candidates.len()
    }

    #[inline]
    pub fn visited_cell_count(&self) -> usize {
        self.visited_cells.len()
    }

    pub fn within(&self, boids: &[Boid], origin: Vec3, radius: f32) -> Vec<usize> {
        filter_within(boids, origin, &self.candidates, radius)
    }
}

/// Common behaviour of the neighbor search strategies.
///
/// `rebuild` is called once per tick before any query, and queries run
/// against that snapshot only, so implementations must be readable from
/// several threads at once.
pub trait NeighborFinder: Send + Sync {
    /// Refresh internal structures from the current population.
    fn rebuild(&mut self, boids: &[Boid]);

    /// Candidates for `boids[index]` within `radius`; never includes `index`.
    fn query(&self, boids: &[Boid], index: usize, radius: f32) -> NeighborQuery;

    fn name(&self) -> &'static str;

    /// Backing grid, for strategies that have one.
    fn grid(&self) -> Option<&SpatialGrid> {
        None
    }
}

// Exhaustive pairwise scan
#[derive(Debug, Clone, Copy, Default)]
pub struct BruteForce;

impl NeighborFinder for BruteForce {
    fn rebuild(&mut self, _boids: &[Boid]) {}

    fn query(&self, boids: &[Boid], index: usize, radius: f32) -> NeighborQuery {
        let origin = boids[index].position;
        let radius_sq = radius * radius;

        let candidates = boids
            .iter()
            .enumerate()
            .filter(|&(i, other)| i != index && origin.distance_squared(other.position) < radius_sq)
            .map(|(i, _)| i)
            .collect();

        NeighborQuery {
            candidates,
            visited_cells: Vec::new(),
        }
    }

    fn name(&self) -> &'static str {
        "brute force"
    }
}

// Uniform spatial hashing
#[derive(Debug, Clone)]
pub struct GridFinder {
    grid: SpatialGrid,
}

impl GridFinder {
    pub fn new(cell_size: f32, bounds: Bounds) -> Result<Self, FlockError> {
        Ok(Self {
            grid: SpatialGrid::new(cell_size, bounds)?,
        })
    }
}

impl NeighborFinder for GridFinder {
    fn rebuild(&mut self, boids: &[Boid]) {
        self.grid.rebuild(boids.iter().map(|boid| boid.position));
    }

    fn query(&self, boids: &[Boid], index: usize, radius: f32) -> NeighborQuery {
        self.grid.query(index, boids[index].position, radius)
    }

    fn name(&self) -> &'static str {
        "spatial grid"
    }

    fn grid(&self) -> Option<&SpatialGrid> {
        Some(&self.grid)
    }
}

// Build the finder selected in the configuration
pub fn finder_for(
    strategy: NeighborStrategy,
    bounds: Bounds,
) -> Result<Box<dyn NeighborFinder>, FlockError> {
    Ok(match strategy {
        NeighborStrategy::BruteForce => Box::new(BruteForce),
        NeighborStrategy::Grid { cell_size } => Box::new(GridFinder::new(cell_size, bounds)?),
    })
}

/// Keep only candidates strictly closer than `radius` to `origin`, sorted
/// by index so that later sums do not depend on discovery order.
pub fn filter_within(boids: &[Boid], origin: Vec3, candidates: &[usize], radius: f32) -> Vec<usize> {
    let radius_sq = radius * radius;
    let mut within: Vec<usize> = candidates
        .iter()
        .copied()
        .filter(|&i| origin.distance_squared(boids[i].position) < radius_sq)
        .collect();
    within.sort_unstable();
    within
}
