/*
 * Flock Simulation Module
 *
 * Owns the population and the neighbor finder and advances them one tick at
 * a time:
 * 1. Rebuild the neighbor finder from current positions
 * 2. Compute every agent's steering from the tick-start snapshot
 * 3. Integrate every agent
 *
 * Rule weights are either the configured ones (`step`) or a value owned by
 * the caller (`step_with`), which is how rules get toggled between ticks.
 */

use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::boid::{AgentTransform, Boid, ForceSnapshot};
use crate::debug::{ProbeReport, TickStats};
use crate::error::FlockError;
use crate::neighbors::{finder_for, NeighborFinder};
use crate::params::{FlockConfig, RuleWeights};
use crate::physics;

/// Captured population state, enough to replay ticks bit for bit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlockSnapshot {
    pub tick: u64,
    pub boids: Vec<Boid>,
}

pub struct FlockSimulation {
    config: FlockConfig,
    boids: Vec<Boid>,
    finder: Box<dyn NeighborFinder>,
    last_stats: TickStats,
    tick: u64,
}

impl FlockSimulation {
    /// Validate `config` and spawn a randomized population.
    pub fn new(config: FlockConfig) -> Result<Self, FlockError> {
        config.validate()?;

        let mut rng = match config.rng_seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };

        let boids = (0..config.num_boids)
            .map(|id| Boid::random(id, &config.bounds, config.max_speed, config.max_force, &mut rng))
            .collect();

        Self::assemble(config, boids)
    }

    /// Start from a hand-placed population. Ids are reassigned to match
    /// positions in `boids`, and `num_boids` follows its length.
    pub fn from_boids(mut config: FlockConfig, mut boids: Vec<Boid>) -> Result<Self, FlockError> {
        config.num_boids = boids.len();
        config.validate()?;

        for (id, boid) in boids.iter_mut().enumerate() {
            boid.id = id;
        }

        Self::assemble(config, boids)
    }

    fn assemble(config: FlockConfig, boids: Vec<Boid>) -> Result<Self, FlockError> {
        let finder = finder_for(config.strategy, config.bounds)?;

        debug!(
            agents = boids.len(),
            strategy = finder.name(),
            bounds = ?config.bounds,
            "flock created"
        );

        Ok(Self {
            config,
            boids,
            finder,
            last_stats: TickStats::default(),
            tick: 0,
        })
    }

    pub fn config(&self) -> &FlockConfig {
        &self.config
    }

    pub fn weights(&self) -> &RuleWeights {
        &self.config.weights
    }

    pub fn agents(&self) -> &[Boid] {
        &self.boids
    }

    pub fn len(&self) -> usize {
        self.boids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boids.is_empty()
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn last_stats(&self) -> TickStats {
        self.last_stats
    }

    pub fn last_forces(&self, index: usize) -> Option<&ForceSnapshot> {
        self.boids.get(index)?.last_forces.as_ref()
    }

    pub fn finder(&self) -> &dyn NeighborFinder {
        self.finder.as_ref()
    }

    pub fn transforms(&self) -> Vec<AgentTransform> {
        self.boids.iter().map(Boid::transform).collect()
    }

    // Advance one tick with the configured weights
    pub fn step(&mut self, delta_time: f32) {
        let weights = self.config.weights;
        self.step_with(delta_time, &weights);
    }

    // Advance one tick with caller-owned weights; bad input is logged and skipped
    pub fn step_with(&mut self, delta_time: f32, weights: &RuleWeights) {
        if let Err(err) = self.try_step_with(delta_time, weights) {
            warn!(%err, "skipping tick");
        }
    }

    pub fn try_step(&mut self, delta_time: f32) -> Result<TickStats, FlockError> {
        let weights = self.config.weights;
        self.try_step_with(delta_time, &weights)
    }

    pub fn try_step_with(
        &mut self,
        delta_time: f32,
        weights: &RuleWeights,
    ) -> Result<TickStats, FlockError> {
        if !(delta_time.is_finite() && delta_time >= 0.0) {
            return Err(FlockError::InvalidTimeStep(delta_time));
        }
        weights.validate()?;
        if let Some(grid) = self.finder.grid() {
            grid.check_reach(weights.max_radius())?;
        }

        let stats = self.accumulate_forces(weights);
        self.integrate(delta_time);
        Ok(stats)
    }

    /// Rebuild the finder and run phase 1, leaving each agent's acceleration
    /// and force snapshot set but nothing moved.
    pub fn accumulate_forces(&mut self, weights: &RuleWeights) -> TickStats {
        self.finder.rebuild(&self.boids);

        let outcomes = physics::compute_forces(
            &self.boids,
            self.finder.as_ref(),
            weights,
            &self.config.bounds,
            self.config.enable_parallel,
        );

        let mut stats = physics::apply_forces(&mut self.boids, outcomes);
        stats.tick = self.tick;

        trace!(
            tick = stats.tick,
            candidates = stats.candidates_checked,
            neighbors = stats.true_neighbors,
            cells = stats.visited_cells,
            "forces accumulated"
        );

        self.last_stats = stats;
        stats
    }

    // Phase 2: integrate accumulated acceleration over `delta_time`
    pub fn integrate(&mut self, delta_time: f32) {
        let scale = self.config.time_scaling.factor(delta_time);
        physics::integrate(&mut self.boids, delta_time, scale, self.config.enable_parallel);
        self.tick += 1;
    }

    /// Compare a full scan with the active strategy for one agent at the
    /// current positions.
    pub fn probe(&mut self, index: usize, radius: f32) -> Option<ProbeReport> {
        if index >= self.boids.len() || !(radius.is_finite() && radius >= 0.0) {
            return None;
        }

        self.finder.rebuild(&self.boids);
        let query = self.finder.query(&self.boids, index, radius);
        let origin = self.boids[index].position;
        let neighbors = query.within(&self.boids, origin, radius);

        Some(ProbeReport {
            index,
            origin,
            radius,
            full_scan_checks: self.boids.len() - 1,
            candidate_checks: query.candidate_count(),
            visited_cells: query.visited_cells,
            neighbors,
        })
    }

    pub fn snapshot(&self) -> FlockSnapshot {
        FlockSnapshot {
            tick: self.tick,
            boids: self.boids.clone(),
        }
    }

    // Reinstate a captured population; the population size is fixed
    pub fn restore(&mut self, snapshot: &FlockSnapshot) -> Result<(), FlockError> {
        if snapshot.boids.len() != self.boids.len() {
            return Err(FlockError::InvalidConfig(
                "snapshot population differs from this flock",
            ));
        }

        self.boids.clone_from(&snapshot.boids);
        self.tick = snapshot.tick;
        self.last_stats = TickStats::default();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{Bounds, NeighborStrategy, TimeScaling};
    use glam::Vec3;

    fn seeded(strategy: NeighborStrategy) -> FlockSimulation {
        let config = FlockConfig::default()
            .with_num_boids(80)
            .with_bounds(Bounds::new(30.0, 15.0, 30.0))
            .with_strategy(strategy)
            .with_seed(11);
        FlockSimulation::new(config).expect("valid config")
    }

    #[test]
    fn new_rejects_invalid_config() {
        let config = FlockConfig::default().with_num_boids(0);
        assert!(matches!(FlockSimulation::new(config), Err(FlockError::EmptyPopulation)));
    }

    #[test]
    fn ids_match_indices() {
        let sim = seeded(NeighborStrategy::BruteForce);
        for (i, boid) in sim.agents().iter().enumerate() {
            assert_eq!(boid.id, i);
        }
    }

    #[test]
    fn same_seed_same_flock() {
        let a = seeded(NeighborStrategy::BruteForce);
        let b = seeded(NeighborStrategy::BruteForce);
        assert_eq!(a.agents(), b.agents());
    }

    #[test]
    fn try_step_rejects_bad_delta() {
        let mut sim = seeded(NeighborStrategy::BruteForce);
        assert!(matches!(sim.try_step(f32::NAN), Err(FlockError::InvalidTimeStep(_))));
        assert!(matches!(sim.try_step(-0.1), Err(FlockError::InvalidTimeStep(_))));
        assert_eq!(sim.tick_count(), 0);
    }

    #[test]
    fn step_with_bad_weights_leaves_state_alone() {
        let mut sim = seeded(NeighborStrategy::BruteForce);
        let before = sim.snapshot();
        let weights = RuleWeights {
            neighbor_radius: -1.0,
            ..RuleWeights::default()
        };

        sim.step_with(1.0 / 60.0, &weights);
        assert_eq!(sim.snapshot(), before);
    }

    #[test]
    fn grid_rejects_weights_too_wide_for_its_cells() {
        let mut sim = seeded(NeighborStrategy::Grid { cell_size: 0.5 });
        let before = sim.snapshot();
        let weights = RuleWeights {
            neighbor_radius: 1e10,
            ..RuleWeights::default()
        };

        assert!(matches!(
            sim.try_step_with(1.0 / 60.0, &weights),
            Err(FlockError::QueryTooWide { .. })
        ));
        sim.step_with(1.0 / 60.0, &weights);
        assert_eq!(sim.snapshot(), before);

        let config = FlockConfig::default()
            .with_num_boids(2)
            .with_strategy(NeighborStrategy::Grid { cell_size: 1e-4 });
        assert!(matches!(FlockSimulation::new(config), Err(FlockError::QueryTooWide { .. })));
    }

    #[test]
    fn stats_count_both_bands() {
        let mut sim = seeded(NeighborStrategy::BruteForce);
        let stats = sim.try_step(1.0 / 60.0).expect("tick");

        assert_eq!(stats.agents, 80);
        assert_eq!(stats.queries, 160);
        assert_eq!(stats.brute_force_checks(), 2 * 80 * 79);
        // Brute force candidates are already exact
        assert_eq!(
            stats.candidates_checked,
            stats.true_neighbors + stats.separation_neighbors
        );
        assert_eq!(stats.visited_cells, 0);
    }

    #[test]
    fn probe_reports_grid_cells() {
        let mut sim = seeded(NeighborStrategy::Grid { cell_size: 5.0 });
        let report = sim.probe(0, 4.0).expect("index in range");

        assert_eq!(report.full_scan_checks, 79);
        assert_eq!(report.visited_cells.len(), 27);
        assert!(report.candidate_checks >= report.neighbors.len());
        assert!(sim.probe(500, 4.0).is_none());
    }

    #[test]
    fn restore_rejects_different_population() {
        let mut sim = seeded(NeighborStrategy::BruteForce);
        let mut snapshot = sim.snapshot();
        snapshot.boids.pop();
        assert!(sim.restore(&snapshot).is_err());
    }

    #[test]
    fn unscaled_policy_applies_raw_acceleration() {
        let boids = vec![Boid::new(0, Vec3::ZERO, Vec3::ZERO, 3.5, 0.05)];
        let config = FlockConfig::default().with_time_scaling(TimeScaling::Unscaled);
        let mut sim = FlockSimulation::from_boids(config, boids).expect("valid");

        sim.accumulate_forces(&RuleWeights::default());
        sim.boids[0].acceleration = Vec3::new(0.01, 0.0, 0.0);
        sim.integrate(0.5);

        assert!((sim.agents()[0].velocity - Vec3::new(0.01, 0.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn reference_rate_scales_with_delta() {
        let boids = vec![Boid::new(0, Vec3::ZERO, Vec3::ZERO, 3.5, 0.05)];
        let config = FlockConfig::default()
            .with_time_scaling(TimeScaling::ReferenceRate { fps: 60.0 });
        let mut sim = FlockSimulation::from_boids(config, boids).expect("valid");

        sim.boids[0].acceleration = Vec3::new(0.01, 0.0, 0.0);
        sim.integrate(1.0 / 30.0);

        assert!((sim.agents()[0].velocity.x - 0.02).abs() < 1e-6);
    }
}
