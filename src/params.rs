/*
 * Simulation Parameters Module
 *
 * This module defines the configuration consumed by the flock: the rule
 * weights that may be swapped between ticks, the domain bounds, the choice
 * of neighbor search strategy and the time scaling policy. Everything except
 * the weights is fixed once a simulation has been constructed.
 */

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::FlockError;
use crate::spatial_grid;

// Weights for each steering rule plus the two perception thresholds.
// A weight of 0 disables its rule from the next tick on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RuleWeights {
    pub cohesion: f32,
    pub separation: f32,
    pub alignment: f32,
    pub containment: f32,
    pub neighbor_radius: f32,
    pub separation_distance: f32,
}

impl Default for RuleWeights {
    fn default() -> Self {
        Self {
            cohesion: 1.0,
            separation: 1.5,
            alignment: 1.0,
            containment: 2.5,
            neighbor_radius: 3.5,
            separation_distance: 1.5,
        }
    }
}

impl RuleWeights {
    // Only the named rule enabled, everything else zeroed
    pub fn only_separation(self) -> Self {
        Self {
            cohesion: 0.0,
            alignment: 0.0,
            containment: 0.0,
            ..self
        }
    }

    pub fn validate(&self) -> Result<(), FlockError> {
        check_radius("neighbor_radius", self.neighbor_radius)?;
        check_radius("separation_distance", self.separation_distance)?;

        let weights = [self.cohesion, self.separation, self.alignment, self.containment];
        if weights.iter().any(|w| !w.is_finite()) {
            return Err(FlockError::InvalidConfig("rule weights must be finite"));
        }

        Ok(())
    }

    /// The wider of the two perception bands.
    #[inline]
    pub fn max_radius(&self) -> f32 {
        self.neighbor_radius.max(self.separation_distance)
    }
}

fn check_radius(name: &'static str, value: f32) -> Result<(), FlockError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(FlockError::InvalidRadius { name, value })
    }
}

/// Full extents of the centered simulation box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Bounds {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn extents(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    #[inline]
    pub fn half_extents(&self) -> Vec3 {
        self.extents() * 0.5
    }

    #[inline]
    pub fn min(&self) -> Vec3 {
        -self.half_extents()
    }

    #[inline]
    pub fn max(&self) -> Vec3 {
        self.half_extents()
    }

    pub fn validate(&self) -> Result<(), FlockError> {
        let ok = [self.x, self.y, self.z]
            .iter()
            .all(|v| v.is_finite() && *v > 0.0);
        if ok {
            Ok(())
        } else {
            Err(FlockError::InvalidBounds {
                x: self.x,
                y: self.y,
                z: self.z,
            })
        }
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::new(20.0, 12.0, 20.0)
    }
}

// How neighbors are discovered each tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum NeighborStrategy {
    BruteForce,
    Grid { cell_size: f32 },
}

impl Default for NeighborStrategy {
    fn default() -> Self {
        NeighborStrategy::BruteForce
    }
}

/// Policy for converting accumulated steering into a per-tick velocity change.
///
/// Rule constants are tuned for a 60 Hz reference rate; `ReferenceRate`
/// rescales acceleration by `dt * fps` so the flock behaves the same at any
/// frame rate. `Unscaled` applies the raw acceleration once per tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TimeScaling {
    ReferenceRate { fps: f32 },
    Unscaled,
}

impl Default for TimeScaling {
    fn default() -> Self {
        TimeScaling::ReferenceRate {
            fps: crate::REFERENCE_FPS,
        }
    }
}

impl TimeScaling {
    #[inline]
    pub fn factor(&self, dt: f32) -> f32 {
        match *self {
            TimeScaling::ReferenceRate { fps } => dt * fps,
            TimeScaling::Unscaled => 1.0,
        }
    }
}

// Construction-time configuration for a flock
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlockConfig {
    pub num_boids: usize,
    pub bounds: Bounds,
    pub weights: RuleWeights,
    pub strategy: NeighborStrategy,
    pub max_speed: f32,
    pub max_force: f32,
    pub time_scaling: TimeScaling,
    pub enable_parallel: bool,
    pub rng_seed: Option<u64>,
}

impl Default for FlockConfig {
    fn default() -> Self {
        Self {
            num_boids: 50,
            bounds: Bounds::default(),
            weights: RuleWeights::default(),
            strategy: NeighborStrategy::default(),
            max_speed: 3.5,
            max_force: 0.05,
            time_scaling: TimeScaling::default(),
            enable_parallel: false,
            rng_seed: None,
        }
    }
}

impl FlockConfig {
    pub fn with_num_boids(mut self, num_boids: usize) -> Self {
        self.num_boids = num_boids;
        self
    }

    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn with_weights(mut self, weights: RuleWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_strategy(mut self, strategy: NeighborStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_time_scaling(mut self, time_scaling: TimeScaling) -> Self {
        self.time_scaling = time_scaling;
        self
    }

    pub fn with_parallel(mut self, enable_parallel: bool) -> Self {
        self.enable_parallel = enable_parallel;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    // Reject anything that would later surface as NaNs or an empty flock
    pub fn validate(&self) -> Result<(), FlockError> {
        if self.num_boids == 0 {
            return Err(FlockError::EmptyPopulation);
        }

        self.bounds.validate()?;
        self.weights.validate()?;

        if let NeighborStrategy::Grid { cell_size } = self.strategy {
            if !(cell_size.is_finite() && cell_size > 0.0) {
                return Err(FlockError::InvalidCellSize(cell_size));
            }
            spatial_grid::query_reach(cell_size, self.weights.max_radius())?;
        }

        if !(self.max_speed.is_finite() && self.max_speed >= 0.0) {
            return Err(FlockError::InvalidConfig("max_speed must be non-negative and finite"));
        }
        if !(self.max_force.is_finite() && self.max_force >= 0.0) {
            return Err(FlockError::InvalidConfig("max_force must be non-negative and finite"));
        }

        if let TimeScaling::ReferenceRate { fps } = self.time_scaling {
            if !(fps.is_finite() && fps > 0.0) {
                return Err(FlockError::InvalidConfig("reference fps must be positive and finite"));
            }
        }

        Ok(())
    }

    // Get parameter ranges for UI sliders
    pub fn get_num_boids_range() -> std::ops::RangeInclusive<usize> {
        1..=5000
    }

    pub fn get_weight_range() -> std::ops::RangeInclusive<f32> {
        0.0..=5.0
    }

    pub fn get_radius_range() -> std::ops::RangeInclusive<f32> {
        0.5..=10.0
    }

    pub fn get_cell_size_range() -> std::ops::RangeInclusive<f32> {
        0.5..=15.0
    }
}
