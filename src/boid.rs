/*
 * Boid Module
 *
 * This module defines the Boid struct and its steering behaviour.
 * Each boid follows four rules:
 * 1. Separation: Avoid crowding neighbors
 * 2. Alignment: Steer towards the average heading of neighbors
 * 3. Cohesion: Steer towards the average position of neighbors
 * 4. Containment: Turn back before leaving the simulation box
 *
 * Force computation only reads state; integration happens in `update`.
 */

use glam::{Quat, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::params::{Bounds, RuleWeights};
use crate::{CONTAINMENT_MARGIN, ORIENTATION_EPSILON_SQ};

// Weighted forces and neighbor sets from the last call to `flock`.
// Inspection only, never read back by the physics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForceSnapshot {
    pub cohesion: Vec3,
    pub alignment: Vec3,
    pub separation: Vec3,
    pub containment: Vec3,
    pub neighbors: Vec<usize>,
    pub separation_neighbors: Vec<usize>,
}

impl ForceSnapshot {
    #[inline]
    pub fn total(&self) -> Vec3 {
        self.cohesion + self.alignment + self.separation + self.containment
    }
}

/// Pose handed to whatever draws the flock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentTransform {
    pub id: usize,
    pub position: Vec3,
    pub orientation: Quat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Boid {
    pub id: usize,
    pub position: Vec3,
    pub velocity: Vec3,
    pub acceleration: Vec3,
    pub max_speed: f32,
    pub max_force: f32,
    pub orientation: Quat,
    #[serde(skip)]
    pub last_forces: Option<ForceSnapshot>,
}

impl Boid {
    pub fn new(id: usize, position: Vec3, velocity: Vec3, max_speed: f32, max_force: f32) -> Self {
        let mut boid = Self {
            id,
            position,
            velocity,
            acceleration: Vec3::ZERO,
            max_speed,
            max_force,
            orientation: Quat::IDENTITY,
            last_forces: None,
        };
        boid.refresh_orientation();
        boid
    }

    // Spawn somewhere inside 90% of the box, heading in a random direction
    pub fn random<R: Rng + ?Sized>(
        id: usize,
        bounds: &Bounds,
        max_speed: f32,
        max_force: f32,
        rng: &mut R,
    ) -> Self {
        let spread = bounds.half_extents() * 0.9;
        let position = Vec3::new(
            rng.gen_range(-spread.x..=spread.x),
            rng.gen_range(-spread.y..=spread.y),
            rng.gen_range(-spread.z..=spread.z),
        );

        let speed: f32 = rng.gen_range(2.0..4.0);
        let velocity = random_direction(rng) * speed;

        Self::new(id, position, velocity, max_speed, max_force)
    }

    // Apply a force to the boid
    #[inline]
    pub fn apply_force(&mut self, force: Vec3) {
        self.acceleration += force;
    }

    // Integrate one tick: velocity from acceleration, position from velocity
    pub fn update(&mut self, delta_time: f32) {
        self.velocity += self.acceleration;
        self.velocity = self.velocity.clamp_length_max(self.max_speed);

        self.position += self.velocity * delta_time;

        self.acceleration = Vec3::ZERO;
        self.refresh_orientation();
    }

    // Face along the velocity; keep the last heading while nearly stationary
    fn refresh_orientation(&mut self) {
        if self.velocity.length_squared() > ORIENTATION_EPSILON_SQ {
            self.orientation = Quat::from_rotation_arc(Vec3::Z, self.velocity.normalize());
        }
    }

    pub fn transform(&self) -> AgentTransform {
        AgentTransform {
            id: self.id,
            position: self.position,
            orientation: self.orientation,
        }
    }

    // Reynolds steering: desired velocity towards target minus current velocity
    pub fn steer(&self, target: Vec3) -> Vec3 {
        let desired = (target - self.position).normalize_or_zero() * self.max_speed;
        (desired - self.velocity).clamp_length_max(self.max_force)
    }

    // Calculate separation force (avoid crowding neighbors)
    pub fn separation(&self, boids: &[Boid], close_neighbors: &[usize]) -> Vec3 {
        if close_neighbors.is_empty() {
            return Vec3::ZERO;
        }

        let mut steering = Vec3::ZERO;
        for &i in close_neighbors {
            let diff = self.position - boids[i].position;
            let d = diff.length();
            // Coincident boids contribute nothing rather than NaN
            let divisor = if d > 0.0 { d } else { 1.0 };
            steering += diff.normalize_or_zero() / divisor;
        }

        (steering / close_neighbors.len() as f32).clamp_length_max(self.max_force)
    }

    // Calculate alignment force (steer towards average heading of neighbors)
    pub fn alignment(&self, boids: &[Boid], neighbors: &[usize]) -> Vec3 {
        if neighbors.is_empty() {
            return Vec3::ZERO;
        }

        let sum: Vec3 = neighbors.iter().map(|&i| boids[i].velocity).sum();
        (sum / neighbors.len() as f32).clamp_length_max(self.max_force)
    }

    // Calculate cohesion force (steer towards average position of neighbors)
    pub fn cohesion(&self, boids: &[Boid], neighbors: &[usize]) -> Vec3 {
        if neighbors.is_empty() {
            return Vec3::ZERO;
        }

        let sum: Vec3 = neighbors.iter().map(|&i| boids[i].position).sum();
        self.steer(sum / neighbors.len() as f32)
    }

    /// Unnormalized push-back direction: `+1` near a lower face, `-1` near an
    /// upper face, `0` otherwise, per axis.
    pub fn containment_direction(&self, bounds: &Bounds) -> Vec3 {
        let min = bounds.min();
        let max = bounds.max();

        let axis = |p: f32, lo: f32, hi: f32| {
            if p <= lo + CONTAINMENT_MARGIN {
                1.0
            } else if p >= hi - CONTAINMENT_MARGIN {
                -1.0
            } else {
                0.0
            }
        };

        Vec3::new(
            axis(self.position.x, min.x, max.x),
            axis(self.position.y, min.y, max.y),
            axis(self.position.z, min.z, max.z),
        )
    }

    pub fn boundary_containment(&self, bounds: &Bounds) -> Vec3 {
        self.containment_direction(bounds).normalize_or_zero() * self.max_force
    }

    /// Weighted sum of all rules for this tick, plus the snapshot describing it.
    ///
    /// `neighbors` and `close_neighbors` are indices into `boids` that have
    /// already been filtered by exact distance.
    pub fn compute_flock(
        &self,
        boids: &[Boid],
        neighbors: &[usize],
        close_neighbors: &[usize],
        weights: &RuleWeights,
        bounds: &Bounds,
    ) -> (Vec3, ForceSnapshot) {
        let snapshot = ForceSnapshot {
            separation: self.separation(boids, close_neighbors) * weights.separation,
            alignment: self.alignment(boids, neighbors) * weights.alignment,
            cohesion: self.cohesion(boids, neighbors) * weights.cohesion,
            containment: self.boundary_containment(bounds) * weights.containment,
            neighbors: neighbors.to_vec(),
            separation_neighbors: close_neighbors.to_vec(),
        };

        (snapshot.total(), snapshot)
    }

    // Accumulate this tick's steering; `boids` is the tick-start population
    pub fn flock(
        &mut self,
        boids: &[Boid],
        neighbors: &[usize],
        close_neighbors: &[usize],
        weights: &RuleWeights,
        bounds: &Bounds,
    ) {
        let (force, snapshot) = self.compute_flock(boids, neighbors, close_neighbors, weights, bounds);
        self.apply_force(force);
        self.last_forces = Some(snapshot);
    }
}

// Uniform direction on the unit sphere by rejection sampling the unit ball
fn random_direction<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    loop {
        let candidate = Vec3::new(
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
        );
        let length_squared = candidate.length_squared();
        if length_squared > 1e-6 && length_squared <= 1.0 {
            return candidate / length_squared.sqrt();
        }
    }
}
