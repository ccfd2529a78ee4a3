/*
 * Boid Flocking Simulation - Module Definitions
 *
 * This file defines the module structure of the headless flocking core.
 * The desktop viewer lives in the `flock-viewer` binary and only consumes
 * what is exported here.
 */

// Re-export key components for easier access
pub use boid::{AgentTransform, Boid, ForceSnapshot};
pub use debug::{ProbeReport, TickStats};
pub use error::FlockError;
pub use neighbors::{filter_within, BruteForce, GridFinder, NeighborFinder, NeighborQuery};
pub use params::{Bounds, FlockConfig, NeighborStrategy, RuleWeights, TimeScaling};
pub use simulation::{FlockSimulation, FlockSnapshot};
pub use spatial_grid::{CellCoord, SpatialGrid};

// Define modules
pub mod boid;
pub mod debug;
pub mod error;
pub mod neighbors;
pub mod params;
pub mod physics;
pub mod simulation;
pub mod spatial_grid;

// Constants
pub const CONTAINMENT_MARGIN: f32 = 3.0;
pub const ORIENTATION_EPSILON_SQ: f32 = 0.001;
pub const REFERENCE_FPS: f32 = 60.0;
