/*
 * Error Module
 *
 * Construction-time failures for the flock. A tick itself cannot fail, so
 * every variant here is raised while validating configuration (or a time
 * step handed to `try_step`).
 */

use thiserror::Error;

/// Errors emitted while building or driving a flock simulation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FlockError {
    /// A population of zero agents was requested.
    #[error("population must contain at least one agent")]
    EmptyPopulation,

    /// Grid cell size was zero, negative or not finite.
    #[error("cell size must be positive and finite, got {0}")]
    InvalidCellSize(f32),

    /// A perception radius was negative or not finite.
    #[error("{name} must be non-negative and finite, got {value}")]
    InvalidRadius { name: &'static str, value: f32 },

    /// Domain bounds were not strictly positive finite extents.
    #[error("bounds must be positive and finite, got ({x}, {y}, {z})")]
    InvalidBounds { x: f32, y: f32, z: f32 },

    /// Perception radius spans more grid cells than a query may walk.
    #[error("radius {radius} spans more than {max_cells} cells of size {cell_size}")]
    QueryTooWide {
        radius: f32,
        cell_size: f32,
        max_cells: u32,
    },

    /// Any other configuration value that cannot be used.
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),

    /// `try_step` was handed a negative or non-finite delta.
    #[error("time step must be non-negative and finite, got {0}")]
    InvalidTimeStep(f32),
}
