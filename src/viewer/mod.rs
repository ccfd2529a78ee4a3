/*
 * Viewer Module Definitions
 *
 * Desktop presentation of the flock built on nannou. Nothing in here feeds
 * back into the simulation except the weights handed to each tick.
 */

pub mod app;
pub mod camera;
pub mod input;
pub mod renderer;
pub mod ui;
