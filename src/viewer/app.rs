/*
 * Application Module
 *
 * Main model of the viewer: the flock, the panel settings and the camera.
 * Each frame the panel is updated, the flock is stepped once with the
 * active weights, and the selected (or first) boid is probed so the
 * "checks performed" counters stay current.
 */

use nannou::prelude::*;
use nannou_egui::Egui;
use tracing::warn;

use flock_grid::{FlockSimulation, ProbeReport};

use super::camera::Camera;
use super::input;
use super::renderer;
use super::ui::{self, DebugInfo, ViewerSettings};

// Longest frame fed to the physics; a stalled window should not fling boids
const MAX_FRAME_SECONDS: f32 = 0.1;

pub struct Model {
    pub sim: FlockSimulation,
    pub settings: ViewerSettings,
    pub egui: Egui,
    pub debug_info: DebugInfo,
    pub camera: Camera,
    pub mouse_position: Vec2,
    pub selected_boid_index: Option<usize>,
    pub probe: Option<ProbeReport>,
}

// Initialize the model
pub fn model(app: &App) -> Model {
    let window_id = app
        .new_window()
        .title("Boid Flocking: Brute Force vs Spatial Grid")
        .size(1280, 800)
        .view(renderer::view)
        .mouse_moved(input::mouse_moved)
        .mouse_pressed(input::mouse_pressed)
        .mouse_released(input::mouse_released)
        .mouse_wheel(input::mouse_wheel)
        .raw_event(input::raw_window_event)
        .build()
        .unwrap();

    let window = app.window(window_id).unwrap();
    let egui = Egui::from_window(&window);

    let settings = ViewerSettings::default();
    let config = settings.to_config();
    let camera = Camera::fit(config.bounds.x, config.bounds.z, window.rect());
    let sim = FlockSimulation::new(config).expect("default flock configuration is valid");

    Model {
        sim,
        settings,
        egui,
        debug_info: DebugInfo::default(),
        camera,
        mouse_position: Vec2::ZERO,
        selected_boid_index: None,
        probe: None,
    }
}

// Update the model
pub fn update(app: &App, model: &mut Model, update: Update) {
    model.debug_info.fps = app.fps();
    model.debug_info.frame_time = update.since_last;

    let stats = model.sim.last_stats();
    let rebuild = ui::update_ui(
        &mut model.egui,
        &mut model.settings,
        &model.debug_info,
        &stats,
        model.probe.as_ref(),
        model.selected_boid_index,
    );

    if rebuild {
        rebuild_flock(model);
    }

    if !model.settings.paused {
        let dt = update.since_last.as_secs_f32().min(MAX_FRAME_SECONDS);
        let weights = model.settings.active_weights();
        model.sim.step_with(dt, &weights);
    }

    let probe_index = model.selected_boid_index.unwrap_or(0);
    let radius = model.settings.weights.neighbor_radius;
    model.probe = model.sim.probe(probe_index, radius);
}

// Population and strategy are fixed per flock, so changing them starts over
fn rebuild_flock(model: &mut Model) {
    match FlockSimulation::new(model.settings.to_config()) {
        Ok(sim) => {
            model.sim = sim;
            model.selected_boid_index = None;
            model.probe = None;
        }
        Err(err) => warn!(%err, "keeping the current flock"),
    }
}
