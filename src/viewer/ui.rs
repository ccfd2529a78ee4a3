/*
 * UI Module
 *
 * Control panel drawn with nannou_egui. Rule toggles zero a rule's weight
 * without touching the flock; the sliders edit the weights handed to the
 * next tick. Changing the population or the search strategy builds a new
 * flock, since those are fixed for a simulation's lifetime.
 */

use std::time::Duration;

use nannou_egui::{egui, Egui};

use flock_grid::{FlockConfig, NeighborStrategy, ProbeReport, RuleWeights, TickStats};

// Frame timing shown in the panel
#[derive(Default)]
pub struct DebugInfo {
    pub fps: f32,
    pub frame_time: Duration,
}

// Everything the panel can edit
pub struct ViewerSettings {
    pub num_boids: usize,
    pub use_grid: bool,
    pub cell_size: f32,
    pub enable_parallel: bool,
    pub weights: RuleWeights,
    pub separation_on: bool,
    pub alignment_on: bool,
    pub cohesion_on: bool,
    pub containment_on: bool,
    pub paused: bool,
    pub show_grid_cells: bool,
    pub show_forces: bool,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        let config = FlockConfig::default();
        Self {
            num_boids: config.num_boids,
            use_grid: false,
            cell_size: 5.0,
            enable_parallel: config.enable_parallel,
            weights: config.weights,
            separation_on: true,
            alignment_on: true,
            cohesion_on: true,
            containment_on: true,
            paused: false,
            show_grid_cells: true,
            show_forces: true,
        }
    }
}

impl ViewerSettings {
    // Slider weights with toggled-off rules zeroed
    pub fn active_weights(&self) -> RuleWeights {
        let on = |enabled: bool, weight: f32| if enabled { weight } else { 0.0 };
        RuleWeights {
            separation: on(self.separation_on, self.weights.separation),
            alignment: on(self.alignment_on, self.weights.alignment),
            cohesion: on(self.cohesion_on, self.weights.cohesion),
            containment: on(self.containment_on, self.weights.containment),
            ..self.weights
        }
    }

    pub fn to_config(&self) -> FlockConfig {
        let strategy = if self.use_grid {
            NeighborStrategy::Grid {
                cell_size: self.cell_size,
            }
        } else {
            NeighborStrategy::BruteForce
        };

        FlockConfig::default()
            .with_num_boids(self.num_boids)
            .with_strategy(strategy)
            .with_weights(self.weights)
            .with_parallel(self.enable_parallel)
    }
}

// Update the panel; returns true when the flock has to be rebuilt
pub fn update_ui(
    egui: &mut Egui,
    settings: &mut ViewerSettings,
    debug_info: &DebugInfo,
    stats: &TickStats,
    probe: Option<&ProbeReport>,
    selected: Option<usize>,
) -> bool {
    let mut rebuild = false;
    let ctx = egui.begin_frame();

    egui::Window::new("Flock Controls")
        .default_pos([10.0, 10.0])
        .show(&ctx, |ui| {
            ui.collapsing("Rules", |ui| {
                ui.horizontal(|ui| {
                    ui.checkbox(&mut settings.separation_on, "Separation");
                    ui.checkbox(&mut settings.alignment_on, "Alignment");
                    ui.checkbox(&mut settings.cohesion_on, "Cohesion");
                    ui.checkbox(&mut settings.containment_on, "Containment");
                });

                let weights = &mut settings.weights;
                ui.add(egui::Slider::new(&mut weights.separation, FlockConfig::get_weight_range()).text("Separation Weight"));
                ui.add(egui::Slider::new(&mut weights.alignment, FlockConfig::get_weight_range()).text("Alignment Weight"));
                ui.add(egui::Slider::new(&mut weights.cohesion, FlockConfig::get_weight_range()).text("Cohesion Weight"));
                ui.add(egui::Slider::new(&mut weights.containment, FlockConfig::get_weight_range()).text("Containment Weight"));
                ui.add(egui::Slider::new(&mut weights.neighbor_radius, FlockConfig::get_radius_range()).text("Neighbor Radius"));
                ui.add(egui::Slider::new(&mut weights.separation_distance, FlockConfig::get_radius_range()).text("Separation Distance"));
            });

            ui.collapsing("Flock", |ui| {
                rebuild |= ui
                    .add(egui::Slider::new(&mut settings.num_boids, FlockConfig::get_num_boids_range()).text("Number of Boids"))
                    .changed();
                rebuild |= ui.checkbox(&mut settings.use_grid, "Use Spatial Grid").changed();
                if settings.use_grid {
                    rebuild |= ui
                        .add(egui::Slider::new(&mut settings.cell_size, FlockConfig::get_cell_size_range()).text("Cell Size"))
                        .changed();
                }
                rebuild |= ui.checkbox(&mut settings.enable_parallel, "Enable Parallel Processing").changed();

                if ui.button("Reset Boids").clicked() {
                    rebuild = true;
                }
            });

            ui.collapsing("Neighbor Checks", |ui| {
                if let Some(probe) = probe {
                    ui.label(format!("Probing boid {}", probe.index));
                    ui.label(probe.summary());
                }

                ui.separator();
                ui.label(format!("Tick: {}", stats.tick));
                ui.label(format!("Checks this tick: {}", stats.candidates_checked));
                ui.label(format!("Brute force would need: {}", stats.brute_force_checks()));
                ui.label(format!("Average per query: {:.1}", stats.average_candidates()));
            });

            ui.separator();
            ui.label(format!("FPS: {:.1}", debug_info.fps));
            ui.label(format!("Frame time: {:.2} ms", debug_info.frame_time.as_secs_f64() * 1000.0));
            match selected {
                Some(index) => ui.label(format!("Selected boid: {index}")),
                None => ui.label("Click a boid to see forces."),
            };

            ui.checkbox(&mut settings.show_forces, "Show Forces");
            ui.checkbox(&mut settings.show_grid_cells, "Show Visited Cells");
            ui.checkbox(&mut settings.paused, "Pause Simulation");
        });

    rebuild
}
