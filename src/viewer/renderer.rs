/*
 * Renderer Module
 *
 * Draws the flock from above: the domain box, the cells visited by the
 * current probe, every boid as a triangle pointing along its velocity
 * (shaded by height) and, for the selected boid, the forces it felt on the
 * last tick.
 */

use std::collections::HashSet;

use nannou::prelude::*;

use flock_grid::Boid;

use super::app::Model;
use super::camera::Camera;

const BOID_SIZE: f32 = 0.25;

// Render the model
pub fn view(app: &App, model: &Model, frame: Frame) {
    let draw = app.draw();
    draw.background().color(rgb(0.94, 0.94, 0.94));

    let window_rect = app.window_rect();
    let bounds = model.sim.config().bounds;

    // Domain outline
    draw.rect()
        .xy(model.camera.world_to_screen(0.0, 0.0, window_rect))
        .w_h(bounds.x * model.camera.zoom, bounds.z * model.camera.zoom)
        .no_fill()
        .stroke_weight(1.0)
        .stroke(rgba(0.6, 0.6, 0.6, 1.0));

    if model.settings.show_grid_cells {
        draw_visited_cells(&draw, model, window_rect);
    }

    for boid in model.sim.agents() {
        let selected = model.selected_boid_index == Some(boid.id);
        draw_boid(&draw, boid, model, window_rect, selected);
    }

    if model.settings.show_forces {
        draw_probe_neighbors(&draw, model, window_rect);
        if let Some(index) = model.selected_boid_index {
            draw_forces(&draw, model, index, window_rect);
        }
    }

    draw.to_frame(app, &frame).unwrap();
    model.egui.draw_to_frame(&frame).unwrap();
}

fn draw_boid(draw: &Draw, boid: &Boid, model: &Model, window_rect: Rect, selected: bool) {
    let screen_pos = model.camera.world_to_screen(boid.position.x, boid.position.z, window_rect);
    let heading = Camera::project(boid.velocity.x, boid.velocity.z);
    let angle = heading.y.atan2(heading.x);

    let size = BOID_SIZE * model.camera.zoom;
    let points = [
        pt2(size, 0.0),
        pt2(-size, size / 2.0),
        pt2(-size, -size / 2.0),
    ];

    // Higher boids are drawn lighter
    let half_height = model.sim.config().bounds.y / 2.0;
    let height = ((boid.position.y + half_height) / (2.0 * half_height)).clamp(0.0, 1.0);
    let color = if selected {
        rgba(1.0, 0.27, 0.0, 1.0)
    } else {
        rgba(0.2, 0.4 + 0.3 * height, 0.6 + 0.3 * height, 1.0)
    };

    draw.polygon()
        .color(color)
        .points(points.iter().cloned())
        .xy(screen_pos)
        .rotate(angle);
}

// Columns of cells the probe looked at, collapsed onto the ground plane
fn draw_visited_cells(draw: &Draw, model: &Model, window_rect: Rect) {
    let (Some(probe), Some(grid)) = (model.probe.as_ref(), model.sim.finder().grid()) else {
        return;
    };

    let mut columns = HashSet::new();
    for cell in &probe.visited_cells {
        if !columns.insert((cell.x, cell.z)) {
            continue;
        }

        let center = grid.cell_center(*cell);
        let side = grid.cell_size * model.camera.zoom;
        draw.rect()
            .xy(model.camera.world_to_screen(center.x, center.z, window_rect))
            .w_h(side, side)
            .color(rgba(0.0, 1.0, 0.0, 0.08))
            .stroke_weight(1.0)
            .stroke(rgba(0.0, 0.6, 0.0, 0.4));
    }
}

// Green lines from the probed boid to its true neighbors
fn draw_probe_neighbors(draw: &Draw, model: &Model, window_rect: Rect) {
    let Some(probe) = model.probe.as_ref() else {
        return;
    };

    let agents = model.sim.agents();
    let origin = model.camera.world_to_screen(probe.origin.x, probe.origin.z, window_rect);
    for &other in &probe.neighbors {
        let p = agents[other].position;
        draw.line()
            .start(origin)
            .end(model.camera.world_to_screen(p.x, p.z, window_rect))
            .weight(1.0)
            .color(rgba(0.0, 0.8, 0.0, 0.7));
    }
}

// Cohesion arrow to the center of mass, alignment arrow along the average
// heading, red lines to everyone it is separating from
fn draw_forces(draw: &Draw, model: &Model, index: usize, window_rect: Rect) {
    let Some(forces) = model.sim.last_forces(index) else {
        return;
    };

    let agents = model.sim.agents();
    let boid = &agents[index];
    let origin = model.camera.world_to_screen(boid.position.x, boid.position.z, window_rect);

    if !forces.neighbors.is_empty() {
        let count = forces.neighbors.len() as f32;
        let (mut cx, mut cz, mut vx, mut vz) = (0.0, 0.0, 0.0, 0.0);
        for &i in &forces.neighbors {
            cx += agents[i].position.x;
            cz += agents[i].position.z;
            vx += agents[i].velocity.x;
            vz += agents[i].velocity.z;
        }

        if forces.cohesion.length_squared() > 0.0 {
            draw.arrow()
                .start(origin)
                .end(model.camera.world_to_screen(cx / count, cz / count, window_rect))
                .color(BLUE)
                .stroke_weight(2.0);
        }

        if forces.alignment.length_squared() > 0.0 {
            let heading = Camera::project(vx, vz).normalize_or_zero() * 2.5 * model.camera.zoom;
            draw.arrow()
                .start(origin)
                .end(origin + heading)
                .color(GREEN)
                .stroke_weight(2.0);
        }
    }

    if forces.separation.length_squared() > 0.0 {
        for &i in &forces.separation_neighbors {
            let p = agents[i].position;
            draw.line()
                .start(origin)
                .end(model.camera.world_to_screen(p.x, p.z, window_rect))
                .weight(1.5)
                .color(RED);
        }
    }
}
