/*
 * Input Module
 *
 * Mouse handling for the viewer:
 * - Left click on a boid selects it for force inspection
 * - Left drag elsewhere pans the camera
 * - Wheel zooms around the cursor
 */

use nannou::prelude::*;
use nannou::winit::event::{MouseButton, MouseScrollDelta, TouchPhase};

use super::app::Model;

// Click tolerance around a boid, in screen pixels
const SELECTION_RADIUS: f32 = 12.0;

pub fn mouse_moved(_app: &App, model: &mut Model, pos: Point2) {
    if model.camera.is_dragging {
        model.camera.drag(pos);
    }
    model.mouse_position = pos;
}

pub fn mouse_pressed(app: &App, model: &mut Model, button: MouseButton) {
    if button != MouseButton::Left || model.egui.ctx().is_pointer_over_area() {
        return;
    }

    let window_rect = app.window_rect();
    let clicked = pick_boid(model, window_rect);

    if clicked.is_some() {
        model.selected_boid_index = clicked;
    } else {
        model.selected_boid_index = None;
        model.camera.start_drag(model.mouse_position);
    }
}

// Closest boid under the cursor in screen space
fn pick_boid(model: &Model, window_rect: Rect) -> Option<usize> {
    let max_distance_sq = SELECTION_RADIUS * SELECTION_RADIUS;

    model
        .sim
        .agents()
        .iter()
        .map(|boid| {
            let screen = model
                .camera
                .world_to_screen(boid.position.x, boid.position.z, window_rect);
            (boid.id, screen.distance_squared(model.mouse_position))
        })
        .filter(|&(_, d)| d <= max_distance_sq)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(id, _)| id)
}

pub fn mouse_released(_app: &App, model: &mut Model, button: MouseButton) {
    if button == MouseButton::Left {
        model.camera.end_drag();
    }
}

pub fn mouse_wheel(app: &App, model: &mut Model, delta: MouseScrollDelta, _phase: TouchPhase) {
    if model.egui.ctx().is_pointer_over_area() {
        return;
    }

    let window_rect = app.window_rect();
    match delta {
        MouseScrollDelta::LineDelta(x, y) => {
            model.camera.zoom(vec2(x, y), model.mouse_position, window_rect);
        }
        MouseScrollDelta::PixelDelta(pos) => {
            let scroll = vec2(pos.x as f32, pos.y as f32) * 0.01;
            model.camera.zoom(scroll, model.mouse_position, window_rect);
        }
    }
}

// Handle raw window events for egui
pub fn raw_window_event(_app: &App, model: &mut Model, event: &nannou::winit::event::WindowEvent) {
    model.egui.handle_raw_event(event);
}
