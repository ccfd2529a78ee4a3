/*
 * Camera Module
 *
 * Top-down view of the flock box. World x maps to screen x and world z to
 * screen y (flipped so +z points down the screen); height is dropped and
 * only used for shading. Supports panning and cursor-anchored zoom.
 */

use nannou::prelude::*;

pub struct Camera {
    pub position: Vec2,
    pub zoom: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
    pub is_dragging: bool,
    pub last_cursor_pos: Vec2,
}

impl Camera {
    // `zoom` is screen pixels per world unit
    pub fn new(zoom: f32) -> Self {
        Self {
            position: Vec2::ZERO,
            zoom,
            min_zoom: 2.0,
            max_zoom: 200.0,
            is_dragging: false,
            last_cursor_pos: Vec2::ZERO,
        }
    }

    // Fit a box of the given x/z extents into the window with some margin
    pub fn fit(extent_x: f32, extent_z: f32, window_rect: Rect) -> Self {
        let zoom = (window_rect.w() / extent_x).min(window_rect.h() / extent_z) * 0.8;
        Self::new(zoom)
    }

    // Project a world position onto the ground plane
    #[inline]
    pub fn project(x: f32, z: f32) -> Vec2 {
        vec2(x, -z)
    }

    pub fn world_to_screen(&self, x: f32, z: f32, window_rect: Rect) -> Vec2 {
        (Self::project(x, z) - self.position) * self.zoom + window_rect.xy()
    }

    // Zoom around the cursor so the point under it stays put
    pub fn zoom(&mut self, scroll_delta: Vec2, cursor_position: Vec2, window_rect: Rect) {
        let anchor = (cursor_position - window_rect.xy()) / self.zoom + self.position;

        let zoom_factor = 1.0 + scroll_delta.y * 0.1;
        self.zoom = (self.zoom * zoom_factor).clamp(self.min_zoom, self.max_zoom);

        let after = (cursor_position - window_rect.xy()) / self.zoom + self.position;
        self.position += anchor - after;
    }

    pub fn start_drag(&mut self, position: Vec2) {
        self.last_cursor_pos = position;
        self.is_dragging = true;
    }

    pub fn drag(&mut self, position: Vec2) {
        if self.is_dragging {
            let delta = position - self.last_cursor_pos;
            self.position -= delta / self.zoom;
            self.last_cursor_pos = position;
        }
    }

    pub fn end_drag(&mut self) {
        self.is_dragging = false;
    }
}
