//! Pan/zoom camera mapping screen pixels to world tile coordinates.
//!
//! `scale` is pixels per world unit and `offset` is the screen position of the
//! world origin, so `screen = world * scale + offset`.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub min_scale: f64,
    pub max_scale: f64,
    pub initial_scale: f64,
    /// Multiplicative zoom applied per wheel notch.
    pub zoom_step: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.25,
            max_scale: 40.0,
            initial_scale: 4.0,
            zoom_step: 1.2,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Camera {
    scale: f64,
    offset_x: f64,
    offset_y: f64,
    min_scale: f64,
    max_scale: f64,
    drag_anchor: Option<(f64, f64)>,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(&CameraConfig::default())
    }
}

impl Camera {
    pub fn new(config: &CameraConfig) -> Self {
        let min_scale = config.min_scale.min(config.max_scale);
        let max_scale = config.max_scale.max(config.min_scale);
        Self {
            scale: config.initial_scale.clamp(min_scale, max_scale),
            offset_x: 0.0,
            offset_y: 0.0,
            min_scale,
            max_scale,
            drag_anchor: None,
        }
    }

    /// Camera with an explicit state, scale clamped into the configured bounds.
    pub fn with_state(config: &CameraConfig, scale: f64, offset_x: f64, offset_y: f64) -> Self {
        let mut camera = Self::new(config);
        camera.scale = scale.clamp(camera.min_scale, camera.max_scale);
        camera.offset_x = offset_x;
        camera.offset_y = offset_y;
        camera
    }

    #[inline]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    #[inline]
    pub fn offset(&self) -> (f64, f64) {
        (self.offset_x, self.offset_y)
    }

    #[inline]
    pub fn scale_bounds(&self) -> (f64, f64) {
        (self.min_scale, self.max_scale)
    }

    #[inline]
    pub fn screen_to_world(&self, px: f64, py: f64) -> (f64, f64) {
        ((px - self.offset_x) / self.scale, (py - self.offset_y) / self.scale)
    }

    #[inline]
    pub fn world_to_screen(&self, wx: f64, wy: f64) -> (f64, f64) {
        (wx * self.scale + self.offset_x, wy * self.scale + self.offset_y)
    }

    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.offset_x += dx;
        self.offset_y += dy;
    }

    /// Zoom by `factor` keeping the world point under `(px, py)` fixed.
    /// Returns false when the scale is already pinned at a bound.
    pub fn zoom_at(&mut self, px: f64, py: f64, factor: f64) -> bool {
        if !factor.is_finite() || factor <= 0.0 {
            return false;
        }
        let old_scale = self.scale;
        let new_scale = (old_scale * factor).clamp(self.min_scale, self.max_scale);
        if new_scale == old_scale {
            return false;
        }

        // Use the ratio actually applied, not the requested factor.
        let applied = new_scale / old_scale;
        self.offset_x = px - (px - self.offset_x) * applied;
        self.offset_y = py - (py - self.offset_y) * applied;
        self.scale = new_scale;
        true
    }

    /// Place world point `(wx, wy)` at the centre of the viewport.
    pub fn center_on(&mut self, wx: f64, wy: f64, viewport: (usize, usize)) {
        self.offset_x = viewport.0 as f64 / 2.0 - wx * self.scale;
        self.offset_y = viewport.1 as f64 / 2.0 - wy * self.scale;
    }

    /// Scale so the whole world fits in the viewport, then centre it.
    pub fn fit(&mut self, world: (usize, usize), viewport: (usize, usize)) {
        if world.0 == 0 || world.1 == 0 {
            return;
        }
        let sx = viewport.0 as f64 / world.0 as f64;
        let sy = viewport.1 as f64 / world.1 as f64;
        self.scale = sx.min(sy).clamp(self.min_scale, self.max_scale);
        self.center_on(world.0 as f64 / 2.0, world.1 as f64 / 2.0, viewport);
    }

    pub fn begin_drag(&mut self, px: f64, py: f64) {
        self.drag_anchor = Some((px, py));
    }

    /// Pan by the cursor motion since the last drag position.
    pub fn drag_to(&mut self, px: f64, py: f64) -> bool {
        let Some((ax, ay)) = self.drag_anchor else {
            return false;
        };
        let dx = px - ax;
        let dy = py - ay;
        if dx.abs() <= f64::EPSILON && dy.abs() <= f64::EPSILON {
            return false;
        }
        self.pan(dx, dy);
        self.drag_anchor = Some((px, py));
        true
    }

    pub fn end_drag(&mut self) {
        self.drag_anchor = None;
    }

    #[inline]
    pub fn is_dragging(&self) -> bool {
        self.drag_anchor.is_some()
    }
}
