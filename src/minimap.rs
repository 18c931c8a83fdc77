//! Overview map: the cached raster squeezed into a small fixed canvas with an
//! outline of the region the main camera currently shows.

use crate::camera::Camera;
use crate::canvas::Canvas;
use crate::colorize::Rgb;

const VIEWPORT_COLOR: Rgb = [255, 255, 255];
const BORDER_COLOR: Rgb = [70, 70, 80];

/// Outline of the main viewport in minimap pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

pub struct Minimap {
    canvas: Canvas,
}

impl Minimap {
    pub fn new(width: usize, height: usize, background: Rgb) -> Self {
        Self {
            canvas: Canvas::new(width, height, background),
        }
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// Redraw from the raster and the current camera.
    ///
    /// `view_size` is the size of the main map canvas in pixels.
    pub fn draw(&mut self, raster: &Canvas, camera: &Camera, view_size: (usize, usize)) -> ViewportRect {
        downsample(raster, &mut self.canvas);

        let (mini_w, mini_h) = self.canvas.size();
        let rect = viewport_rect(camera, raster.size(), view_size, (mini_w, mini_h));
        self.canvas.stroke_rect(0.0, 0.0, mini_w as f64 - 1.0, mini_h as f64 - 1.0, BORDER_COLOR);
        self.canvas.stroke_rect(rect.x, rect.y, rect.width, rect.height, VIEWPORT_COLOR);
        rect
    }

    /// World coordinates under a minimap pixel.
    pub fn minimap_to_world(&self, mx: f64, my: f64, world_size: (usize, usize)) -> Option<(f64, f64)> {
        let (mini_w, mini_h) = self.canvas.size();
        if mx < 0.0 || my < 0.0 || mx >= mini_w as f64 || my >= mini_h as f64 {
            return None;
        }
        Some((
            mx / mini_w as f64 * world_size.0 as f64,
            my / mini_h as f64 * world_size.1 as f64,
        ))
    }
}

/// Nearest-neighbour downsample of `source` to fill `target`.
pub fn downsample(source: &Canvas, target: &mut Canvas) {
    let (src_w, src_h) = source.size();
    let (dst_w, dst_h) = target.size();
    if src_w == 0 || src_h == 0 || dst_w == 0 {
        return;
    }
    let src = source.pixels();
    let dst = target.pixels_mut();
    for my in 0..dst_h {
        let sy = (my * src_h / dst_h).min(src_h - 1);
        for mx in 0..dst_w {
            let sx = (mx * src_w / dst_w).min(src_w - 1);
            dst[my * dst_w + mx] = src[sy * src_w + sx];
        }
    }
}

pub fn viewport_rect(
    camera: &Camera,
    world_size: (usize, usize),
    view_size: (usize, usize),
    mini_size: (usize, usize),
) -> ViewportRect {
    let scale = camera.scale();
    let (offset_x, offset_y) = camera.offset();
    let world_w = world_size.0.max(1) as f64;
    let world_h = world_size.1.max(1) as f64;
    let mini_w = mini_size.0 as f64;
    let mini_h = mini_size.1 as f64;
    ViewportRect {
        x: (-offset_x / scale / world_w) * mini_w,
        y: (-offset_y / scale / world_h) * mini_h,
        width: (view_size.0 as f64 / scale / world_w) * mini_w,
        height: (view_size.1 as f64 / scale / world_h) * mini_h,
    }
}
