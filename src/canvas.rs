//! Software 2D drawing surface.
//!
//! Pixels are stored as `0x00RRGGBB`, the layout minifb expects, so a canvas
//! can be handed straight to the window. All drawing is clipped.

use image::{ImageBuffer, Rgb as ImageRgb, RgbImage};

use crate::colorize::Rgb;

pub const GLYPH_WIDTH: usize = 5;
pub const GLYPH_HEIGHT: usize = 7;
const GLYPH_ADVANCE: usize = GLYPH_WIDTH + 1;

#[inline]
pub fn pack(color: Rgb) -> u32 {
    ((color[0] as u32) << 16) | ((color[1] as u32) << 8) | color[2] as u32
}

#[inline]
pub fn unpack(pixel: u32) -> Rgb {
    [(pixel >> 16) as u8, (pixel >> 8) as u8, pixel as u8]
}

#[derive(Clone, Debug, PartialEq)]
pub struct Canvas {
    width: usize,
    height: usize,
    pixels: Vec<u32>,
}

impl Canvas {
    pub fn new(width: usize, height: usize, background: Rgb) -> Self {
        Self {
            width,
            height,
            pixels: vec![pack(background); width * height],
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u32] {
        &mut self.pixels
    }

    pub fn fill(&mut self, color: Rgb) {
        self.pixels.fill(pack(color));
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<Rgb> {
        if x < self.width && y < self.height {
            Some(unpack(self.pixels[y * self.width + x]))
        } else {
            None
        }
    }

    #[inline]
    pub fn put(&mut self, x: i64, y: i64, color: Rgb) {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            self.pixels[y as usize * self.width + x as usize] = pack(color);
        }
    }

    pub fn fill_rect(&mut self, x: i64, y: i64, w: i64, h: i64, color: Rgb) {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + w).min(self.width as i64);
        let y1 = (y + h).min(self.height as i64);
        let packed = pack(color);
        for py in y0..y1 {
            let row = py as usize * self.width;
            for px in x0..x1 {
                self.pixels[row + px as usize] = packed;
            }
        }
    }

    /// One-pixel outline of the rectangle with top-left `(x, y)`.
    pub fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Rgb) {
        let x0 = x.floor() as i64;
        let y0 = y.floor() as i64;
        let x1 = (x + w).floor() as i64;
        let y1 = (y + h).floor() as i64;
        for px in x0..=x1 {
            self.put(px, y0, color);
            self.put(px, y1, color);
        }
        for py in y0..=y1 {
            self.put(x0, py, color);
            self.put(x1, py, color);
        }
    }

    pub fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64, color: Rgb) {
        let r2 = radius * radius;
        let Some((x0, x1)) = clipped_span(cx - radius, cx + radius, self.width) else {
            return;
        };
        let Some((y0, y1)) = clipped_span(cy - radius, cy + radius, self.height) else {
            return;
        };
        for py in y0..=y1 {
            for px in x0..=x1 {
                let dx = px as f64 + 0.5 - cx;
                let dy = py as f64 + 0.5 - cy;
                if dx * dx + dy * dy <= r2 {
                    self.put(px, py, color);
                }
            }
        }
    }

    /// Ring between `radius - thickness` and `radius`.
    pub fn stroke_circle(&mut self, cx: f64, cy: f64, radius: f64, thickness: f64, color: Rgb) {
        let outer = radius * radius;
        let inner_r = (radius - thickness).max(0.0);
        let inner = inner_r * inner_r;
        let Some((x0, x1)) = clipped_span(cx - radius, cx + radius, self.width) else {
            return;
        };
        let Some((y0, y1)) = clipped_span(cy - radius, cy + radius, self.height) else {
            return;
        };
        for py in y0..=y1 {
            for px in x0..=x1 {
                let dx = px as f64 + 0.5 - cx;
                let dy = py as f64 + 0.5 - cy;
                let d2 = dx * dx + dy * dy;
                if d2 <= outer && d2 >= inner {
                    self.put(px, py, color);
                }
            }
        }
    }

    /// Bresenham line between two points.
    pub fn draw_line(&mut self, x0: f64, y0: f64, x1: f64, y1: f64, color: Rgb) {
        if !(x0.is_finite() && y0.is_finite() && x1.is_finite() && y1.is_finite()) {
            return;
        }
        let (mut x, mut y) = (x0.round() as i64, y0.round() as i64);
        let (xe, ye) = (x1.round() as i64, y1.round() as i64);
        let dx = (xe - x).abs();
        let dy = -(ye - y).abs();
        let sx = if x < xe { 1 } else { -1 };
        let sy = if y < ye { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            self.put(x, y, color);
            if x == xe && y == ye {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    pub fn draw_text(&mut self, x: i64, y: i64, text: &str, color: Rgb) {
        let mut cursor = x;
        for ch in text.chars() {
            if let Some(rows) = glyph(ch) {
                for (row_idx, row) in rows.iter().enumerate() {
                    for col in 0..GLYPH_WIDTH {
                        if (row >> (GLYPH_WIDTH - 1 - col)) & 1 == 1 {
                            self.put(cursor + col as i64, y + row_idx as i64, color);
                        }
                    }
                }
            }
            cursor += GLYPH_ADVANCE as i64;
        }
    }

    /// Copy `source` so its top-left lands at `(x, y)`.
    pub fn blit(&mut self, source: &Canvas, x: i64, y: i64) {
        for sy in 0..source.height {
            let ty = y + sy as i64;
            if ty < 0 || ty >= self.height as i64 {
                continue;
            }
            for sx in 0..source.width {
                let tx = x + sx as i64;
                if tx < 0 || tx >= self.width as i64 {
                    continue;
                }
                self.pixels[ty as usize * self.width + tx as usize] =
                    source.pixels[sy * source.width + sx];
            }
        }
    }

    pub fn to_rgb_image(&self) -> RgbImage {
        ImageBuffer::from_fn(self.width as u32, self.height as u32, |x, y| {
            ImageRgb(unpack(self.pixels[y as usize * self.width + x as usize]))
        })
    }
}

pub fn text_width(text: &str) -> usize {
    text.chars().count() * GLYPH_ADVANCE
}

/// 5x7 bitmap glyphs, MSB is the leftmost pixel. Lowercase renders as uppercase.
fn glyph(ch: char) -> Option<[u8; 7]> {
    let rows = match ch.to_ascii_uppercase() {
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
        '3' => [0b11110, 0b00001, 0b00001, 0b01110, 0b00001, 0b00001, 0b11110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
        'A' => [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'B' => [0b11110, 0b10001, 0b11110, 0b10001, 0b10001, 0b10001, 0b11110],
        'C' => [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110],
        'D' => [0b11110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11110],
        'E' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111],
        'F' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000],
        'G' => [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01110],
        'H' => [0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'I' => [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        'J' => [0b00111, 0b00010, 0b00010, 0b00010, 0b00010, 0b10010, 0b01100],
        'K' => [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001],
        'L' => [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
        'M' => [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001],
        'N' => [0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001, 0b10001],
        'O' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'P' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000],
        'Q' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101],
        'R' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
        'S' => [0b01110, 0b10001, 0b10000, 0b01110, 0b00001, 0b10001, 0b01110],
        'T' => [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
        'U' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'V' => [0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b01010, 0b00100],
        'W' => [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b11011, 0b10001],
        'X' => [0b10001, 0b01010, 0b00100, 0b00100, 0b00100, 0b01010, 0b10001],
        'Y' => [0b10001, 0b01010, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
        'Z' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111],
        '.' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b01100],
        ',' => [0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b01100, 0b11000],
        ':' => [0b00000, 0b01100, 0b01100, 0b00000, 0b01100, 0b01100, 0b00000],
        '-' => [0b00000, 0b00000, 0b00000, 0b11111, 0b00000, 0b00000, 0b00000],
        '+' => [0b00000, 0b00100, 0b00100, 0b11111, 0b00100, 0b00100, 0b00000],
        '(' => [0b00010, 0b00100, 0b01000, 0b01000, 0b01000, 0b00100, 0b00010],
        ')' => [0b01000, 0b00100, 0b00010, 0b00010, 0b00010, 0b00100, 0b01000],
        '/' => [0b00001, 0b00010, 0b00100, 0b00100, 0b01000, 0b10000, 0b00000],
        '%' => [0b11001, 0b11010, 0b00100, 0b01000, 0b01011, 0b10011, 0b00000],
        '|' => [0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
        '!' => [0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00000, 0b00100],
        _ => return None,
    };
    Some(rows)
}

/// Pixels `floor(lo)..=ceil(hi)` clipped to `0..extent`.
fn clipped_span(lo: f64, hi: f64, extent: usize) -> Option<(i64, i64)> {
    if extent == 0 || !lo.is_finite() || !hi.is_finite() {
        return None;
    }
    let start = (lo.floor() as i64).max(0);
    let end = (hi.ceil() as i64).min(extent as i64 - 1);
    (start <= end).then_some((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drawing_is_clipped() {
        let mut canvas = Canvas::new(4, 4, [0, 0, 0]);
        canvas.fill_rect(-2, -2, 4, 4, [255, 0, 0]);
        canvas.fill_circle(10.0, 10.0, 3.0, [0, 255, 0]);
        canvas.draw_line(-5.0, 1.0, 20.0, 1.0, [0, 0, 255]);
        assert_eq!(canvas.get(0, 0), Some([255, 0, 0]));
        assert_eq!(canvas.get(2, 2), Some([0, 0, 0]));
        assert_eq!(canvas.get(3, 1), Some([0, 0, 255]));
        assert_eq!(canvas.get(4, 0), None);
    }

    #[test]
    fn test_huge_circles_only_touch_the_canvas() {
        let mut canvas = Canvas::new(6, 4, [0, 0, 0]);
        canvas.fill_circle(3.0, 2.0, 1.0e9, [0, 255, 0]);
        assert!(canvas.pixels().iter().all(|p| *p == pack([0, 255, 0])));

        // The ring of a huge circle centred here lies far outside the canvas.
        canvas.stroke_circle(3.0, 2.0, 1.0e9, 1.0, [255, 0, 0]);
        assert!(canvas.pixels().iter().all(|p| *p == pack([0, 255, 0])));
    }

    #[test]
    fn test_pack_round_trips_channels() {
        assert_eq!(unpack(pack([12, 200, 7])), [12, 200, 7]);
    }

    #[test]
    fn test_text_marks_pixels() {
        let mut canvas = Canvas::new(20, 10, [0, 0, 0]);
        canvas.draw_text(0, 0, "1", [255, 255, 255]);
        // Vertical stroke of '1'
        assert_eq!(canvas.get(2, 3), Some([255, 255, 255]));
        assert_eq!(text_width("abc"), 18);
    }
}
