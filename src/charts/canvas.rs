//! Raster drawing primitives on top of `image::RgbImage`.
//!
//! Coordinates are floating-point pixels with the origin at the top-left.
//! Anything drawn outside the image is clipped silently.

use std::io::Cursor;

use image::{DynamicImage, ImageOutputFormat, Rgb, RgbImage};

use super::font;
use crate::error::JournalError;

pub type Color = [u8; 3];

pub const BLACK: Color = [0x00, 0x00, 0x00];
pub const DARK_GREY: Color = [0x33, 0x33, 0x33];
pub const MID_GREY: Color = [0x66, 0x66, 0x66];
pub const LIGHT_GREY: Color = [0x99, 0x99, 0x99];
pub const GRID_GREY: Color = [0xDD, 0xDD, 0xDD];
pub const WHITE: Color = [0xFF, 0xFF, 0xFF];

/// Line dash styles, matching the solid/dashed/dash-dot/dotted set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dash {
    Solid,
    Dashed,
    DashDot,
    Dotted,
}

impl Dash {
    /// On/off segment lengths, scaled by the stroke width.
    fn pattern(self, width: f64) -> Vec<f64> {
        let w = width.max(1.0);
        let units: &[f64] = match self {
            Dash::Solid => &[],
            Dash::Dashed => &[3.7, 1.6],
            Dash::DashDot => &[6.4, 1.6, 1.0, 1.6],
            Dash::Dotted => &[1.0, 1.65],
        };
        units.iter().map(|u| u * w).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub width: f64,
    pub dash: Dash,
}

impl Stroke {
    pub fn solid(color: Color, width: f64) -> Self {
        Self { color, width, dash: Dash::Solid }
    }

    pub fn with_dash(mut self, dash: Dash) -> Self {
        self.dash = dash;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    None,
    Circle,
    Square,
    Triangle,
    Diamond,
}

#[derive(Debug)]
pub struct Canvas {
    image: RgbImage,
}

impl Canvas {
    /// A white canvas.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbImage::from_pixel(width, height, Rgb(WHITE)),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn into_image(self) -> RgbImage {
        self.image
    }

    /// Colour at an in-bounds pixel.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x < self.width() && y < self.height() {
            Some(self.image.get_pixel(x, y).0)
        } else {
            None
        }
    }

    fn put(&mut self, x: i64, y: i64, color: Color) {
        if x < 0 || y < 0 || x >= self.width() as i64 || y >= self.height() as i64 {
            return;
        }
        self.image.put_pixel(x as u32, y as u32, Rgb(color));
    }

    fn blend(&mut self, x: i64, y: i64, color: Color, alpha: f32) {
        if x < 0 || y < 0 || x >= self.width() as i64 || y >= self.height() as i64 {
            return;
        }
        let a = alpha.clamp(0.0, 1.0);
        let px = self.image.get_pixel_mut(x as u32, y as u32);
        for (dst, src) in px.0.iter_mut().zip(color) {
            *dst = (*dst as f32 * (1.0 - a) + src as f32 * a).round() as u8;
        }
    }

    // ─── Shapes ───

    pub fn fill_rect(&mut self, x0: f64, y0: f64, x1: f64, y1: f64, color: Color) {
        let (xs, xe) = span(x0, x1);
        let (ys, ye) = span(y0, y1);
        for y in ys..ye {
            for x in xs..xe {
                self.put(x, y, color);
            }
        }
    }

    pub fn blend_rect(&mut self, x0: f64, y0: f64, x1: f64, y1: f64, color: Color, alpha: f32) {
        let (xs, xe) = span(x0, x1);
        let (ys, ye) = span(y0, y1);
        for y in ys..ye {
            for x in xs..xe {
                self.blend(x, y, color, alpha);
            }
        }
    }

    /// Rectangle outline drawn inside the given bounds.
    pub fn stroke_rect(&mut self, x0: f64, y0: f64, x1: f64, y1: f64, color: Color, thickness: f64) {
        let t = thickness.max(1.0);
        let (l, r) = (x0.min(x1), x0.max(x1));
        let (top, bottom) = (y0.min(y1), y0.max(y1));
        self.fill_rect(l, top, r, top + t, color);
        self.fill_rect(l, bottom - t, r, bottom, color);
        self.fill_rect(l, top, l + t, bottom, color);
        self.fill_rect(r - t, top, r, bottom, color);
    }

    pub fn disc(&mut self, cx: f64, cy: f64, radius: f64, color: Color) {
        let r2 = radius * radius + 0.25;
        self.fill_where(cx, cy, radius, color, |dx, dy| dx * dx + dy * dy <= r2);
    }

    pub fn marker(&mut self, x: f64, y: f64, marker: Marker, radius: f64, color: Color) {
        let r = radius.max(1.0);
        match marker {
            Marker::None => {}
            Marker::Circle => self.disc(x, y, r, color),
            Marker::Square => {
                let h = r * 0.85;
                self.fill_where(x, y, r, color, |dx, dy| dx.abs() <= h && dy.abs() <= h);
            }
            Marker::Diamond => self.fill_where(x, y, r * 1.1, color, |dx, dy| dx.abs() + dy.abs() <= r * 1.1),
            Marker::Triangle => self.fill_where(x, y, r, color, |dx, dy| {
                let depth = (dy + r) / (1.8 * r);
                (0.0..=1.0).contains(&depth) && dx.abs() <= depth * r
            }),
        }
    }

    fn fill_where(&mut self, cx: f64, cy: f64, extent: f64, color: Color, inside: impl Fn(f64, f64) -> bool) {
        let x0 = (cx - extent).floor() as i64 - 1;
        let x1 = (cx + extent).ceil() as i64 + 1;
        let y0 = (cy - extent).floor() as i64 - 1;
        let y1 = (cy + extent).ceil() as i64 + 1;
        for y in y0..=y1 {
            for x in x0..=x1 {
                if inside(x as f64 + 0.5 - cx, y as f64 + 0.5 - cy) {
                    self.put(x, y, color);
                }
            }
        }
    }

    // ─── Lines ───

    /// Connected line through `points`, honouring the stroke's dash pattern
    /// continuously across segments.
    pub fn polyline(&mut self, points: &[(f64, f64)], stroke: &Stroke) {
        let radius = (stroke.width / 2.0).max(0.5);
        let pattern = stroke.dash.pattern(stroke.width);
        let period: f64 = pattern.iter().sum();
        let mut travelled = 0.0;
        for pair in points.windows(2) {
            let (x0, y0) = pair[0];
            let (x1, y1) = pair[1];
            let len = ((x1 - x0).powi(2) + (y1 - y0).powi(2)).sqrt();
            let steps = (len / 0.5).ceil().max(1.0) as usize;
            for i in 0..=steps {
                let t = i as f64 / steps as f64;
                if dash_on(&pattern, period, travelled + t * len) {
                    self.disc(x0 + t * (x1 - x0), y0 + t * (y1 - y0), radius, stroke.color);
                }
            }
            travelled += len;
        }
    }

    pub fn line(&mut self, x0: f64, y0: f64, x1: f64, y1: f64, stroke: &Stroke) {
        self.polyline(&[(x0, y0), (x1, y1)], stroke);
    }

    /// Shades the area between the polyline and the horizontal `baseline`.
    pub fn fill_between(&mut self, points: &[(f64, f64)], baseline: f64, color: Color, alpha: f32) {
        let mut last_column = None;
        for pair in points.windows(2) {
            let (x0, y0) = pair[0];
            let (x1, y1) = pair[1];
            if x1 <= x0 {
                continue;
            }
            let start = x0.round() as i64;
            let end = x1.round() as i64;
            for x in start..=end {
                if last_column.map_or(false, |c| x <= c) {
                    continue;
                }
                let t = ((x as f64 - x0) / (x1 - x0)).clamp(0.0, 1.0);
                let y = y0 + t * (y1 - y0);
                let (ys, ye) = span(y, baseline);
                for py in ys..ye {
                    self.blend(x, py, color, alpha);
                }
                last_column = Some(x);
            }
        }
    }

    // ─── Text ───

    /// Draws `text` with its top-left corner at (x, y).
    pub fn text(&mut self, x: f64, y: f64, text: &str, scale: u32, color: Color) {
        let s = scale.max(1) as f64;
        let pixels: Vec<(u32, u32)> = font::pixels(text).collect();
        for (gx, gy) in pixels {
            let px = x + gx as f64 * s;
            let py = y + gy as f64 * s;
            self.fill_rect(px, py, px + s, py + s, color);
        }
    }

    pub fn text_bold(&mut self, x: f64, y: f64, text: &str, scale: u32, color: Color) {
        self.text(x, y, text, scale, color);
        self.text(x + 1.0, y, text, scale, color);
    }

    pub fn text_centered(&mut self, cx: f64, y: f64, text: &str, scale: u32, color: Color) {
        let w = font::text_width(text, scale.max(1)) as f64;
        self.text(cx - w / 2.0, y, text, scale, color);
    }

    pub fn text_right(&mut self, right: f64, y: f64, text: &str, scale: u32, color: Color) {
        let w = font::text_width(text, scale.max(1)) as f64;
        self.text(right - w, y, text, scale, color);
    }

    /// Text rotated a quarter turn counter-clockwise, reading bottom to top,
    /// centred vertically on `cy` with its glyph tops at column `x`.
    pub fn text_vertical(&mut self, x: f64, cy: f64, text: &str, scale: u32, color: Color) {
        let s = scale.max(1) as f64;
        let bottom = cy + font::text_width(text, scale.max(1)) as f64 / 2.0;
        let pixels: Vec<(u32, u32)> = font::pixels(text).collect();
        for (gx, gy) in pixels {
            let px = x + gy as f64 * s;
            let py = bottom - (gx as f64 + 1.0) * s;
            self.fill_rect(px, py, px + s, py + s, color);
        }
    }

    // ─── Output ───

    pub fn encode_png(&self) -> Result<Vec<u8>, JournalError> {
        let dynamic = DynamicImage::ImageRgb8(self.image.clone());
        let mut cursor = Cursor::new(Vec::new());
        dynamic
            .write_to(&mut cursor, ImageOutputFormat::Png)
            .map_err(|e| JournalError::rendering("PNG encoding failed", e))?;
        Ok(cursor.into_inner())
    }
}

/// Integer pixel range covering [a, b), at least one pixel wide.
fn span(a: f64, b: f64) -> (i64, i64) {
    let (lo, hi) = (a.min(b), a.max(b));
    let start = lo.round() as i64;
    let end = (hi.round() as i64).max(start + 1);
    (start, end)
}

fn dash_on(pattern: &[f64], period: f64, distance: f64) -> bool {
    if pattern.is_empty() || period <= 0.0 {
        return true;
    }
    let mut phase = distance % period;
    for (i, segment) in pattern.iter().enumerate() {
        if phase < *segment {
            return i % 2 == 0;
        }
        phase -= segment;
    }
    true
}
