// Software rasterizer surface backed by a 0xRRGGBB pixel buffer.

use super::font::{self, GLYPH_COLUMNS};
use crate::domain::{Affine, Canvas, Color, Font, Point};
use std::sync::Arc;
use tokio::sync::watch;

/// Finished frame handed to presenters.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameImage {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u32>,
}

impl FrameImage {
    pub fn empty(width: usize, height: usize, background: Color) -> Self {
        Self {
            width,
            height,
            pixels: vec![background.0; width * height],
        }
    }
}

pub struct Framebuffer {
    width: usize,
    height: usize,
    pixels: Vec<u32>,
    background: Color,
    transform: Affine,
    saved: Vec<Affine>,
    // Latest finished frame for presenters; `None` when running headless.
    publisher: Option<watch::Sender<Arc<FrameImage>>>,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize, background: Color) -> Self {
        Self {
            width,
            height,
            pixels: vec![background.0; width * height],
            background,
            transform: Affine::IDENTITY,
            saved: Vec::new(),
            publisher: None,
        }
    }

    pub fn with_publisher(mut self, publisher: watch::Sender<Arc<FrameImage>>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Color> {
        if x < self.width && y < self.height {
            Some(Color(self.pixels[y * self.width + x]))
        } else {
            None
        }
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn transform(&self) -> Affine {
        self.transform
    }

    fn plot(&mut self, x: i64, y: i64, color: Color) {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            self.pixels[y as usize * self.width + x as usize] = color.0;
        }
    }

    // Bresenham between device-space endpoints, clipped to the surface first.
    fn draw_line(&mut self, from: Point, to: Point, color: Color) {
        let Some((from, to)) = clip_segment(from, to, self.width, self.height) else {
            return;
        };
        let (mut x0, mut y0) = (from.x.floor() as i64, from.y.floor() as i64);
        let (x1, y1) = (to.x.floor() as i64, to.y.floor() as i64);
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            self.plot(x0, y0, color);
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
    }

    // Even-odd scanline fill sampled at pixel centres.
    fn fill_device_polygon(&mut self, points: &[Point], color: Color) {
        if points.len() < 3 || points.iter().any(|p| !p.is_finite()) {
            return;
        }

        let min_y = points.iter().map(|p| p.y).fold(f32::INFINITY, f32::min);
        let max_y = points.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max);
        let first_row = min_y.floor().max(0.0) as usize;
        let last_row = (max_y.ceil().max(0.0) as usize).min(self.height);

        let mut crossings: Vec<f32> = Vec::with_capacity(points.len());
        for row in first_row..last_row {
            let sample_y = row as f32 + 0.5;
            crossings.clear();

            for (i, a) in points.iter().enumerate() {
                let b = points[(i + 1) % points.len()];
                if (a.y <= sample_y && b.y > sample_y) || (b.y <= sample_y && a.y > sample_y) {
                    let t = (sample_y - a.y) / (b.y - a.y);
                    crossings.push(a.x + t * (b.x - a.x));
                }
            }
            crossings.sort_by(|a, b| a.total_cmp(b));

            for span in crossings.chunks_exact(2) {
                // Pixel x is covered when its centre lies inside [left, right).
                let left = (span[0] - 0.5).ceil().max(0.0) as usize;
                let right = ((span[1] - 0.5).ceil().max(0.0) as usize).min(self.width);
                for col in left..right {
                    self.pixels[row * self.width + col] = color.0;
                }
            }
        }
    }

    fn device_points(&self, points: &[Point]) -> Vec<Point> {
        points.iter().map(|p| self.transform.apply(*p)).collect()
    }
}

impl Canvas for Framebuffer {
    fn size(&self) -> (f32, f32) {
        (self.width as f32, self.height as f32)
    }

    fn save(&mut self) {
        self.saved.push(self.transform);
    }

    fn restore(&mut self) {
        // An unbalanced restore falls back to the default state.
        self.transform = self.saved.pop().unwrap_or(Affine::IDENTITY);
    }

    fn clear(&mut self) {
        self.pixels.fill(self.background.0);
    }

    fn scale(&mut self, s: f32) {
        self.transform = self.transform.scaled(s);
    }

    fn translate(&mut self, x: f32, y: f32) {
        self.transform = self.transform.translated(x, y);
    }

    fn rotate(&mut self, radians: f32) {
        self.transform = self.transform.rotated(radians);
    }

    fn stroke_path(&mut self, points: &[Point], closed: bool, color: Color) {
        let device = self.device_points(points);
        if device.iter().any(|p| !p.is_finite()) {
            return;
        }
        for pair in device.windows(2) {
            self.draw_line(pair[0], pair[1], color);
        }
        if closed && device.len() > 2 {
            self.draw_line(device[device.len() - 1], device[0], color);
        }
    }

    fn fill_path(&mut self, points: &[Point], color: Color) {
        let device = self.device_points(points);
        self.fill_device_polygon(&device, color);
    }

    fn fill_circle(&mut self, center: Point, radius: f32, color: Color) {
        let c = self.transform.apply(center);
        let r = radius * self.transform.length_scale();
        if !c.is_finite() || !r.is_finite() {
            return;
        }

        // Sub-pixel markers still light their centre pixel.
        if r < 0.5 {
            self.plot(c.x.floor() as i64, c.y.floor() as i64, color);
            return;
        }

        // Only the part of the bounding box that lies on the surface is walked.
        let (cx, cy, r) = (f64::from(c.x), f64::from(c.y), f64::from(r));
        let Some((x0, x1)) = clamp_span(cx - r, cx + r, self.width) else {
            return;
        };
        let Some((y0, y1)) = clamp_span(cy - r, cy + r, self.height) else {
            return;
        };
        let r2 = r * r;
        for py in y0..y1 {
            for px in x0..x1 {
                let dx = px as f64 + 0.5 - cx;
                let dy = py as f64 + 0.5 - cy;
                if dx * dx + dy * dy <= r2 {
                    self.pixels[py * self.width + px] = color.0;
                }
            }
        }
    }

    fn fill_rect(&mut self, origin: Point, width: f32, height: f32, color: Color) {
        let corners = [
            origin,
            Point::new(origin.x + width, origin.y),
            Point::new(origin.x + width, origin.y + height),
            Point::new(origin.x, origin.y + height),
        ];
        self.fill_path(&corners, color);
    }

    fn fill_text(&mut self, text: &str, origin: Point, font: Font, color: Color) {
        let advance = font.size * Font::ADVANCE;
        // Glyph cells plus one spacing column fill the advance exactly.
        let cell = advance / (GLYPH_COLUMNS + 1) as f32;

        for (i, ch) in text.chars().enumerate() {
            let glyph_x = origin.x + i as f32 * advance;
            for (col, row) in font::lit_cells(ch) {
                let cell_origin = Point::new(
                    glyph_x + col as f32 * cell,
                    origin.y + row as f32 * cell,
                );
                self.fill_rect(cell_origin, cell, cell, color);
            }
        }
    }

    fn present(&mut self) {
        if let Some(publisher) = &self.publisher {
            let frame = FrameImage {
                width: self.width,
                height: self.height,
                pixels: self.pixels.clone(),
            };
            publisher.send_replace(Arc::new(frame));
        }
    }
}

// Pixel index range [start, end) covering [lo, hi], limited to 0..len.
fn clamp_span(lo: f64, hi: f64, len: usize) -> Option<(usize, usize)> {
    let start = lo.floor().max(0.0);
    let end = (hi.ceil() + 1.0).min(len as f64);
    if start >= end {
        return None;
    }
    Some((start as usize, end as usize))
}

/// Liang-Barsky clip of a segment against the pixel area of a
/// `width` x `height` surface. Works in f64 so far-off endpoints stay finite.
fn clip_segment(from: Point, to: Point, width: usize, height: usize) -> Option<(Point, Point)> {
    if width == 0 || height == 0 {
        return None;
    }
    // Keep endpoints strictly inside so `floor` lands on a real pixel.
    let max_x = width as f64 - 0.5;
    let max_y = height as f64 - 0.5;
    let (x0, y0) = (f64::from(from.x), f64::from(from.y));
    let dx = f64::from(to.x) - x0;
    let dy = f64::from(to.y) - y0;

    // Each clip also remembers the edge it hit, since `t` alone loses the
    // pixel offset when the endpoints are huge.
    let mut enter = (0.0_f64, None);
    let mut exit = (1.0_f64, None);
    let edges = [
        (-dx, x0, Edge::X(0.0)),
        (dx, max_x - x0, Edge::X(max_x)),
        (-dy, y0, Edge::Y(0.0)),
        (dy, max_y - y0, Edge::Y(max_y)),
    ];
    for (p, q, edge) in edges {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > exit.0 {
                return None;
            }
            if r > enter.0 {
                enter = (r, Some(edge));
            }
        } else {
            if r < enter.0 {
                return None;
            }
            if r < exit.0 {
                exit = (r, Some(edge));
            }
        }
    }

    let at = |(t, edge): (f64, Option<Edge>)| {
        let (mut x, mut y) = (x0 + t * dx, y0 + t * dy);
        match edge {
            Some(Edge::X(v)) => x = v,
            Some(Edge::Y(v)) => y = v,
            None => {}
        }
        Point::new(x.clamp(0.0, max_x) as f32, y.clamp(0.0, max_y) as f32)
    };
    Some((at(enter), at(exit)))
}

#[derive(Clone, Copy)]
enum Edge {
    X(f64),
    Y(f64),
}
