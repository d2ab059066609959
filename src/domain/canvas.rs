// Drawing-surface port used by the frame renderer.

use super::geometry::Point;
use std::ops::{Deref, DerefMut};

/// 0xRRGGBB colour, the pixel layout used by the framebuffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color(pub u32);

impl Color {
    pub const BLACK: Color = Color(0x000000);
    pub const WHITE: Color = Color(0xffffff);
    pub const GRAY: Color = Color(0x808080);
    pub const ORANGE: Color = Color(0xffa500);
    pub const RED: Color = Color(0xff0000);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color(((r as u32) << 16) | ((g as u32) << 8) | (b as u32))
    }
}

/// Fixed-pitch font metrics shared by every surface so label patches line up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Font {
    /// Em height in the current coordinate space.
    pub size: f32,
}

impl Font {
    /// Horizontal advance per character, as a fraction of the em height.
    pub const ADVANCE: f32 = 0.6;

    pub const fn monospace(size: f32) -> Self {
        Self { size }
    }

    pub fn measure(&self, text: &str) -> f32 {
        text.chars().count() as f32 * self.size * Self::ADVANCE
    }
}

/// Minimal 2D-canvas style surface.
///
/// All geometry is in the current local coordinate space; `save`/`restore`
/// bracket transform changes. Prefer [`CanvasGuard`] over calling them by hand.
pub trait Canvas {
    /// Surface size in device pixels.
    fn size(&self) -> (f32, f32);

    fn save(&mut self);
    fn restore(&mut self);

    fn clear(&mut self);

    fn scale(&mut self, s: f32);
    fn translate(&mut self, x: f32, y: f32);
    fn rotate(&mut self, radians: f32);

    fn stroke_path(&mut self, points: &[Point], closed: bool, color: Color);
    fn fill_path(&mut self, points: &[Point], color: Color);
    fn fill_circle(&mut self, center: Point, radius: f32, color: Color);
    fn fill_rect(&mut self, origin: Point, width: f32, height: f32, color: Color);

    fn measure_text(&self, text: &str, font: Font) -> f32 {
        font.measure(text)
    }

    /// Draws `text` with its top-left corner at `origin`.
    fn fill_text(&mut self, text: &str, origin: Point, font: Font, color: Color);

    /// Marks the end of a frame. Surfaces that publish frames do it here.
    fn present(&mut self) {}
}

/// Scoped `save`/`restore` pair; the restore runs on every exit path.
pub struct CanvasGuard<'a, C: Canvas + ?Sized> {
    canvas: &'a mut C,
}

impl<'a, C: Canvas + ?Sized> CanvasGuard<'a, C> {
    pub fn new(canvas: &'a mut C) -> Self {
        canvas.save();
        Self { canvas }
    }
}

impl<C: Canvas + ?Sized> Deref for CanvasGuard<'_, C> {
    type Target = C;

    fn deref(&self) -> &C {
        &*self.canvas
    }
}

impl<C: Canvas + ?Sized> DerefMut for CanvasGuard<'_, C> {
    fn deref_mut(&mut self) -> &mut C {
        &mut *self.canvas
    }
}

impl<C: Canvas + ?Sized> Drop for CanvasGuard<'_, C> {
    fn drop(&mut self) {
        self.canvas.restore();
    }
}
