// 2D points, affine transforms and arena-to-surface fitting.

use super::state::Bounds;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Affine transform in the 2D-canvas layout:
/// `x' = a*x + c*y + e`, `y' = b*x + d*y + f`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Default for Affine {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Affine {
    pub const IDENTITY: Affine = Affine {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    /// `self * other`: `other` is applied first, in local coordinates.
    pub fn then(self, other: Affine) -> Affine {
        Affine {
            a: self.a * other.a + self.c * other.b,
            b: self.b * other.a + self.d * other.b,
            c: self.a * other.c + self.c * other.d,
            d: self.b * other.c + self.d * other.d,
            e: self.a * other.e + self.c * other.f + self.e,
            f: self.b * other.e + self.d * other.f + self.f,
        }
    }

    pub fn translated(self, x: f32, y: f32) -> Affine {
        self.then(Affine {
            e: x,
            f: y,
            ..Affine::IDENTITY
        })
    }

    pub fn rotated(self, radians: f32) -> Affine {
        let (sin, cos) = radians.sin_cos();
        self.then(Affine {
            a: cos,
            b: sin,
            c: -sin,
            d: cos,
            e: 0.0,
            f: 0.0,
        })
    }

    pub fn scaled(self, s: f32) -> Affine {
        self.then(Affine {
            a: s,
            d: s,
            ..Affine::IDENTITY
        })
    }

    pub fn apply(&self, p: Point) -> Point {
        Point {
            x: self.a * p.x + self.c * p.y + self.e,
            y: self.b * p.x + self.d * p.y + self.f,
        }
    }

    /// Length scale for uniform transforms (circle radii, line widths).
    pub fn length_scale(&self) -> f32 {
        (self.a * self.d - self.b * self.c).abs().sqrt()
    }
}

/// Uniform scale that fits the whole arena on the surface, preserving aspect
/// ratio. Excess space on the non-binding axis is left blank.
pub fn fit_scale(bounds: Bounds, surface_width: f32, surface_height: f32) -> f32 {
    (surface_width / bounds.width).min(surface_height / bounds.height)
}
