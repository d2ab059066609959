// Frame renderer: maps one world snapshot onto the drawing surface.

use crate::domain::geometry::fit_scale;
use crate::domain::tuning::{BulletTuning, ShipTuning};
use crate::domain::{
    Bounds, Bullet, Canvas, CanvasGuard, Color, Font, Point, RenderError, Ship, TeamDirectory,
    WorldSnapshot,
};
use std::f32::consts::FRAC_PI_2;

#[derive(Debug, Clone, Copy)]
pub struct FrameRenderer {
    ship: ShipTuning,
    bullet: BulletTuning,
    arena_stroke: Color,
}

impl Default for FrameRenderer {
    fn default() -> Self {
        Self::new(ShipTuning::default(), BulletTuning::default())
    }
}

impl FrameRenderer {
    pub fn new(ship: ShipTuning, bullet: BulletTuning) -> Self {
        Self {
            ship,
            bullet,
            arena_stroke: Color::WHITE,
        }
    }

    /// Draws a complete frame. Every transform change is undone before this
    /// returns, including when an entity aborts the rest of the frame.
    pub fn render<C: Canvas + ?Sized>(
        &self,
        canvas: &mut C,
        snapshot: &WorldSnapshot,
        directory: &TeamDirectory,
    ) -> Result<(), RenderError> {
        let (width, height) = canvas.size();
        let mut frame = CanvasGuard::new(canvas);
        frame.clear();

        let bounds = snapshot.bounds;
        if !bounds.is_drawable() {
            return Err(RenderError::DegenerateBounds(bounds));
        }

        // One uniform scale for the whole frame; no centring offset.
        frame.scale(fit_scale(bounds, width, height));
        self.draw_arena(&mut *frame, bounds);

        for ship in &snapshot.players {
            self.draw_ship(&mut *frame, ship, directory)?;
        }
        for bullet in &snapshot.bullets {
            self.draw_bullet(&mut *frame, bullet)?;
        }

        Ok(())
    }

    fn draw_arena<C: Canvas + ?Sized>(&self, canvas: &mut C, bounds: Bounds) {
        let outline = [
            Point::new(0.0, 0.0),
            Point::new(bounds.width, 0.0),
            Point::new(bounds.width, bounds.height),
            Point::new(0.0, bounds.height),
        ];
        canvas.stroke_path(&outline, true, self.arena_stroke);
    }

    fn draw_ship<C: Canvas + ?Sized>(
        &self,
        canvas: &mut C,
        ship: &Ship,
        directory: &TeamDirectory,
    ) -> Result<(), RenderError> {
        if !(ship.x.is_finite() && ship.y.is_finite() && ship.angle.is_finite()) {
            return Err(RenderError::NonFiniteGeometry {
                entity: ship.id.clone(),
            });
        }

        let t = &self.ship;
        // The hull points along +y in local space, hence the quarter turn.
        let heading = ship.angle - FRAC_PI_2;

        let mut local = CanvasGuard::new(canvas);
        local.translate(ship.x.floor(), ship.y.floor());
        local.rotate(heading);

        let wing = t.size * t.wing_ratio;
        let hull = [
            Point::new(-wing, -t.size),
            Point::new(0.0, t.size),
            Point::new(wing, -t.size),
        ];
        local.fill_path(&hull, t.hull_fill);
        local.stroke_path(&hull, true, t.hull_stroke);
        local.fill_circle(Point::new(0.0, 0.0), t.core_radius, t.core_fill);

        // Counter-rotate so the label always reads upright.
        local.rotate(-heading);

        let label = directory.label(&ship.id);
        let font = Font::monospace(t.label_font_size);
        let text_width = local.measure_text(label, font);
        let (patch_x, patch_y) = t.label_patch_offset;
        local.fill_rect(
            Point::new(patch_x, patch_y),
            text_width + t.label_patch_padding,
            t.label_patch_height,
            t.label_patch_fill,
        );
        let (text_x, text_y) = t.label_text_offset;
        local.fill_text(label, Point::new(text_x, text_y), font, t.label_text_fill);

        Ok(())
    }

    fn draw_bullet<C: Canvas + ?Sized>(
        &self,
        canvas: &mut C,
        bullet: &Bullet,
    ) -> Result<(), RenderError> {
        if !(bullet.x.is_finite() && bullet.y.is_finite()) {
            return Err(RenderError::NonFiniteGeometry {
                entity: bullet.id.clone(),
            });
        }

        canvas.fill_circle(
            Point::new(bullet.x, bullet.y),
            self.bullet.radius,
            self.bullet.fill,
        );
        Ok(())
    }
}
