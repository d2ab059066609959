use crate::domain::canvas::Color;

/// Visual tuning for bullets.
#[derive(Debug, Clone, Copy)]
pub struct BulletTuning {
    /// Marker radius in arena units.
    pub radius: f32,

    pub fill: Color,
}

impl Default for BulletTuning {
    fn default() -> Self {
        Self {
            radius: 3.0,
            fill: Color::rgb(0xf9, 0xca, 0x24),
        }
    }
}
