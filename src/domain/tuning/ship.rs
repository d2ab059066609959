use crate::domain::canvas::Color;

/// Visual tuning for ship glyphs and their team labels.
///
/// Distances are in arena units; the frame transform scales them with the arena.
#[derive(Debug, Clone, Copy)]
pub struct ShipTuning {
    /// Half-length of the hull triangle.
    pub size: f32,

    /// Hull half-width as a fraction of `size`.
    pub wing_ratio: f32,

    /// Radius of the marker drawn at the ship centre.
    pub core_radius: f32,

    pub hull_fill: Color,
    pub hull_stroke: Color,
    pub core_fill: Color,

    /// Label em height.
    pub label_font_size: f32,

    /// Top-left of the label background patch, relative to the ship centre.
    pub label_patch_offset: (f32, f32),

    /// Extra width added to the measured text for the patch.
    pub label_patch_padding: f32,

    pub label_patch_height: f32,

    /// Top-left of the label text, relative to the ship centre.
    pub label_text_offset: (f32, f32),

    pub label_patch_fill: Color,
    pub label_text_fill: Color,
}

impl Default for ShipTuning {
    fn default() -> Self {
        Self {
            size: 18.0,
            wing_ratio: 0.8,
            core_radius: 10.0,
            hull_fill: Color::BLACK,
            hull_stroke: Color::WHITE,
            core_fill: Color::rgb(0xe0, 0x5d, 0x5d),
            label_font_size: 16.0,
            label_patch_offset: (17.0, -3.0),
            label_patch_padding: 6.0,
            label_patch_height: 17.0,
            label_text_offset: (20.0, 0.0),
            label_patch_fill: Color::BLACK,
            label_text_fill: Color::WHITE,
        }
    }
}
