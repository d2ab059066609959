// Surface that records draw calls instead of rasterizing them.

use crate::domain::{Canvas, Color, Font, Point};

/// One recorded canvas call, in local coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Save,
    Restore,
    Clear,
    Scale(f32),
    Translate(f32, f32),
    Rotate(f32),
    StrokePath {
        points: Vec<Point>,
        closed: bool,
        color: Color,
    },
    FillPath {
        points: Vec<Point>,
        color: Color,
    },
    FillCircle {
        center: Point,
        radius: f32,
        color: Color,
    },
    FillRect {
        origin: Point,
        width: f32,
        height: f32,
        color: Color,
    },
    FillText {
        text: String,
        origin: Point,
        font: Font,
        color: Color,
    },
}

#[derive(Debug, Clone)]
pub struct CommandRecorder {
    size: (f32, f32),
    commands: Vec<DrawCommand>,
    // Open save() calls; zero between frames when the renderer is balanced.
    depth: usize,
    frames: u64,
}

impl CommandRecorder {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: (width, height),
            commands: Vec::new(),
            depth: 0,
            frames: 0,
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Drains the commands recorded so far.
    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Canvas for CommandRecorder {
    fn size(&self) -> (f32, f32) {
        self.size
    }

    fn save(&mut self) {
        self.depth += 1;
        self.commands.push(DrawCommand::Save);
    }

    fn restore(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.commands.push(DrawCommand::Restore);
    }

    fn clear(&mut self) {
        self.commands.push(DrawCommand::Clear);
    }

    fn scale(&mut self, s: f32) {
        self.commands.push(DrawCommand::Scale(s));
    }

    fn translate(&mut self, x: f32, y: f32) {
        self.commands.push(DrawCommand::Translate(x, y));
    }

    fn rotate(&mut self, radians: f32) {
        self.commands.push(DrawCommand::Rotate(radians));
    }

    fn stroke_path(&mut self, points: &[Point], closed: bool, color: Color) {
        self.commands.push(DrawCommand::StrokePath {
            points: points.to_vec(),
            closed,
            color,
        });
    }

    fn fill_path(&mut self, points: &[Point], color: Color) {
        self.commands.push(DrawCommand::FillPath {
            points: points.to_vec(),
            color,
        });
    }

    fn fill_circle(&mut self, center: Point, radius: f32, color: Color) {
        self.commands.push(DrawCommand::FillCircle {
            center,
            radius,
            color,
        });
    }

    fn fill_rect(&mut self, origin: Point, width: f32, height: f32, color: Color) {
        self.commands.push(DrawCommand::FillRect {
            origin,
            width,
            height,
            color,
        });
    }

    fn fill_text(&mut self, text: &str, origin: Point, font: Font, color: Color) {
        self.commands.push(DrawCommand::FillText {
            text: text.to_string(),
            origin,
            font,
            color,
        });
    }

    fn present(&mut self) {
        self.frames += 1;
    }
}
