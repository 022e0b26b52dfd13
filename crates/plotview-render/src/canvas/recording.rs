//! A context that records draw calls instead of rasterizing them.

use crate::bitmap::Bitmap;
use crate::primitives::FillRule;
use crate::renderer::{Context2d, TextRun};
use kurbo::{Affine, BezPath, Rect, Stroke};
use peniko::Color;

/// A recorded draw call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Save,
    Restore,
    Transform(Affine),
    Clip(BezPath),
    FillPath {
        path: BezPath,
        color: Color,
        rule: FillRule,
    },
    StrokePath {
        path: BezPath,
        color: Color,
        width: f64,
        dashes: Vec<f64>,
    },
    FillText(TextRun),
    DrawImage {
        width: u32,
        height: u32,
        dest: Rect,
        opacity: f64,
    },
    Clear(Color),
}

#[derive(Debug, Clone, Default)]
pub struct RecordingContext {
    commands: Vec<DrawCommand>,
}

impl RecordingContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn into_commands(self) -> Vec<DrawCommand> {
        self.commands
    }

    pub fn fill_count(&self) -> usize {
        self.count(|c| matches!(c, DrawCommand::FillPath { .. }))
    }

    pub fn stroke_count(&self) -> usize {
        self.count(|c| matches!(c, DrawCommand::StrokePath { .. }))
    }

    /// Text of every recorded text run, in draw order.
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::FillText(run) => Some(run.text.as_str()),
                _ => None,
            })
            .collect()
    }

    fn count(&self, pred: impl Fn(&DrawCommand) -> bool) -> usize {
        self.commands.iter().filter(|c| pred(c)).count()
    }
}

impl Context2d for RecordingContext {
    fn save(&mut self) {
        self.commands.push(DrawCommand::Save);
    }

    fn restore(&mut self) {
        self.commands.push(DrawCommand::Restore);
    }

    fn transform(&mut self, affine: Affine) {
        self.commands.push(DrawCommand::Transform(affine));
    }

    fn clip(&mut self, path: &BezPath) {
        self.commands.push(DrawCommand::Clip(path.clone()));
    }

    fn fill_path(&mut self, path: &BezPath, color: Color, rule: FillRule) {
        self.commands.push(DrawCommand::FillPath {
            path: path.clone(),
            color,
            rule,
        });
    }

    fn stroke_path(&mut self, path: &BezPath, color: Color, stroke: &Stroke) {
        self.commands.push(DrawCommand::StrokePath {
            path: path.clone(),
            color,
            width: stroke.width,
            dashes: stroke.dash_pattern.to_vec(),
        });
    }

    fn fill_text(&mut self, run: &TextRun) {
        self.commands.push(DrawCommand::FillText(run.clone()));
    }

    fn draw_image(&mut self, bitmap: &Bitmap, dest: Rect, opacity: f64) {
        self.commands.push(DrawCommand::DrawImage {
            width: bitmap.width,
            height: bitmap.height,
            dest,
            opacity,
        });
    }

    fn clear(&mut self, color: Color) {
        self.commands.push(DrawCommand::Clear(color));
    }
}
