//! Text primitive.

use super::Geometry;
use crate::font;
use kurbo::{BezPath, Point, Rect};
use plotview_core::svg::FontFace;

/// Line advance as a multiple of the font size.
pub const LINE_HEIGHT: f64 = 1.2;

/// Horizontal alignment relative to the anchor point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextAnchor {
    #[default]
    Start,
    Middle,
    End,
}

impl TextAnchor {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "start" => Some(TextAnchor::Start),
            "middle" => Some(TextAnchor::Middle),
            "end" => Some(TextAnchor::End),
            _ => None,
        }
    }
}

/// A run of text anchored at a baseline point. Content may span several
/// lines separated by `\n`.
#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    pub x: f64,
    pub y: f64,
    pub content: String,
    pub anchor: TextAnchor,
    /// Font families in preference order.
    pub font_family: Vec<String>,
    pub font_size: f64,
    pub face: FontFace,
}

impl Default for Text {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            content: String::new(),
            anchor: TextAnchor::Start,
            font_family: Vec::new(),
            font_size: 12.0,
            face: FontFace::NORMAL,
        }
    }
}

impl Text {
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.content.split('\n')
    }

    /// Advance width of one line in the font it is drawn with.
    pub fn line_width(&self, line: &str) -> f64 {
        font::advance_width(line, self.font_size, self.face)
    }

    /// Left edge of a line of the given width, honouring the anchor.
    pub fn line_start(&self, width: f64) -> f64 {
        match self.anchor {
            TextAnchor::Start => self.x,
            TextAnchor::Middle => self.x - width / 2.0,
            TextAnchor::End => self.x - width,
        }
    }
}

impl Geometry for Text {
    fn to_path(&self) -> Option<BezPath> {
        None
    }

    /// Layout box: widest line across, first ascent to last descent down.
    fn bounds(&self) -> Option<Rect> {
        if self.content.is_empty() {
            return None;
        }
        let width = self
            .lines()
            .map(|l| self.line_width(l))
            .fold(0.0_f64, f64::max);
        let line_count = self.lines().count() as f64;
        let metrics = font::line_metrics(self.font_size, self.face);
        let top = self.y - metrics.ascent;
        let height =
            metrics.ascent + metrics.descent + (line_count - 1.0) * self.font_size * LINE_HEIGHT;
        let left = self.line_start(width);
        Some(Rect::new(left, top, left + width, top + height))
    }
}
