//! Rectangle primitive.

use super::{Geometry, PATH_TOLERANCE};
use kurbo::{BezPath, Rect, RoundedRect, Shape as KurboShape};

/// An axis-aligned rectangle with optional rounded corners.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rectangle {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub rx: f64,
    pub ry: f64,
}

impl Rectangle {
    pub fn as_rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    /// Corner radius actually drawn. A missing radius takes the other one;
    /// elliptical corners are drawn circular with the smaller radius.
    pub fn corner_radius(&self) -> f64 {
        let radius = match (self.rx > 0.0, self.ry > 0.0) {
            (true, true) => self.rx.min(self.ry),
            (true, false) => self.rx,
            (false, true) => self.ry,
            (false, false) => 0.0,
        };
        radius.min(self.width / 2.0).min(self.height / 2.0)
    }
}

impl Geometry for Rectangle {
    fn to_path(&self) -> Option<BezPath> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return None;
        }
        let radius = self.corner_radius();
        if radius > 0.0 {
            Some(RoundedRect::from_rect(self.as_rect(), radius).to_path(PATH_TOLERANCE))
        } else {
            Some(self.as_rect().to_path(PATH_TOLERANCE))
        }
    }

    fn bounds(&self) -> Option<Rect> {
        Some(self.as_rect())
    }
}
