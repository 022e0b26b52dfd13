//! Ellipse primitive.

use super::{Geometry, PATH_TOLERANCE};
use kurbo::{BezPath, Point, Rect, Shape as KurboShape};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ellipse {
    pub cx: f64,
    pub cy: f64,
    pub rx: f64,
    pub ry: f64,
}

impl Ellipse {
    pub fn center(&self) -> Point {
        Point::new(self.cx, self.cy)
    }
}

impl Geometry for Ellipse {
    fn to_path(&self) -> Option<BezPath> {
        if self.rx <= 0.0 || self.ry <= 0.0 {
            return None;
        }
        Some(kurbo::Ellipse::new(self.center(), (self.rx, self.ry), 0.0).to_path(PATH_TOLERANCE))
    }

    fn bounds(&self) -> Option<Rect> {
        Some(Rect::new(
            self.cx - self.rx,
            self.cy - self.ry,
            self.cx + self.rx,
            self.cy + self.ry,
        ))
    }
}
