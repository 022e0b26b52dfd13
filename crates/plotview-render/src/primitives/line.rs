//! Line segment primitive.

use super::Geometry;
use kurbo::{BezPath, Point, Rect};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Line {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl Line {
    pub fn start(&self) -> Point {
        Point::new(self.x1, self.y1)
    }

    pub fn end(&self) -> Point {
        Point::new(self.x2, self.y2)
    }
}

impl Geometry for Line {
    fn to_path(&self) -> Option<BezPath> {
        let mut path = BezPath::new();
        path.move_to(self.start());
        path.line_to(self.end());
        Some(path)
    }

    fn bounds(&self) -> Option<Rect> {
        Some(Rect::from_points(self.start(), self.end()))
    }
}
