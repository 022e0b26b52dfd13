//! Circle primitive.

use super::{Geometry, PATH_TOLERANCE};
use kurbo::{BezPath, Point, Rect, Shape as KurboShape};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Circle {
    pub cx: f64,
    pub cy: f64,
    pub r: f64,
}

impl Circle {
    pub fn center(&self) -> Point {
        Point::new(self.cx, self.cy)
    }
}

impl Geometry for Circle {
    fn to_path(&self) -> Option<BezPath> {
        if self.r <= 0.0 {
            return None;
        }
        Some(kurbo::Circle::new(self.center(), self.r).to_path(PATH_TOLERANCE))
    }

    fn bounds(&self) -> Option<Rect> {
        Some(Rect::new(
            self.cx - self.r,
            self.cy - self.r,
            self.cx + self.r,
            self.cy + self.r,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        let circle = Circle {
            cx: 5.0,
            cy: 5.0,
            r: 2.0,
        };
        assert_eq!(circle.bounds(), Some(Rect::new(3.0, 3.0, 7.0, 7.0)));
        assert!(circle.to_path().is_some());
    }
}
