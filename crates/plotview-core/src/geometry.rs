//! Integer geometry used by the interaction layer.
//!
//! Continuous geometry (points, vectors, sizes, affine transforms) comes from
//! `kurbo`; the interaction layer works on whole content pixels.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// A 2D integer vector in content-space pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Vector {
    pub x: i32,
    pub y: i32,
}

impl Vector {
    pub const ZERO: Vector = Vector { x: 0, y: 0 };

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Round a continuous point to the nearest integer pixel.
    pub fn round_from(point: Point) -> Self {
        Self::new(point.x.round() as i32, point.y.round() as i32)
    }

    /// Convert to a continuous point.
    pub fn to_point(self) -> Point {
        Point::new(self.x as f64, self.y as f64)
    }

    /// Convert to a continuous vector.
    pub fn to_vec2(self) -> Vec2 {
        Vec2::new(self.x as f64, self.y as f64)
    }
}

impl Add for Vector {
    type Output = Vector;

    fn add(self, rhs: Vector) -> Vector {
        Vector::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vector {
    type Output = Vector;

    fn sub(self, rhs: Vector) -> Vector {
        Vector::new(self.x - rhs.x, self.y - rhs.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_from() {
        assert_eq!(Vector::round_from(Point::new(1.4, 2.6)), Vector::new(1, 3));
        assert_eq!(Vector::round_from(Point::new(-1.6, 0.0)), Vector::new(-2, 0));
    }

    #[test]
    fn test_arithmetic() {
        let a = Vector::new(10, 20);
        let b = Vector::new(3, 5);
        assert_eq!(a + b, Vector::new(13, 25));
        assert_eq!(a - b, Vector::new(7, 15));
    }
}
