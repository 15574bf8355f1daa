//! Screen-space helpers. The y axis grows downward, so a heading of 90° points up the screen.

use serde::{Deserialize, Serialize};

/// A point on the integer pixel grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

impl Point {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

impl core::ops::Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Self) -> Self::Output {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Travel `distance` from `(x, y)` along `angle` degrees, truncating the result toward zero.
/// Sub-pixel remainders are dropped rather than carried.
#[inline]
pub fn project(x: f64, y: f64, distance: f64, angle: f64) -> (f64, f64) {
    let (sin, cos) = angle.to_radians().sin_cos();
    ((x + cos * distance).trunc(), (y - sin * distance).trunc())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_project_axes() {
        assert_eq!(project(0., 0., 5., 0.), (5., 0.));
        assert_eq!(project(0., 0., 5., 90.), (0., -5.));
        assert_eq!(project(0., 0., 5., 180.), (-5., 0.));
        assert_eq!(project(0., 0., 5., 270.), (0., 5.));
    }

    #[test]
    fn test_project_truncates() {
        // cos(45°) * 3 ≈ 2.12, dropped to 2
        assert_eq!(project(0., 10., 3., 45.), (2., 7.));
        // truncation is toward zero, not floor
        assert_eq!(project(0., 0., 3., 135.), (-2., -2.));
    }

    #[test]
    fn test_point_sub() {
        assert_eq!(Point::new(3, 9) - Point::new(5, 4), Point::new(-2, 5));
    }
}
