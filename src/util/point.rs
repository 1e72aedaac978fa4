use serde::{Deserialize, Serialize};

use super::vec2::Vec2;

/// Integer pixel coordinate, used where the simulation works on whole
/// pixels (explosion centers and polyline vertices).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    #[inline]
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Truncates a world position toward zero, the way every body position
    /// is snapped before grid and pixel tests.
    #[inline]
    pub fn from_vec2(v: Vec2) -> Self {
        Self {
            x: v.x as i32,
            y: v.y as i32,
        }
    }

    #[inline]
    pub fn to_vec2(self) -> Vec2 {
        Vec2::new(self.x as f32, self.y as f32)
    }

    #[inline]
    pub fn distance_sq_to(&self, other: Point) -> i64 {
        let dx = (other.x - self.x) as i64;
        let dy = (other.y - self.y) as i64;
        dx * dx + dy * dy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_vec2_truncates_toward_zero() {
        assert_eq!(Point::from_vec2(Vec2::new(3.9, -3.9)), Point::new(3, -3));
        assert_eq!(Point::from_vec2(Vec2::new(-0.5, 0.5)), Point::new(0, 0));
    }

    #[test]
    fn test_distance_sq() {
        assert_eq!(Point::new(0, 0).distance_sq_to(Point::new(3, 4)), 25);
    }
}
