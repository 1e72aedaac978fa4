//! Kinematic bodies and their axis-separated integration
//!
//! Every moving thing in the world (worms, bullets, ropes, decorations) is a
//! [`Body`]. Bodies that collide also carry [`Extents`], a box around their
//! position that never changes after construction.

use serde::{Deserialize, Serialize};

use crate::util::vec2::Vec2;

/// Which medium a body occupies; drives drag, buoyancy and friction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Medium {
    Ground,
    Air,
    Water,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Static physical properties of a body kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyParams {
    pub mass: f32,
    pub resistance_rate: f32,
    pub capacity: f32,
    /// Fraction of gravity the body ignores
    pub anti_gravity: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Resultant force of the current tick; rebuilt from zero every tick
    #[serde(skip)]
    pub force: Vec2,
    pub mass: f32,
    pub resistance_rate: f32,
    pub capacity: f32,
    pub residual_gravity: f32,
    pub medium: Medium,
}

impl Body {
    pub fn new(params: BodyParams, position: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            force: Vec2::ZERO,
            mass: params.mass,
            resistance_rate: params.resistance_rate,
            capacity: params.capacity,
            residual_gravity: 1.0 - params.anti_gravity,
            medium: Medium::Air,
        }
    }

    /// Body launched along a screen-space angle
    pub fn launched(params: BodyParams, position: Vec2, angle: f32, speed: f32) -> Self {
        let mut body = Self::new(params, position);
        body.velocity = Vec2::from_angle(angle, speed);
        body
    }

    /// Semi-implicit step on one axis: velocity first, then position
    #[inline]
    pub fn step(&mut self, axis: Axis) {
        match axis {
            Axis::X => {
                self.velocity.x += self.force.x / self.mass;
                self.position.x += self.velocity.x;
            }
            Axis::Y => {
                self.velocity.y += self.force.y / self.mass;
                self.position.y += self.velocity.y;
            }
        }
    }

    /// Exact inverse of [`Body::step`]
    #[inline]
    pub fn step_back(&mut self, axis: Axis) {
        match axis {
            Axis::X => {
                self.position.x -= self.velocity.x;
                self.velocity.x -= self.force.x / self.mass;
            }
            Axis::Y => {
                self.position.y -= self.velocity.y;
                self.velocity.y -= self.force.y / self.mass;
            }
        }
    }

    #[inline]
    pub fn step_both(&mut self) {
        self.step(Axis::X);
        self.step(Axis::Y);
    }

    #[inline]
    pub fn velocity_on(&self, axis: Axis) -> f32 {
        match axis {
            Axis::X => self.velocity.x,
            Axis::Y => self.velocity.y,
        }
    }

    #[inline]
    pub fn set_velocity_on(&mut self, axis: Axis, value: f32) {
        match axis {
            Axis::X => self.velocity.x = value,
            Axis::Y => self.velocity.y = value,
        }
    }
}

/// Distances from a body's position to the four sides of its box.
/// The box is inclusive: it spans `left + right + 1` pixels horizontally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extents {
    pub left: i32,
    pub up: i32,
    pub right: i32,
    pub down: i32,
}

impl Extents {
    pub const fn from_size(width: i32, height: i32) -> Self {
        let left = width >> 1;
        let up = height >> 1;
        Self {
            left,
            up,
            right: width - left - 1,
            down: height - up - 1,
        }
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.left + self.right + 1
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.up + self.down + 1
    }

    /// Smaller of the four half-extents
    #[inline]
    pub fn min_half_extent(&self) -> i32 {
        self.left.min(self.up).min(self.right).min(self.down)
    }
}

/// Inclusive box overlap test of two bounded bodies
#[inline]
pub fn boxes_overlap(a: Vec2, a_ext: Extents, b: Vec2, b_ext: Extents) -> bool {
    let (a_left, a_right) = (a.x - a_ext.left as f32, a.x + a_ext.right as f32);
    let (a_top, a_bottom) = (a.y - a_ext.up as f32, a.y + a_ext.down as f32);
    let (b_left, b_right) = (b.x - b_ext.left as f32, b.x + b_ext.right as f32);
    let (b_top, b_bottom) = (b.y - b_ext.up as f32, b.y + b_ext.down as f32);
    !(b_right < a_left || a_right < b_left || b_bottom < a_top || a_bottom < b_top)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARAMS: BodyParams = BodyParams {
        mass: 2.0,
        resistance_rate: 0.1,
        capacity: 0.0,
        anti_gravity: 0.25,
    };

    #[test]
    fn test_extents_from_size() {
        let worm = Extents::from_size(21, 26);
        assert_eq!(worm, Extents { left: 10, up: 13, right: 10, down: 12 });
        assert_eq!(worm.width(), 21);
        assert_eq!(worm.height(), 26);
        assert_eq!(worm.min_half_extent(), 10);

        let bullet = Extents::from_size(4, 4);
        assert_eq!(bullet, Extents { left: 2, up: 2, right: 1, down: 1 });
    }

    #[test]
    fn test_residual_gravity() {
        let body = Body::new(PARAMS, Vec2::ZERO);
        assert!((body.residual_gravity - 0.75).abs() < 1e-6);
        assert_eq!(body.medium, Medium::Air);
    }

    #[test]
    fn test_step_is_semi_implicit() {
        let mut body = Body::new(PARAMS, Vec2::new(10.0, 10.0));
        body.velocity = Vec2::new(1.0, 0.0);
        body.force = Vec2::new(2.0, 4.0);
        body.step(Axis::X);
        // v = 1 + 2 / 2, then x += v
        assert_eq!(body.velocity.x, 2.0);
        assert_eq!(body.position.x, 12.0);
        assert_eq!(body.position.y, 10.0);
        body.step(Axis::Y);
        assert_eq!(body.velocity.y, 2.0);
        assert_eq!(body.position.y, 12.0);
    }

    #[test]
    fn test_step_back_inverts_step() {
        let mut body = Body::new(PARAMS, Vec2::new(10.0, 10.0));
        body.velocity = Vec2::new(1.5, -0.5);
        body.force = Vec2::new(0.5, 1.0);
        let before = body.clone();
        body.step(Axis::X);
        body.step_back(Axis::X);
        body.step(Axis::Y);
        body.step_back(Axis::Y);
        assert!(body.position.approx_eq(before.position, 1e-6));
        assert!(body.velocity.approx_eq(before.velocity, 1e-6));
    }

    #[test]
    fn test_launched() {
        let body = Body::launched(PARAMS, Vec2::ZERO, std::f32::consts::FRAC_PI_2, 8.0);
        assert!(body.velocity.approx_eq(Vec2::new(0.0, -8.0), 1e-5));
    }

    #[test]
    fn test_boxes_overlap_inclusive() {
        let ext = Extents::from_size(4, 4);
        // a spans x in [8, 11]; b spans [12, 15]
        assert!(!boxes_overlap(Vec2::new(10.0, 0.0), ext, Vec2::new(14.0, 0.0), ext));
        // b spans [11, 14]: touching on the x = 11 column
        assert!(boxes_overlap(Vec2::new(10.0, 0.0), ext, Vec2::new(13.0, 0.0), ext));
        assert!(!boxes_overlap(Vec2::new(0.0, 0.0), ext, Vec2::new(0.0, 20.0), ext));
    }
}
