//! Lookup tables computed once at engine construction
//!
//! Neither table changes after it is built; the engine holds them by value
//! and snapshots copy the palette out for renderers.

use serde::{Deserialize, Serialize};

use crate::game::body::Extents;
use crate::game::constants::explosion::{ZONE_COUNT, ZONE_SPACING};
use crate::game::constants::worm;
use crate::util::angle;
use crate::util::vec2::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Blood decoration color
pub const BLOOD: Rgb = Rgb::new(255, 0, 0);
pub const LASER: Rgb = Rgb::new(250, 160, 160);
pub const LIGHTNING: Rgb = Rgb::new(250, 250, 160);

/// Colors of the concentric explosion zones, outermost first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplosionPalette {
    pub zones: [Rgb; ZONE_COUNT],
    pub zone_spacing: i32,
}

impl ExplosionPalette {
    pub fn new() -> Self {
        let mut zones = [Rgb::new(0, 0, 0); ZONE_COUNT];
        for (i, zone) in zones.iter_mut().enumerate() {
            let fade = (i as i32 * ZONE_SPACING) / 2;
            *zone = Rgb::new((240 - fade) as u8, (160 - fade) as u8, 0);
        }
        Self {
            zones,
            zone_spacing: ZONE_SPACING,
        }
    }
}

impl Default for ExplosionPalette {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalized angles from a box's center to its four corners. Used to tell
/// whether a ray leaves the box through a horizontal or a vertical side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CornerAngles {
    pub right_up: f32,
    pub left_up: f32,
    pub left_down: f32,
    pub right_down: f32,
}

impl CornerAngles {
    pub fn new(extents: Extents) -> Self {
        let corner = |x: i32, y: i32| angle::normalize(Vec2::ZERO.angle_to(Vec2::new(x as f32, y as f32)));
        Self {
            right_up: corner(extents.right, -extents.up),
            left_up: corner(-extents.left, -extents.up),
            left_down: corner(-extents.left, extents.down),
            right_down: corner(extents.right, extents.down),
        }
    }

    /// Whether a ray at `angle` exits through the top or bottom side
    pub fn exits_vertically(&self, angle: f32) -> bool {
        let a = angle::normalize(angle);
        angle::between(a, self.right_up, self.left_up)
            || angle::between(a, self.left_down, self.right_down)
    }
}

/// Everything precomputed the engine needs
#[derive(Debug, Clone, Copy)]
pub struct StaticTables {
    pub palette: ExplosionPalette,
    pub worm_corners: CornerAngles,
    pub worm_extents: Extents,
}

impl StaticTables {
    pub fn new() -> Self {
        let worm_extents = Extents::from_size(worm::WIDTH, worm::HEIGHT);
        Self {
            palette: ExplosionPalette::new(),
            worm_corners: CornerAngles::new(worm_extents),
            worm_extents,
        }
    }
}

impl Default for StaticTables {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_palette_values() {
        let palette = ExplosionPalette::new();
        assert_eq!(palette.zones[0], Rgb::new(240, 160, 0));
        assert_eq!(palette.zones[1], Rgb::new(233, 153, 0));
        assert_eq!(palette.zones[7], Rgb::new(188, 108, 0));
        assert_eq!(palette.zone_spacing, 15);
    }

    #[test]
    fn test_corner_angles_are_ordered() {
        let corners = CornerAngles::new(Extents::from_size(21, 26));
        assert!(corners.right_up > 0.0 && corners.right_up < FRAC_PI_2);
        assert!(corners.left_up > FRAC_PI_2 && corners.left_up < PI);
        assert!(corners.left_down > PI && corners.left_down < 1.5 * PI);
        assert!(corners.right_down > 1.5 * PI && corners.right_down < 2.0 * PI);
    }

    #[test]
    fn test_exits_vertically() {
        let corners = CornerAngles::new(Extents::from_size(21, 26));
        assert!(corners.exits_vertically(FRAC_PI_2));
        assert!(corners.exits_vertically(-FRAC_PI_2));
        assert!(!corners.exits_vertically(0.0));
        assert!(!corners.exits_vertically(PI));
    }
}
