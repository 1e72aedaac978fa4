//! Polyline shot geometry
//!
//! Lasers are traced through the terrain, bending at every air/water
//! boundary; lightning is a randomly displaced midpoint subdivision between
//! two points. Both produce integer pixel vertices.

use std::f32::consts::{FRAC_PI_2, PI};

use rand::Rng;

use crate::game::body::Extents;
use crate::game::constants::weapons::{
    AIR_TO_WATER_INDEX, LASER_MAX_SEGMENTS, LASER_STEP, LIGHTNING_COMPONENTS, LIGHTNING_DISPERSION,
    THUNDERBOLT_MAX_RANGE,
};
use crate::game::state::Vertices;
use crate::game::terrain::{Cell, TerrainMap, WallType};
use crate::util::angle;
use crate::util::point::Point;
use crate::util::vec2::Vec2;

const ONE_AND_A_HALF_PI: f32 = 1.5 * PI;

// ============================================================================
// Laser
// ============================================================================

/// Side of a cell a ray entered through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Up,
    Down,
    Left,
    Right,
}

impl Side {
    /// Rotation that turns this side's normal onto the upper side's
    fn rotation(self) -> f32 {
        match self {
            Side::Up => 0.0,
            Side::Left => -FRAC_PI_2,
            Side::Down => -PI,
            Side::Right => -ONE_AND_A_HALF_PI,
        }
    }
}

/// Result of a ray meeting a medium boundary
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bend {
    Reflected(f32),
    Refracted(f32),
}

/// New direction of a ray at `angle` entering through `side`, where
/// `index_ratio` is the refractive index of the new medium over the old one
pub fn bend_at_boundary(angle: f32, side: Side, index_ratio: f32) -> Bend {
    let rotation = side.rotation();
    let rotated = angle::normalize(angle + rotation);
    let below = rotated < ONE_AND_A_HALF_PI;
    let alpha = if below {
        ONE_AND_A_HALF_PI - rotated
    } else {
        rotated - ONE_AND_A_HALF_PI
    };
    let sin_alpha = alpha.sin();

    if sin_alpha > index_ratio {
        Bend::Reflected(FRAC_PI_2 + if below { alpha } else { -alpha } - rotation)
    } else {
        let beta = (sin_alpha / index_ratio).asin();
        Bend::Refracted(ONE_AND_A_HALF_PI + if below { -beta } else { beta } - rotation)
    }
}

fn crossed_side(last: Cell, current: Cell) -> Side {
    if last.y < current.y {
        Side::Up
    } else if last.y > current.y {
        Side::Down
    } else if last.x < current.x {
        Side::Left
    } else {
        Side::Right
    }
}

/// Advances the ray to its next breaking point: a solid cell or the first
/// point in the other medium
fn next_breaking_point(terrain: &TerrainMap, position: &mut Vec2, direction: &mut f32) {
    let started_empty = terrain.wall_at(*position) == WallType::Empty;
    let step = Vec2::from_angle(*direction, LASER_STEP);

    let mut wall = terrain.wall_at(*position);
    while !(wall.is_solid() || started_empty != (wall == WallType::Empty)) {
        *position += step;
        wall = terrain.wall_at(*position);
    }
    if wall.is_solid() {
        return;
    }

    let side = crossed_side(Cell::at(*position - step), Cell::at(*position));
    let ratio = if started_empty {
        AIR_TO_WATER_INDEX
    } else {
        1.0 / AIR_TO_WATER_INDEX
    };
    match bend_at_boundary(*direction, side, ratio) {
        Bend::Reflected(angle) => {
            *direction = angle;
            // Stay in the medium the ray came from
            *position -= step;
        }
        Bend::Refracted(angle) => *direction = angle,
    }
}

/// Traces a laser from `start` until it ends inside a solid cell. The first
/// vertex is the start; every breaking point adds one more.
pub fn trace_laser(terrain: &TerrainMap, start: Point, direction: f32) -> Vertices {
    let mut vertices = Vertices::new();
    let mut position = start.to_vec2();
    let mut direction = direction;
    vertices.push(start);

    while vertices.len() <= LASER_MAX_SEGMENTS {
        next_breaking_point(terrain, &mut position, &mut direction);
        let point = Point::from_vec2(position);
        vertices.push(point);
        if terrain.wall_at_cell(Cell::containing(point)).is_solid() {
            break;
        }
    }
    vertices
}

/// Whether a polyline crosses one of the four edges of a box. With
/// `skip_first` the first segment is ignored (the shooter's own muzzle leg).
pub fn polyline_crosses_box(vertices: &[Point], position: Vec2, extents: Extents, skip_first: bool) -> bool {
    let center = Point::from_vec2(position);
    let x1 = center.x - extents.left;
    let x2 = center.x + extents.right;
    let y1 = center.y - extents.up;
    let y2 = center.y + extents.down;

    vertices.windows(2).skip(usize::from(skip_first)).any(|segment| {
        let (a, b) = (segment[0], segment[1]);
        crosses_vertical(a, b, x1, y1, y2)
            || crosses_horizontal(a, b, y1, x1, x2)
            || crosses_vertical(a, b, x2, y1, y2)
            || crosses_horizontal(a, b, y2, x1, x2)
    })
}

#[inline]
fn between(value: i32, a: i32, b: i32) -> bool {
    value >= a.min(b) && value <= a.max(b)
}

/// Segment `a`-`b` against the horizontal line `y` spanning `x1..=x2`
fn crosses_horizontal(a: Point, b: Point, y: i32, x1: i32, x2: i32) -> bool {
    if a.y == b.y || !between(y, a.y, b.y) {
        return false;
    }
    let x = a.x + (y - a.y) * (b.x - a.x) / (b.y - a.y);
    between(x, x1, x2)
}

/// Segment `a`-`b` against the vertical line `x` spanning `y1..=y2`
fn crosses_vertical(a: Point, b: Point, x: i32, y1: i32, y2: i32) -> bool {
    if a.x == b.x || !between(x, a.x, b.x) {
        return false;
    }
    let y = a.y + (x - a.x) * (b.y - a.y) / (b.x - a.x);
    between(y, y1, y2)
}

// ============================================================================
// Lightning
// ============================================================================

/// End point of a thunderbolt fired from `start` toward `aim`
pub fn lightning_end(start: Point, direction: f32, aim: Vec2) -> Point {
    let range = THUNDERBOLT_MAX_RANGE.min(start.to_vec2().distance_to(aim) as i32);
    let range = range as f32;
    Point::new(
        start.x + (direction.cos() * range) as i32,
        start.y - (direction.sin() * range) as i32,
    )
}

/// Builds a lightning path: start, displaced midpoints in path order, end
pub fn generate_lightning<R: Rng + ?Sized>(start: Point, end: Point, rng: &mut R) -> Vertices {
    let mut vertices = Vertices::new();
    vertices.push(start);
    subdivide(&mut vertices, start, end, LIGHTNING_COMPONENTS - 1, rng);
    vertices.push(end);
    vertices
}

fn subdivide<R: Rng + ?Sized>(vertices: &mut Vertices, from: Point, to: Point, budget: usize, rng: &mut R) {
    let jitter = |rng: &mut R| ((rng.gen::<f32>() - 0.5) * LIGHTNING_DISPERSION) as i32;
    let middle = Point::new(
        ((from.x + to.x) >> 1) + jitter(rng),
        ((from.y + to.y) >> 1) + jitter(rng),
    );
    if budget >= 3 {
        subdivide(vertices, from, middle, budget >> 1, rng);
    }
    vertices.push(middle);
    if budget >= 3 {
        subdivide(vertices, middle, to, budget >> 1, rng);
    }
}
