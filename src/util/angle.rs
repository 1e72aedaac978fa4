//! Angle helpers shared by the weapon and rope code.

use std::f32::consts::TAU;

/// Puts an angle into `[0, TAU)`.
#[inline]
pub fn normalize(angle: f32) -> f32 {
    let normalized = angle - (angle / TAU).floor() * TAU;
    // Rounding can land exactly on TAU for tiny negative inputs
    if normalized >= TAU {
        0.0
    } else {
        normalized
    }
}

/// Inclusive range test.
#[inline]
pub fn between(value: f32, low: f32, high: f32) -> bool {
    value >= low && value <= high
}
