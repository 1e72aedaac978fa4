//! Cosmetic particles: blood and wall rubble
//!
//! Decorations fly under the common force model and vanish on the first
//! solid pixel they touch. They never interact with anything else.

use std::f32::consts::TAU;

use rand::Rng;

use crate::game::constants::decoration::VELOCITY;
use crate::game::constants::terrain::{RUBBLES_PER_WALL, WALL_HEIGHT, WALL_WIDTH};
use crate::game::constants::worm::{MAX_HIT_POINTS, TOTAL_BLOOD};
use crate::game::state::{medium_at, Decoration, GameState, Slot};
use crate::game::systems::forces;
use crate::game::tables::BLOOD;
use crate::game::terrain::Cell;
use crate::util::vec2::Vec2;

pub fn update(state: &mut GameState) {
    let GameState {
        decorations,
        terrain,
        rules,
        ..
    } = state;

    decorations.retain_mut(|decoration| {
        forces::calculate(&mut decoration.body, rules.wind);
        decoration.body.step_both();
        if terrain.point_hits(decoration.body.position) {
            return false;
        }
        decoration.body.medium = medium_at(terrain, decoration.body.position);
        true
    });
}

/// Number of blood drops for a hit, scaled by the blood amount option
#[inline]
pub fn blood_count(blood_percent: u8, damage: i32) -> i32 {
    TOTAL_BLOOD * blood_percent as i32 * damage / MAX_HIT_POINTS / 100
}

/// Sprays blood from random points inside a worm's box
pub fn spawn_blood(state: &mut GameState, slot: Slot, damage: i32) {
    let Some(worm) = state.worm(slot) else {
        return;
    };
    let origin = worm.position() - Vec2::new(worm.extents.left as f32, worm.extents.up as f32);
    let (width, height) = (worm.extents.width() as f32, worm.extents.height() as f32);
    let count = blood_count(state.rules.blood_percent, damage);
    let tick = state.tick;

    for _ in 0..count {
        let offset = Vec2::new(state.rng.gen::<f32>() * width, state.rng.gen::<f32>() * height);
        let angle = state.rng.gen::<f32>() * TAU;
        state
            .decorations
            .push(Decoration::new(origin + offset, angle, VELOCITY, tick, false, Some(BLOOD)));
    }
}

/// Scatters rubble over a destroyed cell
pub fn spawn_rubble(state: &mut GameState, cell: Cell) {
    let origin = cell.origin().to_vec2();
    let count = RUBBLES_PER_WALL * state.rules.rubble_percent as i32 / 100;
    let tick = state.tick;

    for _ in 0..count {
        let offset = Vec2::new(
            state.rng.gen::<f32>() * WALL_WIDTH as f32,
            state.rng.gen::<f32>() * WALL_HEIGHT as f32,
        );
        let angle = state.rng.gen::<f32>() * TAU;
        state
            .decorations
            .push(Decoration::new(origin + offset, angle, VELOCITY, tick, true, None));
    }
}
