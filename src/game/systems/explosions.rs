//! Expanding-then-shrinking blast areas
//!
//! An explosion shrinks by a fixed amount every tick and deals its damage
//! each tick it is still alive: to every worm within reach, to every brick
//! whose center is within reach, and it sets off explosive bullets inside
//! the radius, which chain into new explosions on the next tick.

use crate::game::state::{Explosion, GameState};
use crate::game::systems::{bullets, combat};

pub fn update(state: &mut GameState) {
    let mut index = state.explosions.len();
    while index > 0 {
        index -= 1;
        if state.explosions[index].shrink() <= 0 {
            state.explosions.remove(index);
            continue;
        }
        let explosion = state.explosions[index];
        blast(state, explosion);

        let mut bullet = state.bullets.len();
        while bullet > 0 {
            bullet -= 1;
            let candidate = &state.bullets[bullet];
            if candidate.is_explodable() && explosion.reaches(candidate.body.position) {
                bullets::detonate(state, bullet);
            }
        }
    }
}

/// Damages worms (highest slot first) and walls within an explosion's reach
pub fn blast(state: &mut GameState, explosion: Explosion) {
    for slot in (0..state.worms.len()).rev() {
        let reached = state.worm(slot).is_some_and(|worm| explosion.reaches(worm.position()));
        if reached {
            combat::damage_worm(state, slot, explosion.damage, explosion.owner);
        }
    }
    combat::damage_walls_in_radius(state, explosion.center, explosion.radius, explosion.damage);
}
