//! Worm motion and survival
//!
//! Each worm first checks its oxygen, then moves along X and Y separately.
//! A blocked axis is retried with halved velocity until the worm fits or the
//! velocity dies out, so worms slide along walls and settle on the ground
//! without ever overlapping terrain or each other.

use tracing::warn;

use crate::game::body::{Axis, Medium};
use crate::game::constants::physics::{MAX_RESOLVE_ITERATIONS, VELOCITY_SNAP};
use crate::game::constants::worm::{DROWNING_DAMAGE, MAX_OXYGEN, OXYGEN_REFILL};
use crate::game::state::{medium_at, worm_hit, GameState, Slot, Worm};
use crate::game::systems::combat;
use crate::util::vec2::Vec2;

pub fn update(state: &mut GameState) {
    for slot in 0..state.worms.len() {
        if state.worm(slot).is_none() {
            continue;
        }
        breathe(state, slot);

        // Out of the slot array while moving, so it never collides with itself
        let Some(mut worm) = state.worms[slot].take() else {
            continue;
        };
        resolve_axis(state, &mut worm, Axis::X);
        worm.body.medium = medium_at(&state.terrain, worm.body.position);
        if resolve_axis(state, &mut worm, Axis::Y).is_some_and(|vy| vy > 0.0) {
            worm.body.medium = Medium::Ground;
        }
        let lost = !worm.body.position.is_finite() || !worm.body.velocity.is_finite();
        state.worms[slot] = Some(worm);

        if lost {
            warn!("Worm {} left the numeric range, respawning", slot);
            if let Some(worm) = state.worm_mut(slot) {
                worm.body.velocity = Vec2::ZERO;
            }
            combat::rebirth(state, slot);
        }
    }
}

fn breathe(state: &mut GameState, slot: Slot) {
    let Some(worm) = state.worm(slot) else {
        return;
    };
    let submerged = worm.body.medium == Medium::Water || state.terrain.wall_at(worm.position()).is_wet();
    if submerged && worm.oxygen == 0 {
        combat::damage_worm(state, slot, DROWNING_DAMAGE, None);
        return;
    }
    if let Some(worm) = state.worm_mut(slot) {
        worm.oxygen = if submerged {
            worm.oxygen - 1
        } else {
            (worm.oxygen + OXYGEN_REFILL).min(MAX_OXYGEN)
        };
    }
}

#[inline]
fn blocked(state: &GameState, worm: &Worm) -> bool {
    state.terrain.hits_box(worm.body.position, worm.extents)
        || worm_hit(&state.worms, worm.body.position, worm.extents, None).is_some()
}

/// Moves the worm along one axis. Returns the axis velocity right after the
/// first step when that step collided.
fn resolve_axis(state: &GameState, worm: &mut Worm, axis: Axis) -> Option<f32> {
    worm.body.step(axis);
    if !blocked(state, worm) {
        return None;
    }
    let impact = worm.body.velocity_on(axis);

    for _ in 0..MAX_RESOLVE_ITERATIONS {
        worm.body.step_back(axis);
        let halved = worm.body.velocity_on(axis) / 2.0;
        let halved = if halved.is_finite() && halved.abs() >= VELOCITY_SNAP {
            halved
        } else {
            0.0
        };
        worm.body.set_velocity_on(axis, halved);
        if halved == 0.0 {
            // Rest at the last free position
            return Some(impact);
        }
        worm.body.step(axis);
        if !blocked(state, worm) {
            return Some(impact);
        }
    }

    worm.body.step_back(axis);
    worm.body.set_velocity_on(axis, 0.0);
    Some(impact)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::constants::worm::MAX_HIT_POINTS;
    use crate::game::systems::testing::{create_test_state, create_test_state_with_water, live, place_worm};
    use crate::game::terrain::{Cell, WallType};

    #[test]
    fn test_worm_falls_and_lands() {
        let mut state = create_test_state();
        place_worm(&mut state, 0, Vec2::new(200.0, 200.0));
        for _ in 0..200 {
            live(&mut state, 0).body.force = Vec2::new(0.0, 0.5);
            update(&mut state);
        }
        let worm = live(&mut state, 0).clone();
        assert_eq!(worm.body.medium, Medium::Ground);
        assert_eq!(worm.body.velocity.y, 0.0);
        // Resting on the bottom border row
        let bottom = (state.terrain.height() - 1) * 32;
        assert!(worm.body.position.y + worm.extents.down as f32 <= bottom as f32);
        assert!(!state.terrain.hits_box(worm.body.position, worm.extents));
    }

    #[test]
    fn test_worm_never_tunnels_into_wall() {
        let mut state = create_test_state();
        state.terrain.set_wall(8, 6, WallType::Stone);
        place_worm(&mut state, 0, Vec2::new(200.0, 208.0)).body.velocity = Vec2::new(60.0, 0.0);
        update(&mut state);
        let worm = live(&mut state, 0).clone();
        assert!(!state.terrain.hits_box(worm.body.position, worm.extents));
        assert!(worm.body.position.x + worm.extents.right as f32 <= 256.0);
    }

    #[test]
    fn test_worms_do_not_overlap() {
        let mut state = create_test_state();
        place_worm(&mut state, 0, Vec2::new(200.0, 200.0)).body.velocity = Vec2::new(10.0, 0.0);
        place_worm(&mut state, 1, Vec2::new(230.0, 200.0));
        update(&mut state);
        let a = state.worm(0).cloned().expect("worm 0");
        let b = state.worm(1).cloned().expect("worm 1");
        assert!(!crate::game::body::boxes_overlap(a.position(), a.extents, b.position(), b.extents));
    }

    #[test]
    fn test_oxygen_drains_under_water_and_refills() {
        let mut state = create_test_state_with_water(50);
        let underwater = Cell::new(5, state.terrain.height() - 3).center();
        place_worm(&mut state, 0, underwater).body.medium = Medium::Water;
        update(&mut state);
        assert_eq!(live(&mut state, 0).oxygen, MAX_OXYGEN - 1);

        let worm = live(&mut state, 0);
        worm.body.position = Vec2::new(200.0, 60.0);
        worm.body.medium = Medium::Air;
        worm.oxygen = MAX_OXYGEN - 15;
        update(&mut state);
        assert_eq!(live(&mut state, 0).oxygen, MAX_OXYGEN - 5);
        update(&mut state);
        assert_eq!(live(&mut state, 0).oxygen, MAX_OXYGEN);
    }

    #[test]
    fn test_drowning_costs_hit_points() {
        let mut state = create_test_state_with_water(50);
        let underwater = Cell::new(5, state.terrain.height() - 3).center();
        let worm = place_worm(&mut state, 0, underwater);
        worm.body.medium = Medium::Water;
        worm.oxygen = 0;
        update(&mut state);
        let worm = live(&mut state, 0);
        assert_eq!(worm.hit_points, MAX_HIT_POINTS - DROWNING_DAMAGE);
        assert_eq!(worm.oxygen, 0);
    }

    #[test]
    fn test_empty_slots_are_skipped() {
        let mut state = create_test_state();
        place_worm(&mut state, 2, Vec2::new(200.0, 200.0));
        update(&mut state);
        assert!(state.worm(0).is_none());
        assert!(state.worm(2).is_some());
    }
}
