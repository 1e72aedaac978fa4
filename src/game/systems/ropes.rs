//! Grapple ropes
//!
//! A cast rope flies as its own body until it touches terrain or another
//! worm. Once attached it constrains its owner to swing around the anchor:
//! radial velocity is removed, the radial part of the owner's force is
//! cancelled and a centripetal pull keeps the swing going. A rope hooked onto
//! a worm passes the opposite force on to that worm.

use tracing::debug;

use crate::game::constants::rope::CLIMBING_VELOCITY;
use crate::game::state::{GameState, Rope, RopeAnchor, Slot};
use crate::game::systems::forces;
use crate::util::vec2::Vec2;

/// Below this rope length no centripetal force is applied
const MIN_SWING_RADIUS: f32 = 1e-3;

pub fn update(state: &mut GameState) {
    for slot in 0..state.worms.len() {
        let Some(mut rope) = state.worm_mut(slot).and_then(|worm| worm.rope.take()) else {
            continue;
        };

        let keep = match rope.anchor {
            Some(RopeAnchor::Wall) => state.terrain.hits_box(rope.body.position, rope.extents),
            Some(RopeAnchor::Worm(anchor)) => state.worm(anchor).is_some(),
            None => {
                fly(state, slot, &mut rope);
                true
            }
        };
        if !keep {
            debug!("Rope of worm {} lost its anchor", slot);
            continue;
        }
        if rope.is_attached() {
            swing(state, slot, &rope);
        }
        if let Some(worm) = state.worm_mut(slot) {
            worm.rope = Some(rope);
        }
    }
}

fn fly(state: &GameState, owner: Slot, rope: &mut Rope) {
    forces::calculate(&mut rope.body, state.rules.wind);
    rope.body.step_both();
    if state.terrain.hits_box(rope.body.position, rope.extents) {
        rope.anchor = Some(RopeAnchor::Wall);
    } else if let Some(hooked) = state.worm_hit(rope.body.position, rope.extents, Some(owner)) {
        rope.anchor = Some(RopeAnchor::Worm(hooked));
    }
    if let Some(anchor) = rope.anchor {
        debug!("Rope of worm {} attached to {:?}", owner, anchor);
    }
}

/// Applies the rope constraint to the owner of an attached rope
fn swing(state: &mut GameState, owner: Slot, rope: &Rope) {
    let Some(end) = rope.end_position(&state.worms) else {
        return;
    };
    let Some(worm) = state.worm_mut(owner) else {
        return;
    };
    let start = worm.body.position;
    let along = Vec2::from_angle(start.angle_to(end), 1.0);

    let velocity = worm.body.velocity;
    worm.body.velocity = velocity - along * velocity.dot(along);
    let force = worm.body.force;
    let mut tension = -(along * force.dot(along));

    if rope.climbing_up {
        worm.body.velocity += along * CLIMBING_VELOCITY;
    }
    if rope.climbing_down {
        worm.body.velocity -= along * CLIMBING_VELOCITY;
    }

    let radius = start.distance_to(end);
    if radius > MIN_SWING_RADIUS {
        let centripetal = worm.body.mass * worm.body.velocity.length_sq() / radius;
        tension += along * centripetal;
    }
    worm.body.force += tension;

    if let Some(RopeAnchor::Worm(anchor)) = rope.anchor {
        if let Some(hooked) = state.worm_mut(anchor) {
            hooked.body.force -= tension;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::terrain::WallType;
    use crate::game::systems::testing::{create_test_state, live, place_worm};
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_flying_rope_attaches_to_wall() {
        let mut state = create_test_state();
        place_worm(&mut state, 0, Vec2::new(200.0, 80.0));
        live(&mut state, 0).rope = Some(Rope::cast(Vec2::new(200.0, 80.0), FRAC_PI_2));
        for _ in 0..10 {
            update(&mut state);
        }
        let rope = live(&mut state, 0).rope.clone().expect("rope kept");
        assert_eq!(rope.anchor, Some(RopeAnchor::Wall));
    }

    #[test]
    fn test_flying_rope_hooks_other_worm() {
        let mut state = create_test_state();
        place_worm(&mut state, 0, Vec2::new(200.0, 200.0));
        place_worm(&mut state, 1, Vec2::new(260.0, 200.0));
        live(&mut state, 0).rope = Some(Rope::cast(Vec2::new(200.0, 200.0), 0.0));
        for _ in 0..5 {
            update(&mut state);
        }
        let rope = live(&mut state, 0).rope.clone().expect("rope kept");
        assert_eq!(rope.anchor, Some(RopeAnchor::Worm(1)));
    }

    #[test]
    fn test_rope_released_when_wall_disappears() {
        let mut state = create_test_state();
        state.terrain.set_wall(6, 3, WallType::Brick);
        place_worm(&mut state, 0, Vec2::new(200.0, 200.0));
        let mut rope = Rope::cast(Vec2::new(208.0, 112.0), 0.0);
        rope.anchor = Some(RopeAnchor::Wall);
        live(&mut state, 0).rope = Some(rope);

        update(&mut state);
        assert!(live(&mut state, 0).rope.is_some());

        state.terrain.clear_wall(6, 3);
        update(&mut state);
        assert!(live(&mut state, 0).rope.is_none());
    }

    #[test]
    fn test_rope_released_when_anchor_worm_leaves() {
        let mut state = create_test_state();
        place_worm(&mut state, 0, Vec2::new(200.0, 200.0));
        let mut rope = Rope::cast(Vec2::new(200.0, 200.0), 0.0);
        rope.anchor = Some(RopeAnchor::Worm(1));
        live(&mut state, 0).rope = Some(rope);
        update(&mut state);
        assert!(live(&mut state, 0).rope.is_none());
    }

    #[test]
    fn test_swing_removes_radial_velocity() {
        let mut state = create_test_state();
        state.terrain.set_wall(6, 3, WallType::Brick);
        let worm = place_worm(&mut state, 0, Vec2::new(208.0, 240.0));
        // Anchor straight above; moving down and sideways
        let mut rope = Rope::cast(Vec2::new(208.0, 112.0), 0.0);
        rope.anchor = Some(RopeAnchor::Wall);
        worm.rope = Some(rope);
        worm.body.velocity = Vec2::new(2.0, 3.0);
        worm.body.force = Vec2::new(0.0, 0.5);

        update(&mut state);
        let worm = live(&mut state, 0);
        assert!((worm.body.velocity.x - 2.0).abs() < 1e-4);
        assert!(worm.body.velocity.y.abs() < 1e-4);
        // Gravity cancelled, centripetal pull toward the anchor
        assert!(worm.body.force.y < 0.0);
        assert!(worm.body.force.x.abs() < 1e-4);
    }

    #[test]
    fn test_climbing_moves_toward_anchor() {
        let mut state = create_test_state();
        state.terrain.set_wall(6, 3, WallType::Brick);
        let worm = place_worm(&mut state, 0, Vec2::new(208.0, 240.0));
        let mut rope = Rope::cast(Vec2::new(208.0, 112.0), 0.0);
        rope.anchor = Some(RopeAnchor::Wall);
        rope.climbing_up = true;
        worm.rope = Some(rope);

        update(&mut state);
        let worm = live(&mut state, 0);
        assert!((worm.body.velocity.y + CLIMBING_VELOCITY).abs() < 1e-4);
    }

    #[test]
    fn test_hooked_worm_is_pulled_back() {
        let mut state = create_test_state();
        place_worm(&mut state, 0, Vec2::new(200.0, 200.0)).body.force = Vec2::new(-1.0, 0.0);
        place_worm(&mut state, 1, Vec2::new(300.0, 200.0));
        let mut rope = Rope::cast(Vec2::new(300.0, 200.0), 0.0);
        rope.anchor = Some(RopeAnchor::Worm(1));
        live(&mut state, 0).rope = Some(rope);

        update(&mut state);
        assert!(live(&mut state, 0).body.force.x.abs() < 1e-4);
        assert!((live(&mut state, 1).body.force.x + 1.0).abs() < 1e-4);
    }
}
