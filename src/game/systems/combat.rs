//! Damage, kill attribution and rebirth
//!
//! Every source of harm funnels through [`damage_worm`] or [`damage_wall`].
//! A worm that runs out of hit points is reborn in the same tick, so a slot
//! holds a live worm for as long as its player stays connected.

use tracing::debug;

use crate::game::constants::terrain::{WALL_HEIGHT, WALL_HEIGHT_SHIFT, WALL_WIDTH, WALL_WIDTH_SHIFT};
use crate::game::state::{GameEvent, GameState, GameType, RopeAnchor, Slot};
use crate::game::systems::{decorations, spawn};
use crate::game::terrain::{Cell, WallType};
use crate::util::point::Point;

/// Subtracts hit points from a worm, attributing the kill to `damager`.
/// Worms already at zero shed no blood.
pub fn damage_worm(state: &mut GameState, victim: Slot, damage: i32, damager: Option<Slot>) {
    let Some(worm) = state.worm(victim) else {
        return;
    };
    if worm.hit_points > 0 {
        decorations::spawn_blood(state, victim, damage);
    }

    let Some(worm) = state.worm_mut(victim) else {
        return;
    };
    worm.hit_points = (worm.hit_points - damage).max(0);
    if worm.hit_points > 0 {
        return;
    }
    worm.deaths += 1;
    let victim_name = worm.name.clone();
    let victim_team = worm.team_id();

    let killer = damager.filter(|&slot| slot != victim);
    let game_type = state.rules.game_type;
    let killer = killer.and_then(|slot| {
        let worm = state.worm_mut(slot)?;
        if game_type == GameType::TeamMelee && worm.team_id() == victim_team {
            worm.kills -= 1;
        } else {
            worm.kills += 1;
        }
        Some((slot, worm.name.clone()))
    });

    debug!(
        "Worm {} ({}) killed by {:?}",
        victim,
        victim_name,
        killer.as_ref().map(|(slot, _)| slot)
    );
    rebirth(state, victim);
    state.events.push(GameEvent::WormKilled {
        victim,
        victim_name,
        killer,
    });
}

/// Damages a brick cell; destroyed bricks turn into their row's open type
/// and leave rubble behind. Any other cell type is left alone.
pub fn damage_wall(state: &mut GameState, cell: Cell, damage: i32) {
    if state.terrain.wall_at_cell(cell) != WallType::Brick {
        return;
    }
    if !state.wall_hit_points.damage(cell, damage) {
        return;
    }
    decorations::spawn_rubble(state, cell);
    state.terrain.clear_wall(cell.x, cell.y);
    state.events.push(GameEvent::WallDestroyed { cell });
    debug!("Wall ({}, {}) destroyed", cell.x, cell.y);
}

/// Damages every cell whose center lies within `radius` of `center`
pub fn damage_walls_in_radius(state: &mut GameState, center: Point, radius: i32, damage: i32) {
    let snap = |value: i32, shift: i32, size: i32| ((value >> shift) << shift) + size / 2;
    let (min_x, max_x) = (
        snap(center.x - radius, WALL_WIDTH_SHIFT, WALL_WIDTH),
        snap(center.x + radius, WALL_WIDTH_SHIFT, WALL_WIDTH),
    );
    let (min_y, max_y) = (
        snap(center.y - radius, WALL_HEIGHT_SHIFT, WALL_HEIGHT),
        snap(center.y + radius, WALL_HEIGHT_SHIFT, WALL_HEIGHT),
    );
    let r2 = radius as i64 * radius as i64;

    for y in (min_y..=max_y).step_by(WALL_HEIGHT as usize) {
        for x in (min_x..=max_x).step_by(WALL_WIDTH as usize) {
            let cell_center = Point::new(x, y);
            if cell_center.distance_sq_to(center) <= r2 {
                damage_wall(state, Cell::containing(cell_center), damage);
            }
        }
    }
}

/// Respawns a worm at a fresh position with full hit points and oxygen.
/// Ropes of other worms hooked onto it are released first.
pub fn rebirth(state: &mut GameState, slot: Slot) {
    release_ropes_anchored_to(state, slot);
    let cell = spawn::find_spawn_cell(state, Some(slot));
    if let Some(worm) = state.worm_mut(slot) {
        worm.rebirth(cell.center());
    }
    state.terrain.clear_for_entering_worm(cell);
}

/// Drops every rope hooked onto `slot`
pub fn release_ropes_anchored_to(state: &mut GameState, slot: Slot) {
    for worm in state.worms.iter_mut().flatten() {
        let hooked = worm
            .rope
            .as_ref()
            .is_some_and(|rope| rope.anchor == Some(RopeAnchor::Worm(slot)));
        if hooked {
            worm.rope = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::constants::terrain::{MAX_WALL_HIT_POINTS, RUBBLES_PER_WALL};
    use crate::game::constants::worm::{MAX_HIT_POINTS, MAX_OXYGEN};
    use crate::game::state::Rope;
    use crate::game::systems::testing::{create_test_state, live, place_worm};
    use crate::util::vec2::Vec2;

    #[test]
    fn test_damage_reduces_hit_points_and_bleeds() {
        let mut state = create_test_state();
        place_worm(&mut state, 0, Vec2::new(200.0, 200.0));
        damage_worm(&mut state, 0, 11, Some(1));
        assert_eq!(state.worm(0).map(|w| w.hit_points), Some(MAX_HIT_POINTS - 11));
        assert_eq!(state.decorations.len(), 11);
        assert!(state.events.is_empty());
    }

    #[test]
    fn test_kill_credits_damager_and_rebirths() {
        let mut state = create_test_state();
        place_worm(&mut state, 0, Vec2::new(200.0, 200.0));
        place_worm(&mut state, 1, Vec2::new(300.0, 200.0));
        live(&mut state, 0).hit_points = 5;
        live(&mut state, 0).oxygen = 3;

        damage_worm(&mut state, 0, 11, Some(1));

        let victim = state.worm(0).cloned().expect("victim stays in its slot");
        assert_eq!(victim.hit_points, MAX_HIT_POINTS);
        assert_eq!(victim.oxygen, MAX_OXYGEN);
        assert_eq!(victim.deaths, 1);
        assert_eq!(state.worm(1).map(|w| w.kills), Some(1));
        assert_eq!(
            state.events,
            vec![GameEvent::WormKilled {
                victim: 0,
                victim_name: "worm0".to_string(),
                killer: Some((1, "worm1".to_string())),
            }]
        );
    }

    #[test]
    fn test_hit_points_never_go_negative() {
        let mut state = create_test_state();
        place_worm(&mut state, 0, Vec2::new(200.0, 200.0));
        live(&mut state, 0).hit_points = 1;
        damage_worm(&mut state, 0, 500, None);
        // Reborn only once, with nothing carried over
        assert_eq!(state.worm(0).map(|w| w.deaths), Some(1));
        assert_eq!(state.worm(0).map(|w| w.hit_points), Some(MAX_HIT_POINTS));
    }

    #[test]
    fn test_suicide_changes_no_kills() {
        let mut state = create_test_state();
        place_worm(&mut state, 0, Vec2::new(200.0, 200.0));
        live(&mut state, 0).hit_points = 1;
        damage_worm(&mut state, 0, 5, Some(0));
        assert_eq!(state.worm(0).map(|w| (w.kills, w.deaths)), Some((0, 1)));
        assert_eq!(
            state.events[0].message().as_deref(),
            Some("worm0 committed suicide.")
        );
    }

    #[test]
    fn test_team_kill_is_penalized() {
        let mut state = create_test_state();
        state.rules.game_type = GameType::TeamMelee;
        place_worm(&mut state, 0, Vec2::new(200.0, 200.0));
        place_worm(&mut state, 1, Vec2::new(300.0, 200.0));
        place_worm(&mut state, 2, Vec2::new(400.0, 200.0));
        live(&mut state, 1).color_index = 7;
        live(&mut state, 2).color_index = 7;

        live(&mut state, 2).hit_points = 1;
        damage_worm(&mut state, 2, 5, Some(1));
        assert_eq!(state.worm(1).map(|w| w.kills), Some(-1));

        live(&mut state, 0).hit_points = 1;
        damage_worm(&mut state, 0, 5, Some(1));
        assert_eq!(state.worm(1).map(|w| w.kills), Some(0));
    }

    #[test]
    fn test_kill_by_departed_worm() {
        let mut state = create_test_state();
        place_worm(&mut state, 0, Vec2::new(200.0, 200.0));
        live(&mut state, 0).hit_points = 1;
        damage_worm(&mut state, 0, 5, Some(3));
        assert_eq!(state.worm(0).map(|w| w.deaths), Some(1));
        assert!(matches!(state.events[0], GameEvent::WormKilled { killer: None, .. }));
    }

    #[test]
    fn test_rebirth_releases_hooked_ropes() {
        let mut state = create_test_state();
        place_worm(&mut state, 0, Vec2::new(200.0, 200.0));
        place_worm(&mut state, 1, Vec2::new(300.0, 200.0));
        let mut rope = Rope::cast(Vec2::new(300.0, 200.0), 0.0);
        rope.anchor = Some(RopeAnchor::Worm(0));
        live(&mut state, 1).rope = Some(rope);

        rebirth(&mut state, 0);
        assert!(state.worm(1).is_some_and(|w| w.rope.is_none()));
    }

    #[test]
    fn test_damage_wall_destroys_brick_once() {
        let mut state = create_test_state();
        let cell = Cell::new(4, 4);
        state.terrain.set_wall(cell.x, cell.y, WallType::Brick);

        damage_wall(&mut state, cell, MAX_WALL_HIT_POINTS - 1);
        assert_eq!(state.terrain.wall_at_cell(cell), WallType::Brick);

        damage_wall(&mut state, cell, 1);
        assert_eq!(state.terrain.wall_at_cell(cell), WallType::Empty);
        assert_eq!(state.decorations.len(), RUBBLES_PER_WALL as usize);
        assert_eq!(state.events, vec![GameEvent::WallDestroyed { cell }]);

        // Already open: nothing more happens
        damage_wall(&mut state, cell, 1000);
        assert_eq!(state.events.len(), 1);
        assert_eq!(state.decorations.len(), RUBBLES_PER_WALL as usize);
    }

    #[test]
    fn test_damage_wall_ignores_stone() {
        let mut state = create_test_state();
        damage_wall(&mut state, Cell::new(0, 0), 10_000);
        assert_eq!(state.terrain.wall(0, 0), WallType::Stone);
        assert!(state.events.is_empty());
    }

    #[test]
    fn test_damage_walls_in_radius_uses_cell_centers() {
        let mut state = create_test_state();
        for (x, y) in [(5, 5), (6, 5), (7, 5)] {
            state.terrain.set_wall(x, y, WallType::Brick);
        }
        // Center of cell (5, 5); (6, 5) is 32 away, (7, 5) is 64 away
        let center = Point::new(176, 176);
        damage_walls_in_radius(&mut state, center, 40, MAX_WALL_HIT_POINTS);
        assert_eq!(state.terrain.wall(5, 5), WallType::Empty);
        assert_eq!(state.terrain.wall(6, 5), WallType::Empty);
        assert_eq!(state.terrain.wall(7, 5), WallType::Brick);
    }
}
