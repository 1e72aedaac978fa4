//! Lasers and lightning
//!
//! Polyline shots act exactly once, on the tick they were fired, and are
//! kept for one snapshot so they can be drawn. A laser hurts every worm its
//! path crosses and the cell it ends in; a lightning strikes with a small
//! blast around its end point.

use crate::game::constants::weapons::{LASER_DAMAGE, LIGHTNING_BLAST_DAMAGE, LIGHTNING_BLAST_RADIUS};
use crate::game::shots::polyline_crosses_box;
use crate::game::state::{Explosion, GameState, PolylineShot, ShotKind};
use crate::game::systems::{combat, explosions};
use crate::game::terrain::Cell;

pub fn update(state: &mut GameState) {
    let tick = state.tick;
    let mut index = state.shots.len();
    while index > 0 {
        index -= 1;
        if state.shots[index].spawn_tick != tick {
            state.shots.remove(index);
            continue;
        }
        let shot = state.shots[index].clone();
        match shot.kind {
            ShotKind::Laser => strike_laser(state, &shot),
            ShotKind::Lightning => strike_lightning(state, &shot),
        }
    }
}

fn strike_laser(state: &mut GameState, shot: &PolylineShot) {
    for slot in (0..state.worms.len()).rev() {
        let crossed = state.worm(slot).is_some_and(|worm| {
            polyline_crosses_box(&shot.vertices, worm.position(), worm.extents, slot == shot.shooter)
        });
        if crossed {
            combat::damage_worm(state, slot, LASER_DAMAGE, Some(shot.shooter));
        }
    }
    if let Some(end) = shot.terminal() {
        combat::damage_wall(state, Cell::containing(end), LASER_DAMAGE);
    }
}

fn strike_lightning(state: &mut GameState, shot: &PolylineShot) {
    let Some(end) = shot.terminal() else {
        return;
    };
    let blast = Explosion {
        center: end,
        radius: LIGHTNING_BLAST_RADIUS,
        damage: LIGHTNING_BLAST_DAMAGE,
        owner: Some(shot.shooter),
    };
    explosions::blast(state, blast);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::constants::terrain::MAX_WALL_HIT_POINTS;
    use crate::game::constants::worm::MAX_HIT_POINTS;
    use crate::game::state::Vertices;
    use crate::game::systems::testing::{create_test_state, place_worm};
    use crate::game::terrain::WallType;
    use crate::util::point::Point;
    use crate::util::vec2::Vec2;

    fn create_test_shot(kind: ShotKind, shooter: usize, tick: u64, points: &[(i32, i32)]) -> PolylineShot {
        PolylineShot {
            vertices: points.iter().map(|&(x, y)| Point::new(x, y)).collect::<Vertices>(),
            shooter,
            spawn_tick: tick,
            kind,
        }
    }

    #[test]
    fn test_shot_acts_once_then_expires() {
        let mut state = create_test_state();
        place_worm(&mut state, 1, Vec2::new(300.0, 200.0));
        state.tick = 5;
        state
            .shots
            .push(create_test_shot(ShotKind::Laser, 0, 5, &[(100, 200), (500, 200)]));

        update(&mut state);
        assert_eq!(state.shots.len(), 1);
        assert_eq!(state.worm(1).map(|w| w.hit_points), Some(MAX_HIT_POINTS - LASER_DAMAGE));

        state.tick = 6;
        update(&mut state);
        assert!(state.shots.is_empty());
        assert_eq!(state.worm(1).map(|w| w.hit_points), Some(MAX_HIT_POINTS - LASER_DAMAGE));
    }

    #[test]
    fn test_laser_skips_shooter_muzzle_leg() {
        let mut state = create_test_state();
        place_worm(&mut state, 0, Vec2::new(200.0, 200.0));
        state
            .shots
            .push(create_test_shot(ShotKind::Laser, 0, 0, &[(150, 200), (250, 200)]));
        update(&mut state);
        assert_eq!(state.worm(0).map(|w| w.hit_points), Some(MAX_HIT_POINTS));
    }

    #[test]
    fn test_laser_damages_terminal_cell() {
        let mut state = create_test_state();
        state.terrain.set_wall(10, 6, WallType::Brick);
        state
            .shots
            .push(create_test_shot(ShotKind::Laser, 0, 0, &[(100, 200), (330, 200)]));
        update(&mut state);
        assert_eq!(
            state.wall_hit_points.get(Cell::new(10, 6)),
            Some(MAX_WALL_HIT_POINTS - LASER_DAMAGE)
        );
    }

    #[test]
    fn test_lightning_blasts_its_end() {
        let mut state = create_test_state();
        place_worm(&mut state, 0, Vec2::new(100.0, 200.0));
        place_worm(&mut state, 1, Vec2::new(300.0, 200.0));
        state
            .shots
            .push(create_test_shot(ShotKind::Lightning, 0, 0, &[(120, 200), (295, 205)]));
        update(&mut state);
        assert_eq!(state.worm(0).map(|w| w.hit_points), Some(MAX_HIT_POINTS));
        assert_eq!(
            state.worm(1).map(|w| w.hit_points),
            Some(MAX_HIT_POINTS - LIGHTNING_BLAST_DAMAGE)
        );
    }
}
