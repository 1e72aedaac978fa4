//! Key handling: walking, jumping, swimming, the rope key and firing
//!
//! Runs first in every tick. For each worm the force model is evaluated,
//! then held keys nudge the velocity according to the medium the worm is
//! in, and the active weapon is triggered.

use rand::Rng;
use tracing::trace;

use crate::game::body::{Extents, Medium};
use crate::game::constants::movement::{
    AIR_ACCELERATION, FLYING_VELOCITY, GROUND_ACCELERATION, JUMPING_VELOCITY, SWIMMING_VELOCITY,
    WALKING_VELOCITY, WATER_ACCELERATION,
};
use crate::game::constants::weapons::{
    MUZZLE_PROBE_SIZE, RIFLE_DAMAGE, SHOTGUN_DAMAGE, SHOTGUN_PELLETS, SHOTGUN_SCATTER,
};
use crate::game::input::Controls;
use crate::game::shots::{generate_lightning, lightning_end, trace_laser};
use crate::game::state::{
    Bullet, Direction, GameState, GrenadePayload, PolylineShot, Rope, ShotKind, Slot, Worm,
};
use crate::game::systems::forces;
use crate::game::tables::CornerAngles;
use crate::game::weapons::WeaponKind;
use crate::util::point::Point;
use crate::util::vec2::Vec2;

pub fn update(state: &mut GameState) {
    let wind = state.rules.wind;
    let tick = state.tick;

    for slot in 0..state.worms.len() {
        let Some(worm) = state.worm_mut(slot) else {
            continue;
        };
        forces::calculate(&mut worm.body, wind);
        if worm.body.medium == Medium::Ground {
            worm.set_ground_direction();
        } else {
            worm.set_air_direction();
        }

        let controls = worm.controls;
        if !controls.horizontal() {
            worm.set_standing_phase();
        }
        handle_rope_key(worm, controls);
        let fired = if controls.fire {
            worm.loadout.active_mut().trigger()
        } else {
            worm.loadout.active_mut().tick_reload();
            false
        };

        match worm.body.medium {
            Medium::Ground => walk(worm, controls, tick),
            Medium::Air => fly(worm, controls),
            Medium::Water => swim(worm, controls, tick),
        }

        if fired {
            fire(state, slot);
        }
    }
}

/// Holding the key casts a rope or climbs an attached one; releasing it
/// drops the rope
fn handle_rope_key(worm: &mut Worm, controls: Controls) {
    if !controls.rope {
        worm.rope = None;
        return;
    }
    if let Some(rope) = worm.rope.as_mut() {
        if rope.is_attached() {
            rope.climbing_up = controls.up;
            rope.climbing_down = controls.down;
        }
        return;
    }
    worm.rope = Some(Rope::cast(worm.body.position, worm.aim_angle()));
}

#[inline]
fn accelerate_left(velocity: &mut f32, acceleration: f32, cap: f32) {
    if *velocity > -cap {
        *velocity -= acceleration;
    }
}

#[inline]
fn accelerate_right(velocity: &mut f32, acceleration: f32, cap: f32) {
    if *velocity < cap {
        *velocity += acceleration;
    }
}

fn walk(worm: &mut Worm, controls: Controls, tick: u64) {
    if controls.left {
        worm.face(Direction::GroundLeft);
        worm.check_phase(tick);
        accelerate_left(&mut worm.body.velocity.x, GROUND_ACCELERATION, WALKING_VELOCITY);
    }
    if controls.right {
        worm.face(Direction::GroundRight);
        worm.check_phase(tick);
        accelerate_right(&mut worm.body.velocity.x, GROUND_ACCELERATION, WALKING_VELOCITY);
    }
    if controls.up && !worm.on_attached_rope() {
        worm.set_air_direction();
        worm.set_standing_phase();
        worm.body.velocity.y = -JUMPING_VELOCITY;
    }
}

fn fly(worm: &mut Worm, controls: Controls) {
    if controls.left {
        worm.face(Direction::AirLeft);
        worm.set_last_phase();
        accelerate_left(&mut worm.body.velocity.x, AIR_ACCELERATION, FLYING_VELOCITY);
    }
    if controls.right {
        worm.face(Direction::AirRight);
        worm.set_last_phase();
        accelerate_right(&mut worm.body.velocity.x, AIR_ACCELERATION, FLYING_VELOCITY);
    }
}

fn swim(worm: &mut Worm, controls: Controls, tick: u64) {
    if controls.left {
        worm.face(Direction::AirLeft);
        worm.check_phase(tick);
        accelerate_left(&mut worm.body.velocity.x, WATER_ACCELERATION, SWIMMING_VELOCITY);
    }
    if controls.right {
        worm.face(Direction::AirRight);
        worm.check_phase(tick);
        accelerate_right(&mut worm.body.velocity.x, WATER_ACCELERATION, SWIMMING_VELOCITY);
    }
    if worm.on_attached_rope() {
        return;
    }
    if controls.up {
        worm.set_air_direction();
        accelerate_left(&mut worm.body.velocity.y, WATER_ACCELERATION, SWIMMING_VELOCITY);
    }
    if controls.down {
        worm.set_air_direction();
        accelerate_right(&mut worm.body.velocity.y, WATER_ACCELERATION, SWIMMING_VELOCITY);
    }
}

// ============================================================================
// Firing
// ============================================================================

/// Places a projectile of `extents`, fired at `angle` from the center of a
/// worm box, just outside that box on the side the ray leaves through
pub fn move_outside(position: Vec2, extents: Extents, angle: f32, worm: Extents, corners: &CornerAngles) -> Vec2 {
    let (sin, cos) = angle.sin_cos();
    let mut placed = position;
    if corners.exits_vertically(angle) {
        let dy = if sin > 0.0 {
            (worm.up + extents.down + 1) as f32
        } else {
            -((worm.down + extents.up + 1) as f32)
        };
        placed.x += dy * cos / sin;
        placed.y -= dy;
    } else {
        let dx = if cos > 0.0 {
            (worm.right + extents.left + 1) as f32
        } else {
            -((worm.left + extents.right + 1) as f32)
        };
        placed.x += dx;
        placed.y -= dx * sin / cos;
    }
    placed
}

/// Emits the payload of the worm's active weapon
fn fire(state: &mut GameState, slot: Slot) {
    let Some(worm) = state.worm(slot) else {
        return;
    };
    let kind = worm.loadout.active().kind;
    let origin = worm.position();
    let angle = worm.aim_angle();
    let aim = worm.aim;
    let worm_extents = worm.extents;
    let corners = state.tables.worm_corners;
    let tick = state.tick;
    let shooter = Some(slot);

    let placed = |mut bullet: Bullet, angle: f32| {
        bullet.body.position = move_outside(origin, bullet.extents, angle, worm_extents, &corners);
        bullet
    };
    let muzzle = || {
        let probe = Extents::from_size(MUZZLE_PROBE_SIZE, MUZZLE_PROBE_SIZE);
        Point::from_vec2(move_outside(origin, probe, angle, worm_extents, &corners))
    };

    match kind {
        WeaponKind::Rifle => {
            let bullet = Bullet::point(origin, angle, RIFLE_DAMAGE, true, shooter, tick);
            state.bullets.push(placed(bullet, angle));
        }
        WeaponKind::Shotgun => {
            for _ in 0..SHOTGUN_PELLETS {
                let pellet_angle = angle + (state.rng.gen::<f32>() - 0.5) * SHOTGUN_SCATTER;
                let pellet = Bullet::point(origin, pellet_angle, SHOTGUN_DAMAGE, false, shooter, tick);
                state.bullets.push(placed(pellet, pellet_angle));
            }
        }
        WeaponKind::SplinterGrenadeLauncher => {
            let grenade = Bullet::grenade(origin, angle, GrenadePayload::Splinter, shooter, tick);
            state.bullets.push(placed(grenade, angle));
        }
        WeaponKind::ExplosiveGrenadeLauncher => {
            let grenade = Bullet::grenade(origin, angle, GrenadePayload::Explosive, shooter, tick);
            state.bullets.push(placed(grenade, angle));
        }
        WeaponKind::RocketLauncher => {
            let rocket = Bullet::rocket(origin, angle, shooter, tick);
            state.bullets.push(placed(rocket, angle));
        }
        WeaponKind::LaserCannon => {
            let vertices = trace_laser(&state.terrain, muzzle(), angle);
            state.shots.push(PolylineShot {
                vertices,
                shooter: slot,
                spawn_tick: tick,
                kind: ShotKind::Laser,
            });
        }
        WeaponKind::Thunderbolt => {
            let start = muzzle();
            let end = lightning_end(start, angle, aim);
            let vertices = generate_lightning(start, end, &mut state.rng);
            state.shots.push(PolylineShot {
                vertices,
                shooter: slot,
                spawn_tick: tick,
                kind: ShotKind::Lightning,
            });
        }
    }
    trace!("Worm {} fired {:?} at {:.2} rad", slot, kind, angle);
}
