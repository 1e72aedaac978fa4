//! Bullet flight and impact resolution
//!
//! Bullets move one axis at a time and step back on the axis that collided,
//! so they never end a tick inside a wall or a worm. Point bullets consume
//! themselves on impact, grenades bounce until their fuse runs out, rockets
//! detonate on contact.

use std::f32::consts::TAU;

use rand::Rng;
use tracing::debug;

use crate::game::body::Axis;
use crate::game::constants::bullets::{grenade, rocket};
use crate::game::state::{
    medium_at, worm_hit, Bullet, BulletKind, Explosion, GameState, GrenadePayload, Slot,
};
use crate::game::systems::{combat, forces};
use crate::game::terrain::Cell;

/// What a bullet ran into on each axis this tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Impact {
    x_wall: Option<Cell>,
    y_wall: Option<Cell>,
    x_worm: Option<Slot>,
    y_worm: Option<Slot>,
}

impl Impact {
    #[inline]
    fn on_x(&self) -> bool {
        self.x_wall.is_some() || self.x_worm.is_some()
    }

    #[inline]
    fn on_y(&self) -> bool {
        self.y_wall.is_some() || self.y_worm.is_some()
    }

    /// Wall cell hit, preferring the X axis
    #[inline]
    fn wall(&self) -> Option<Cell> {
        self.x_wall.or(self.y_wall)
    }

    /// Worm hit, preferring the X axis
    #[inline]
    fn worm(&self) -> Option<Slot> {
        self.x_worm.or(self.y_worm)
    }
}

/// Bullets are processed newest first; bullets spawned during the pass wait
/// for the next tick
pub fn update(state: &mut GameState) {
    let mut index = state.bullets.len();
    while index > 0 {
        index -= 1;
        if state.bullets[index].fuse_expired(state.tick) {
            detonate(state, index);
            continue;
        }
        let impact = advance(state, index);
        if impact.on_x() || impact.on_y() {
            resolve_impact(state, index, impact);
        }
    }
}

fn advance(state: &mut GameState, index: usize) -> Impact {
    let GameState {
        bullets,
        terrain,
        worms,
        rules,
        ..
    } = state;
    let bullet = &mut bullets[index];
    forces::calculate(&mut bullet.body, rules.wind);

    let mut impact = Impact::default();
    for axis in [Axis::X, Axis::Y] {
        bullet.body.step(axis);
        let wall = terrain.box_hit(bullet.body.position, bullet.extents);
        let worm = worm_hit(worms, bullet.body.position, bullet.extents, None);
        if wall.is_some() || worm.is_some() {
            bullet.body.step_back(axis);
        }
        match axis {
            Axis::X => (impact.x_wall, impact.x_worm) = (wall, worm),
            Axis::Y => (impact.y_wall, impact.y_worm) = (wall, worm),
        }
    }
    bullet.body.medium = medium_at(terrain, bullet.body.position);
    impact
}

fn resolve_impact(state: &mut GameState, index: usize, impact: Impact) {
    let bullet = &mut state.bullets[index];
    match bullet.kind {
        BulletKind::Point { damage, .. } => {
            let shooter = bullet.shooter;
            if let Some(cell) = impact.wall() {
                state.bullets.remove(index);
                combat::damage_wall(state, cell, damage);
            } else if let Some(victim) = impact.worm() {
                state.bullets.remove(index);
                combat::damage_worm(state, victim, damage, shooter);
            }
        }
        BulletKind::Grenade(_) => {
            if impact.on_x() {
                bullet.body.velocity.x *= -grenade::RESTITUTION;
            }
            if impact.on_y() {
                bullet.body.velocity.y *= -grenade::RESTITUTION;
            }
        }
        BulletKind::Rocket => detonate(state, index),
    }
}

/// Removes the bullet at `index` and releases its payload. Payloads land in
/// `explosions` or at the end of `bullets` and are processed next tick.
pub fn detonate(state: &mut GameState, index: usize) {
    let bullet: Bullet = state.bullets.remove(index);
    let position = bullet.body.position;
    match bullet.kind {
        BulletKind::Grenade(GrenadePayload::Explosive) => state.explosions.push(Explosion::new(
            position,
            grenade::EXPLOSION_RADIUS,
            grenade::EXPLOSION_DAMAGE,
            bullet.shooter,
        )),
        BulletKind::Grenade(GrenadePayload::Splinter) => {
            let tick = state.tick;
            for _ in 0..grenade::SPLINTER_COUNT {
                let angle = state.rng.gen::<f32>() * TAU;
                state.bullets.push(Bullet::point(
                    position,
                    angle,
                    grenade::SPLINTER_DAMAGE,
                    false,
                    bullet.shooter,
                    tick,
                ));
            }
        }
        BulletKind::Rocket => state.explosions.push(Explosion::new(
            position,
            rocket::EXPLOSION_RADIUS,
            rocket::EXPLOSION_DAMAGE,
            bullet.shooter,
        )),
        BulletKind::Point { .. } => {}
    }
    debug!("Bullet {:?} detonated at ({:.1}, {:.1})", bullet.kind, position.x, position.y);
}
