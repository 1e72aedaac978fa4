//! Weapon reload state machines
//!
//! Every worm carries one [`Weapon`] per [`WeaponKind`]. A weapon only
//! decides *whether* the current tick discharges; building the projectiles
//! or shots for a discharge is done by the firing system.
//!
//! Instant weapons use a single countdown: firing is allowed at zero and
//! resets the counter to its maximum. Two-phase weapons count up while
//! `Firing` (each emitted shot costs a fixed number of ticks) and switch to
//! `Reloading` once the budget is spent, counting back down to zero.

use serde::{Deserialize, Serialize};

use crate::game::constants::weapons::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponKind {
    Rifle,
    Shotgun,
    SplinterGrenadeLauncher,
    ExplosiveGrenadeLauncher,
    RocketLauncher,
    LaserCannon,
    Thunderbolt,
}

impl WeaponKind {
    /// Loadout order; index 0 is selected after every rebirth
    pub const ALL: [WeaponKind; 7] = [
        WeaponKind::Rifle,
        WeaponKind::Shotgun,
        WeaponKind::SplinterGrenadeLauncher,
        WeaponKind::ExplosiveGrenadeLauncher,
        WeaponKind::RocketLauncher,
        WeaponKind::LaserCannon,
        WeaponKind::Thunderbolt,
    ];

    pub fn max_reload_ticks(self) -> u32 {
        match self {
            WeaponKind::Rifle => RIFLE_RELOAD,
            WeaponKind::Shotgun => SHOTGUN_RELOAD,
            WeaponKind::SplinterGrenadeLauncher | WeaponKind::ExplosiveGrenadeLauncher => {
                GRENADE_LAUNCHER_RELOAD
            }
            WeaponKind::RocketLauncher => ROCKET_LAUNCHER_RELOAD,
            WeaponKind::LaserCannon => LASER_MAX_RELOAD,
            WeaponKind::Thunderbolt => THUNDERBOLT_MAX_RELOAD,
        }
    }

    /// Ticks of budget one emitted shot consumes (two-phase weapons only)
    pub fn shot_cost(self) -> Option<u32> {
        match self {
            WeaponKind::LaserCannon => Some(LASER_SHOT_COST),
            WeaponKind::Thunderbolt => Some(THUNDERBOLT_SHOT_COST),
            _ => None,
        }
    }

    #[inline]
    pub fn is_two_phase(self) -> bool {
        self.shot_cost().is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FirePhase {
    Firing,
    Reloading,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weapon {
    pub kind: WeaponKind,
    /// Countdown for instant weapons and while reloading; ticks fired while
    /// a two-phase weapon is firing
    pub reload_ticks: u32,
    pub phase: FirePhase,
}

impl Weapon {
    pub fn new(kind: WeaponKind) -> Self {
        Self {
            kind,
            reload_ticks: 0,
            phase: FirePhase::Firing,
        }
    }

    #[inline]
    pub fn max_reload_ticks(&self) -> u32 {
        self.kind.max_reload_ticks()
    }

    /// Makes the weapon immediately ready
    pub fn reload_now(&mut self) {
        self.reload_ticks = 0;
        self.phase = FirePhase::Firing;
    }

    /// One tick of reloading while the fire key is up. Two-phase weapons
    /// only recover while `Reloading`; releasing the key mid-burst keeps the
    /// ticks already fired.
    pub fn tick_reload(&mut self) {
        match self.kind.shot_cost() {
            None => self.reload_ticks = self.reload_ticks.saturating_sub(1),
            Some(_) => {
                if self.phase == FirePhase::Reloading {
                    self.reload_ticks = self.reload_ticks.saturating_sub(1);
                    if self.reload_ticks == 0 {
                        self.phase = FirePhase::Firing;
                    }
                }
            }
        }
    }

    /// One tick with the fire key held. Returns true when this tick emits
    /// the weapon's payload.
    pub fn trigger(&mut self) -> bool {
        let max = self.max_reload_ticks();
        match self.kind.shot_cost() {
            None => {
                if self.reload_ticks == 0 {
                    self.reload_ticks = max;
                    true
                } else {
                    self.reload_ticks -= 1;
                    false
                }
            }
            Some(cost) => match self.phase {
                FirePhase::Firing => {
                    self.reload_ticks += cost;
                    if self.reload_ticks < max {
                        true
                    } else {
                        self.reload_ticks = max;
                        self.phase = FirePhase::Reloading;
                        false
                    }
                }
                FirePhase::Reloading => {
                    self.tick_reload();
                    false
                }
            },
        }
    }

    /// Whether holding fire right now would emit something
    pub fn is_ready(&self) -> bool {
        match self.kind.shot_cost() {
            None => self.reload_ticks == 0,
            Some(cost) => {
                self.phase == FirePhase::Firing && self.reload_ticks + cost < self.max_reload_ticks()
            }
        }
    }
}

/// The full weapon set of one worm plus the current selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loadout {
    weapons: Vec<Weapon>,
    selected: usize,
}

impl Loadout {
    pub fn new() -> Self {
        Self {
            weapons: WeaponKind::ALL.iter().map(|&kind| Weapon::new(kind)).collect(),
            selected: 0,
        }
    }

    #[inline]
    pub fn selected(&self) -> usize {
        self.selected
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.weapons.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.weapons.is_empty()
    }

    pub fn active(&self) -> &Weapon {
        &self.weapons[self.selected]
    }

    pub fn active_mut(&mut self) -> &mut Weapon {
        &mut self.weapons[self.selected]
    }

    pub fn weapons(&self) -> &[Weapon] {
        &self.weapons
    }

    /// Selects a weapon by index; out-of-range indices are ignored
    pub fn select(&mut self, index: usize) -> bool {
        if index < self.weapons.len() {
            self.selected = index;
            true
        } else {
            false
        }
    }

    /// Moves the selection by `by` positions, wrapping in both directions
    pub fn rotate_by(&mut self, by: i32) {
        let count = self.weapons.len() as i32;
        let index = (self.selected as i32 + by).rem_euclid(count);
        self.selected = index as usize;
    }

    /// Readies every weapon, as on rebirth
    pub fn reload_all(&mut self) {
        for weapon in &mut self.weapons {
            weapon.reload_now();
        }
    }
}

impl Default for Loadout {
    fn default() -> Self {
        Self::new()
    }
}
