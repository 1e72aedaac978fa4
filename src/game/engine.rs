//! Simulation engine
//!
//! Owns the [`GameState`] and is its only mutator. [`SimulationEngine::tick`]
//! advances the world by one fixed step; the administrative calls (join,
//! leave, kick, controls) are meant to run strictly between two ticks.

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use crate::game::input::{Controls, InputError};
use crate::game::state::{GameEvent, GameRules, GameState, Slot, Worm};
use crate::game::systems::{
    bullets, combat, controls, decorations, explosions, polyline, ropes, spawn, worms,
};
use crate::game::tables::StaticTables;
use crate::game::terrain::{TerrainMap, TerrainParams};
use crate::util::vec2::Vec2;

/// Reasons a worm cannot join
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JoinError {
    #[error("Server is full ({0} worms)")]
    ServerFull(usize),
    #[error("Worm name must not be empty")]
    EmptyName,
}

pub struct SimulationEngine {
    state: GameState,
    /// Bumped whenever a rarely changing option changes
    change_counter: u64,
}

impl SimulationEngine {
    /// Creates an engine on a freshly generated map
    pub fn new(params: &TerrainParams, rules: GameRules, max_worms: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let terrain = TerrainMap::generate(params, &mut rng);
        info!(
            "Simulation created: {}x{} cells, {} slots, seed {}",
            terrain.width(),
            terrain.height(),
            max_worms,
            seed
        );
        Self::from_parts(terrain, rules, max_worms, rng)
    }

    /// Creates an engine on a prepared map
    pub fn with_terrain(terrain: TerrainMap, rules: GameRules, max_worms: usize, seed: u64) -> Self {
        Self::from_parts(terrain, rules, max_worms, StdRng::seed_from_u64(seed))
    }

    fn from_parts(terrain: TerrainMap, rules: GameRules, max_worms: usize, rng: StdRng) -> Self {
        Self {
            state: GameState::new(terrain, rules, StaticTables::new(), max_worms, rng),
            change_counter: 0,
        }
    }

    /// Advances the world by one step and returns everything that happened
    /// since the previous drain
    pub fn tick(&mut self) -> Vec<GameEvent> {
        let state = &mut self.state;
        state.tick += 1;

        controls::update(state);
        bullets::update(state);
        decorations::update(state);
        ropes::update(state);
        worms::update(state);
        explosions::update(state);
        polyline::update(state);

        self.drain_events()
    }

    // ========================================================================
    // Administration
    // ========================================================================

    /// Puts a new worm into the lowest free slot
    pub fn join(&mut self, name: &str, color_index: u8) -> Result<Slot, JoinError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(JoinError::EmptyName);
        }
        let slot = self
            .state
            .free_slot()
            .ok_or(JoinError::ServerFull(self.state.worms.len()))?;

        let cell = spawn::find_spawn_cell(&mut self.state, None);
        let extents = self.state.tables.worm_extents;
        self.state.worms[slot] = Some(Worm::new(name.to_string(), color_index, cell.center(), extents));
        self.state.terrain.clear_for_entering_worm(cell);

        info!("Worm {} ({}) joined at cell ({}, {})", slot, name, cell.x, cell.y);
        self.state.events.push(GameEvent::WormJoined {
            slot,
            name: name.to_string(),
        });
        Ok(slot)
    }

    pub fn leave(&mut self, slot: Slot) -> Result<(), InputError> {
        let worm = self.remove(slot)?;
        info!("Worm {} ({}) left", slot, worm.name);
        self.state.events.push(GameEvent::WormLeft { slot, name: worm.name });
        Ok(())
    }

    pub fn kick(&mut self, slot: Slot, reason: Option<String>) -> Result<(), InputError> {
        let worm = self.remove(slot)?;
        info!(
            "Worm {} ({}) kicked: {}",
            slot,
            worm.name,
            reason.as_deref().unwrap_or("<not given>")
        );
        self.state.events.push(GameEvent::WormKicked {
            slot,
            name: worm.name,
            reason,
        });
        Ok(())
    }

    fn remove(&mut self, slot: Slot) -> Result<Worm, InputError> {
        self.live(slot)?;
        let worm = self.state.worms[slot].take().ok_or(InputError::EmptySlot(slot))?;
        combat::release_ropes_anchored_to(&mut self.state, slot);
        Ok(worm)
    }

    /// Replaces the held keys and aim point of a worm
    pub fn set_controls(&mut self, slot: Slot, controls: Controls, aim: Vec2) -> Result<(), InputError> {
        let worm = self.live(slot)?;
        worm.controls = controls;
        worm.aim = aim;
        Ok(())
    }

    /// Selects a weapon by index; an index past the roster is ignored
    pub fn select_weapon(&mut self, slot: Slot, index: usize) -> Result<(), InputError> {
        self.live(slot)?.loadout.select(index);
        Ok(())
    }

    pub fn rotate_weapon(&mut self, slot: Slot, by: i32) -> Result<(), InputError> {
        self.live(slot)?.loadout.rotate_by(by);
        Ok(())
    }

    /// Spends one of the worm's pauses. Returns the pauses left, or `None`
    /// when it has none.
    pub fn spend_pause(&mut self, slot: Slot) -> Result<Option<u8>, InputError> {
        let worm = self.live(slot)?;
        if worm.remaining_pauses == 0 {
            return Ok(None);
        }
        worm.remaining_pauses -= 1;
        Ok(Some(worm.remaining_pauses))
    }

    fn live(&mut self, slot: Slot) -> Result<&mut Worm, InputError> {
        match self.state.worms.get_mut(slot) {
            None => Err(InputError::UnknownSlot(slot)),
            Some(None) => Err(InputError::EmptySlot(slot)),
            Some(Some(worm)) => Ok(worm),
        }
    }

    // ========================================================================
    // Options
    // ========================================================================

    pub fn rules(&self) -> &GameRules {
        &self.state.rules
    }

    pub fn set_rules(&mut self, rules: GameRules) {
        if self.state.rules != rules {
            self.state.rules = rules;
            self.options_changed();
        }
    }

    /// Records an out-of-band option change
    pub fn options_changed(&mut self) {
        self.change_counter += 1;
    }

    #[inline]
    pub fn change_counter(&self) -> u64 {
        self.change_counter
    }

    // ========================================================================
    // Read access
    // ========================================================================

    #[inline]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    #[inline]
    pub fn worm(&self, slot: Slot) -> Option<&Worm> {
        self.state.worm(slot)
    }

    /// Ticks run so far
    #[inline]
    pub fn ticks(&self) -> u64 {
        self.state.tick
    }

    #[inline]
    pub fn max_worms(&self) -> usize {
        self.state.worms.len()
    }

    /// Flat byte-per-cell copy of the terrain grid
    pub fn terrain_bytes(&self) -> Vec<u8> {
        self.state.terrain.to_bytes()
    }

    #[inline]
    pub fn terrain(&self) -> &TerrainMap {
        &self.state.terrain
    }

    /// Takes the events queued by ticks and administrative calls
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.state.events)
    }
}
