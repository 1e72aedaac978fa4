//! Drawing snapshots
//!
//! The session copies the engine's drawable state out after every tick and
//! publishes it through a [`SnapshotTurnstile`]. Readers only ever see a
//! finished copy, never the live collections. The terrain grid is published
//! separately and only when it changed.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::game::engine::SimulationEngine;
use crate::game::state::{Bullet, Decoration, Explosion, PolylineShot, Worm};
use crate::game::tables::ExplosionPalette;

/// Everything a client needs to draw one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawingSnapshot {
    pub tick: u64,
    /// Simulated time in milliseconds, paused time excluded
    pub elapsed_millis: u64,
    pub paused: bool,
    pub game_over: bool,
    /// Bumped when a rarely changing option changes
    pub change_counter: u64,
    /// Revision of the terrain grid the frame was taken against
    pub terrain_revision: u64,
    pub worms: Vec<Option<Worm>>,
    pub bullets: Vec<Bullet>,
    pub explosions: Vec<Explosion>,
    pub decorations: Vec<Decoration>,
    pub shots: Vec<PolylineShot>,
    pub palette: ExplosionPalette,
}

/// Session flags carried along with a frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStatus {
    pub elapsed_millis: u64,
    pub paused: bool,
    pub game_over: bool,
}

impl DrawingSnapshot {
    pub fn capture(engine: &SimulationEngine, status: SessionStatus) -> Self {
        let state = engine.state();
        Self {
            tick: state.tick,
            elapsed_millis: status.elapsed_millis,
            paused: status.paused,
            game_over: status.game_over,
            change_counter: engine.change_counter(),
            terrain_revision: state.terrain.revision(),
            worms: state.worms.clone(),
            bullets: state.bullets.clone(),
            explosions: state.explosions.clone(),
            decorations: state.decorations.clone(),
            shots: state.shots.clone(),
            palette: state.tables.palette,
        }
    }
}

/// The terrain grid as flat bytes, indexed `(row << height_shift) + column`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerrainSnapshot {
    pub revision: u64,
    pub width: i32,
    pub height: i32,
    pub height_shift: u32,
    pub water_level: i32,
    pub cells: Vec<u8>,
}

impl TerrainSnapshot {
    pub fn capture(engine: &SimulationEngine) -> Self {
        let terrain = engine.terrain();
        Self {
            revision: terrain.revision(),
            width: terrain.width(),
            height: terrain.height(),
            height_shift: terrain.height_shift(),
            water_level: terrain.water_level(),
            cells: terrain.to_bytes(),
        }
    }
}

/// Single-writer handoff of finished snapshots. The writer holds the lock
/// only to swap in a new frame; readers clone an `Arc`.
pub struct SnapshotTurnstile {
    drawing: RwLock<Option<Arc<DrawingSnapshot>>>,
    terrain: RwLock<Option<Arc<TerrainSnapshot>>>,
}

impl SnapshotTurnstile {
    pub fn new() -> Self {
        Self {
            drawing: RwLock::new(None),
            terrain: RwLock::new(None),
        }
    }

    /// Publishes the frame of the tick that just ran. The terrain is copied
    /// only when its revision moved past the published one.
    pub fn publish(&self, engine: &SimulationEngine, status: SessionStatus) {
        let revision = engine.terrain().revision();
        let stale = self
            .terrain
            .read()
            .as_ref()
            .map_or(true, |terrain| terrain.revision != revision);
        if stale {
            *self.terrain.write() = Some(Arc::new(TerrainSnapshot::capture(engine)));
        }
        *self.drawing.write() = Some(Arc::new(DrawingSnapshot::capture(engine, status)));
    }

    /// Latest published frame, if any tick has run
    pub fn drawing(&self) -> Option<Arc<DrawingSnapshot>> {
        self.drawing.read().clone()
    }

    pub fn terrain(&self) -> Option<Arc<TerrainSnapshot>> {
        self.terrain.read().clone()
    }
}

impl Default for SnapshotTurnstile {
    fn default() -> Self {
        Self::new()
    }
}

/// Encode a snapshot using bincode
/// Uses legacy config for fixed-size integers
pub fn encode<T: Serialize>(snapshot: &T) -> Result<Vec<u8>, EncodeError> {
    bincode::serde::encode_to_vec(snapshot, bincode::config::legacy()).map_err(|e| EncodeError(e.to_string()))
}

/// Decode a snapshot using bincode
pub fn decode<T: DeserializeOwned>(data: &[u8]) -> Result<T, DecodeError> {
    bincode::serde::decode_from_slice(data, bincode::config::legacy())
        .map(|(snapshot, _)| snapshot)
        .map_err(|e| DecodeError(e.to_string()))
}

#[derive(Debug, thiserror::Error)]
#[error("Encode error: {0}")]
pub struct EncodeError(String);

#[derive(Debug, thiserror::Error)]
#[error("Decode error: {0}")]
pub struct DecodeError(String);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::input::Controls;
    use crate::game::state::GameRules;
    use crate::game::systems::testing::create_test_terrain;
    use crate::util::vec2::Vec2;

    fn create_test_engine() -> SimulationEngine {
        let mut engine = SimulationEngine::with_terrain(create_test_terrain(30), GameRules::default(), 3, 4);
        engine.join("alice", 1).expect("join");
        engine.join("bob", 2).expect("join");
        engine
    }

    #[test]
    fn test_turnstile_starts_empty() {
        let turnstile = SnapshotTurnstile::new();
        assert!(turnstile.drawing().is_none());
        assert!(turnstile.terrain().is_none());
    }

    #[test]
    fn test_capture_copies_drawable_state() {
        let mut engine = create_test_engine();
        engine.tick();
        let status = SessionStatus {
            elapsed_millis: 30,
            paused: false,
            game_over: false,
        };
        let snapshot = DrawingSnapshot::capture(&engine, status);
        assert_eq!(snapshot.tick, 1);
        assert_eq!(snapshot.elapsed_millis, 30);
        assert_eq!(snapshot.worms.len(), 3);
        assert!(snapshot.worms[2].is_none());
        assert_eq!(snapshot.worms[1].as_ref().map(|w| w.name.as_str()), Some("bob"));
    }

    #[test]
    fn test_terrain_published_only_on_change() {
        let mut engine = create_test_engine();
        let turnstile = SnapshotTurnstile::new();
        turnstile.publish(&engine, SessionStatus::default());
        let first = turnstile.terrain().expect("terrain");

        engine.tick();
        turnstile.publish(&engine, SessionStatus::default());
        let second = turnstile.terrain().expect("terrain");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.cells, engine.terrain_bytes());
        assert_eq!(turnstile.drawing().map(|d| d.tick), Some(1));
    }

    #[test]
    fn test_snapshot_encoding_round_trip() {
        let mut engine = create_test_engine();
        let controls = Controls {
            fire: true,
            ..Controls::default()
        };
        engine.set_controls(0, controls, Vec2::new(400.0, 100.0)).expect("controls");
        for _ in 0..3 {
            engine.tick();
        }
        let snapshot = DrawingSnapshot::capture(&engine, SessionStatus::default());
        let bytes = encode(&snapshot).expect("encode");
        let decoded: DrawingSnapshot = decode(&bytes).expect("decode");
        assert_eq!(decoded.tick, snapshot.tick);
        assert!(!snapshot.bullets.is_empty());
        assert_eq!(decoded.bullets.len(), snapshot.bullets.len());
        // Accumulated force is per-tick scratch and is not sent
        for (got, sent) in decoded.bullets.iter().zip(&snapshot.bullets) {
            assert_eq!(got.body.position, sent.body.position);
            assert_eq!(got.body.velocity, sent.body.velocity);
            assert_eq!(got.body.force, Vec2::ZERO);
            assert_eq!(got.extents, sent.extents);
            assert_eq!(got.kind, sent.kind);
            assert_eq!(got.shooter, sent.shooter);
        }
        // Held keys are not part of the drawing
        assert_eq!(
            decoded.worms[0].as_ref().map(|w| w.controls),
            Some(Controls::default())
        );
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode::<DrawingSnapshot>(&[1, 2, 3]).is_err());
    }
}
