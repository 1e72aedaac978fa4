//! Game state definitions and structures
//!
//! Contains all entities (worms, bullets, polyline shots, explosions,
//! decorations, ropes) and the world state the engine steps. Worms live in a
//! fixed slot array; every cross-reference to a worm is a [`Slot`] that may
//! point at an empty slot by the time it is resolved.

use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::game::body::{boxes_overlap, Body, BodyParams, Extents, Medium};
use crate::game::constants::{bullets, decoration, explosion, rope, worm};
use crate::game::input::Controls;
use crate::game::scoreboard::GameOverReason;
use crate::game::tables::{Rgb, StaticTables, LASER, LIGHTNING};
use crate::game::terrain::{Cell, TerrainMap, WallHitPoints, WallType};
use crate::game::weapons::Loadout;
use crate::util::point::Point;
use crate::util::vec2::Vec2;

/// Stable index into the worm slot array
pub type Slot = usize;

pub const WORM_BODY: BodyParams = BodyParams {
    mass: worm::MASS,
    resistance_rate: worm::RESISTANCE_RATE,
    capacity: worm::CAPACITY,
    anti_gravity: worm::ANTI_GRAVITY,
};

pub const POINT_BULLET_BODY: BodyParams = BodyParams {
    mass: bullets::point::MASS,
    resistance_rate: bullets::point::RESISTANCE_RATE,
    capacity: bullets::point::CAPACITY,
    anti_gravity: bullets::point::ANTI_GRAVITY,
};

pub const GRENADE_BODY: BodyParams = BodyParams {
    mass: bullets::grenade::MASS,
    resistance_rate: bullets::grenade::RESISTANCE_RATE,
    capacity: bullets::grenade::CAPACITY,
    anti_gravity: bullets::grenade::ANTI_GRAVITY,
};

pub const ROCKET_BODY: BodyParams = BodyParams {
    mass: bullets::rocket::MASS,
    resistance_rate: bullets::rocket::RESISTANCE_RATE,
    capacity: bullets::rocket::CAPACITY,
    anti_gravity: bullets::rocket::ANTI_GRAVITY,
};

pub const ROPE_BODY: BodyParams = BodyParams {
    mass: rope::MASS,
    resistance_rate: rope::RESISTANCE_RATE,
    capacity: rope::CAPACITY,
    anti_gravity: rope::ANTI_GRAVITY,
};

pub const DECORATION_BODY: BodyParams = BodyParams {
    mass: decoration::MASS,
    resistance_rate: decoration::RESISTANCE_RATE,
    capacity: decoration::CAPACITY,
    anti_gravity: decoration::ANTI_GRAVITY,
};

/// Scoring mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameType {
    #[default]
    FreeForAll,
    TeamMelee,
}

/// Options the engine reads every tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GameRules {
    pub game_type: GameType,
    /// Percent of the full rubble burst spawned per destroyed wall
    pub rubble_percent: u8,
    /// Percent of the full blood burst spawned per hit
    pub blood_percent: u8,
    /// Ambient air velocity netted out of air drag
    pub wind: Vec2,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            game_type: GameType::FreeForAll,
            rubble_percent: 100,
            blood_percent: 100,
            wind: Vec2::ZERO,
        }
    }
}

// ============================================================================
// Worms
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    GroundRight,
    GroundLeft,
    AirRight,
    AirLeft,
}

impl Direction {
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Direction::GroundRight => 0,
            Direction::GroundLeft => 1,
            Direction::AirRight => 2,
            Direction::AirLeft => 3,
        }
    }

    #[inline]
    pub fn is_left(self) -> bool {
        matches!(self, Direction::GroundLeft | Direction::AirLeft)
    }

    #[inline]
    pub fn phase_count(self) -> u8 {
        worm::PHASE_COUNTS[self.index()]
    }

    #[inline]
    pub fn standing_phase(self) -> u8 {
        worm::STANDING_PHASES[self.index()]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Worm {
    pub body: Body,
    pub extents: Extents,
    pub direction: Direction,
    pub animation_phase: u8,
    /// +1 or -1; flips at either end of the walk cycle
    phase_step: i8,
    pub name: String,
    /// Color index, which doubles as the team id
    pub color_index: u8,
    /// Aim point in world coordinates
    pub aim: Vec2,
    pub rope: Option<Rope>,
    pub loadout: Loadout,
    pub hit_points: i32,
    pub oxygen: i32,
    pub kills: i32,
    pub deaths: u32,
    #[serde(skip)]
    pub controls: Controls,
    pub remaining_pauses: u8,
}

impl Worm {
    pub fn new(name: String, color_index: u8, position: Vec2, extents: Extents) -> Self {
        let direction = Direction::GroundRight;
        Self {
            body: Body::new(WORM_BODY, position),
            extents,
            direction,
            animation_phase: direction.standing_phase(),
            phase_step: 1,
            name,
            color_index,
            aim: position,
            rope: None,
            loadout: Loadout::new(),
            hit_points: worm::MAX_HIT_POINTS,
            oxygen: worm::MAX_OXYGEN,
            kills: 0,
            deaths: 0,
            controls: Controls::default(),
            remaining_pauses: worm::MAX_PAUSES,
        }
    }

    #[inline]
    pub fn team_id(&self) -> u8 {
        self.color_index
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.body.position
    }

    /// Screen-space angle from the worm to its aim point
    #[inline]
    pub fn aim_angle(&self) -> f32 {
        self.body.position.angle_to(self.aim)
    }

    #[inline]
    pub fn on_attached_rope(&self) -> bool {
        self.rope.as_ref().is_some_and(Rope::is_attached)
    }

    /// Replaces the worm with a fresh one at `position`, keeping identity,
    /// score, held keys and pause budget
    pub fn rebirth(&mut self, position: Vec2) {
        let mut reborn = Worm::new(std::mem::take(&mut self.name), self.color_index, position, self.extents);
        reborn.kills = self.kills;
        reborn.deaths = self.deaths;
        reborn.aim = self.aim;
        reborn.controls = self.controls;
        reborn.remaining_pauses = self.remaining_pauses;
        reborn.loadout = std::mem::take(&mut self.loadout);
        reborn.loadout.reload_all();
        reborn.loadout.select(0);
        *self = reborn;
    }

    pub fn set_ground_direction(&mut self) {
        self.direction = match self.direction {
            Direction::AirRight => Direction::GroundRight,
            Direction::AirLeft => Direction::GroundLeft,
            other => other,
        };
        self.clamp_phase();
    }

    pub fn set_air_direction(&mut self) {
        self.direction = match self.direction {
            Direction::GroundRight => Direction::AirRight,
            Direction::GroundLeft => Direction::AirLeft,
            other => other,
        };
        self.clamp_phase();
    }

    /// Sets the direction and keeps the phase valid for it
    pub fn face(&mut self, direction: Direction) {
        self.direction = direction;
        self.clamp_phase();
    }

    /// Advances the walk animation on its cycle, ping-ponging at both ends
    pub fn check_phase(&mut self, tick: u64) {
        let count = self.direction.phase_count();
        let period = (worm::ANIMATION_CYCLE / count as u64).max(1);
        if tick % period != 0 {
            return;
        }
        let last = count as i16 - 1;
        let next = self.animation_phase as i16 + self.phase_step as i16;
        if next <= 0 || next >= last {
            self.phase_step = -self.phase_step;
        }
        self.animation_phase = next.clamp(0, last) as u8;
    }

    pub fn set_standing_phase(&mut self) {
        self.animation_phase = self.direction.standing_phase();
    }

    /// Phase facing fully sideways, used while flying or swimming
    pub fn set_last_phase(&mut self) {
        self.animation_phase = if self.direction.is_left() {
            0
        } else {
            self.direction.phase_count() - 1
        };
    }

    fn clamp_phase(&mut self) {
        let last = self.direction.phase_count() - 1;
        if self.animation_phase > last {
            self.animation_phase = last;
        }
    }
}

// ============================================================================
// Bullets
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GrenadePayload {
    /// One area explosion
    Explosive,
    /// A burst of point bullets in random directions
    Splinter,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BulletKind {
    Point { damage: i32, double_sized: bool },
    Grenade(GrenadePayload),
    Rocket,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bullet {
    pub body: Body,
    pub extents: Extents,
    pub shooter: Option<Slot>,
    pub spawn_tick: u64,
    pub kind: BulletKind,
}

impl Bullet {
    pub fn point(position: Vec2, angle: f32, damage: i32, double_sized: bool, shooter: Option<Slot>, tick: u64) -> Self {
        Self {
            body: Body::launched(POINT_BULLET_BODY, position, angle, bullets::point::VELOCITY),
            extents: Extents::from_size(bullets::point::WIDTH, bullets::point::HEIGHT),
            shooter,
            spawn_tick: tick,
            kind: BulletKind::Point { damage, double_sized },
        }
    }

    pub fn grenade(position: Vec2, angle: f32, payload: GrenadePayload, shooter: Option<Slot>, tick: u64) -> Self {
        Self {
            body: Body::launched(GRENADE_BODY, position, angle, bullets::grenade::VELOCITY),
            extents: Extents::from_size(bullets::grenade::WIDTH, bullets::grenade::HEIGHT),
            shooter,
            spawn_tick: tick,
            kind: BulletKind::Grenade(payload),
        }
    }

    pub fn rocket(position: Vec2, angle: f32, shooter: Option<Slot>, tick: u64) -> Self {
        Self {
            body: Body::launched(ROCKET_BODY, position, angle, bullets::rocket::VELOCITY),
            extents: Extents::from_size(bullets::rocket::WIDTH, bullets::rocket::HEIGHT),
            shooter,
            spawn_tick: tick,
            kind: BulletKind::Rocket,
        }
    }

    /// Whether a nearby explosion can set this bullet off
    #[inline]
    pub fn is_explodable(&self) -> bool {
        !matches!(self.kind, BulletKind::Point { .. })
    }

    /// Fuse check; only grenades time out
    #[inline]
    pub fn fuse_expired(&self, tick: u64) -> bool {
        matches!(self.kind, BulletKind::Grenade(_))
            && tick.saturating_sub(self.spawn_tick) > bullets::grenade::DETONATION_TICKS
    }
}

// ============================================================================
// Polyline shots
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShotKind {
    Laser,
    Lightning,
}

impl ShotKind {
    pub fn color(self) -> Rgb {
        match self {
            ShotKind::Laser => LASER,
            ShotKind::Lightning => LIGHTNING,
        }
    }
}

pub type Vertices = SmallVec<[Point; 17]>;

/// Instant shot drawn as connected segments; has effect only on its spawn tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolylineShot {
    pub vertices: Vertices,
    pub shooter: Slot,
    pub spawn_tick: u64,
    pub kind: ShotKind,
}

impl PolylineShot {
    #[inline]
    pub fn terminal(&self) -> Option<Point> {
        self.vertices.last().copied()
    }
}

// ============================================================================
// Explosions
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Explosion {
    pub center: Point,
    pub radius: i32,
    pub damage: i32,
    pub owner: Option<Slot>,
}

impl Explosion {
    pub fn new(center: Vec2, radius: i32, damage: i32, owner: Option<Slot>) -> Self {
        Self {
            center: Point::from_vec2(center),
            radius,
            damage,
            owner,
        }
    }

    /// Shrinks by one tick's worth and returns the new radius
    #[inline]
    pub fn shrink(&mut self) -> i32 {
        self.radius -= explosion::RADIUS_DECREMENT;
        self.radius
    }

    /// Circular reach test against a pixel-truncated position
    #[inline]
    pub fn reaches(&self, position: Vec2) -> bool {
        let r = self.radius as i64;
        self.center.distance_sq_to(Point::from_vec2(position)) <= r * r
    }
}

// ============================================================================
// Decorations
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decoration {
    pub body: Body,
    pub spawn_tick: u64,
    pub rubble: bool,
    pub point_style: bool,
    /// None draws with the wall texture (rubble)
    pub color: Option<Rgb>,
}

impl Decoration {
    pub fn new(position: Vec2, angle: f32, speed: f32, spawn_tick: u64, rubble: bool, color: Option<Rgb>) -> Self {
        Self {
            body: Body::launched(DECORATION_BODY, position, angle, speed),
            spawn_tick,
            rubble,
            point_style: true,
            color,
        }
    }
}

// ============================================================================
// Ropes
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RopeAnchor {
    /// Stuck in terrain at the rope body's position
    Wall,
    Worm(Slot),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rope {
    /// The hook; its position is the rope end while flying or on a wall
    pub body: Body,
    pub extents: Extents,
    pub anchor: Option<RopeAnchor>,
    pub climbing_up: bool,
    pub climbing_down: bool,
}

impl Rope {
    pub fn cast(from: Vec2, angle: f32) -> Self {
        Self {
            body: Body::launched(ROPE_BODY, from, angle, rope::CAST_VELOCITY),
            extents: Extents::from_size(rope::WIDTH, rope::HEIGHT),
            anchor: None,
            climbing_up: false,
            climbing_down: false,
        }
    }

    #[inline]
    pub fn is_attached(&self) -> bool {
        self.anchor.is_some()
    }

    /// Current end of the rope; follows the anchor worm when there is one
    pub fn end_position(&self, worms: &[Option<Worm>]) -> Option<Vec2> {
        match self.anchor {
            Some(RopeAnchor::Worm(slot)) => worms.get(slot)?.as_ref().map(Worm::position),
            _ => Some(self.body.position),
        }
    }
}

// ============================================================================
// Events
// ============================================================================

/// Things that happened during a tick or an administrative call, in the
/// order they happened
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    WormJoined { slot: Slot, name: String },
    WormLeft { slot: Slot, name: String },
    WormKicked { slot: Slot, name: String, reason: Option<String> },
    WormKilled {
        victim: Slot,
        victim_name: String,
        /// None for suicides (self-damage or no owner)
        killer: Option<(Slot, String)>,
    },
    WallDestroyed { cell: Cell },
    GamePaused { slot: Slot, name: String, remaining_pauses: u8 },
    GameResumed { slot: Slot, name: String },
    GameOver { reason: GameOverReason },
}

impl GameEvent {
    /// Human-readable server message, for the events that have one
    pub fn message(&self) -> Option<String> {
        match self {
            GameEvent::WormJoined { name, .. } => Some(format!("{} has joined the game.", name)),
            GameEvent::WormLeft { name, .. } => Some(format!("{} has left the game.", name)),
            GameEvent::WormKicked { name, reason, .. } => Some(format!(
                "{} has been kicked. Reason: {}",
                name,
                reason.as_deref().unwrap_or("<not given>")
            )),
            GameEvent::WormKilled {
                victim_name, killer: None, ..
            } => Some(format!("{} committed suicide.", victim_name)),
            GameEvent::WormKilled {
                victim_name,
                killer: Some((_, killer_name)),
                ..
            } => Some(format!("{} killed {}.", killer_name, victim_name)),
            GameEvent::WallDestroyed { .. } => None,
            GameEvent::GamePaused {
                name, remaining_pauses, ..
            } => Some(format!(
                "{} paused the game ({} time(s) remaining).",
                name, remaining_pauses
            )),
            GameEvent::GameResumed { name, .. } => Some(format!("{} resumed the game.", name)),
            GameEvent::GameOver { reason } => Some(reason.message().to_string()),
        }
    }
}

// ============================================================================
// World
// ============================================================================

#[derive(Debug, Clone)]
pub struct GameState {
    pub tick: u64,
    pub worms: Vec<Option<Worm>>,
    pub bullets: Vec<Bullet>,
    pub explosions: Vec<Explosion>,
    pub decorations: Vec<Decoration>,
    pub shots: Vec<PolylineShot>,
    pub terrain: TerrainMap,
    pub wall_hit_points: WallHitPoints,
    pub rules: GameRules,
    pub tables: StaticTables,
    pub rng: StdRng,
    pub events: Vec<GameEvent>,
}

impl GameState {
    pub fn new(terrain: TerrainMap, rules: GameRules, tables: StaticTables, max_worms: usize, rng: StdRng) -> Self {
        Self {
            tick: 0,
            worms: vec![None; max_worms],
            bullets: Vec::new(),
            explosions: Vec::new(),
            decorations: Vec::new(),
            shots: Vec::new(),
            wall_hit_points: WallHitPoints::new(&terrain),
            terrain,
            rules,
            tables,
            rng,
            events: Vec::new(),
        }
    }

    #[inline]
    pub fn worm(&self, slot: Slot) -> Option<&Worm> {
        self.worms.get(slot)?.as_ref()
    }

    #[inline]
    pub fn worm_mut(&mut self, slot: Slot) -> Option<&mut Worm> {
        self.worms.get_mut(slot)?.as_mut()
    }

    pub fn live_worms(&self) -> impl Iterator<Item = (Slot, &Worm)> {
        self.worms
            .iter()
            .enumerate()
            .filter_map(|(slot, worm)| worm.as_ref().map(|w| (slot, w)))
    }

    pub fn worm_count(&self) -> usize {
        self.worms.iter().filter(|w| w.is_some()).count()
    }

    pub fn free_slot(&self) -> Option<Slot> {
        self.worms.iter().position(Option::is_none)
    }

    #[inline]
    pub fn worm_hit(&self, position: Vec2, extents: Extents, except: Option<Slot>) -> Option<Slot> {
        worm_hit(&self.worms, position, extents, except)
    }

    #[inline]
    pub fn medium_at(&self, position: Vec2) -> Medium {
        medium_at(&self.terrain, position)
    }

    pub fn entity_counts(&self) -> EntityCounts {
        EntityCounts {
            worms: self.worm_count(),
            bullets: self.bullets.len(),
            explosions: self.explosions.len(),
            decorations: self.decorations.len(),
            shots: self.shots.len(),
        }
    }
}

/// Highest occupied slot whose worm box overlaps the given box, skipping
/// `except`
pub fn worm_hit(worms: &[Option<Worm>], position: Vec2, extents: Extents, except: Option<Slot>) -> Option<Slot> {
    worms
        .iter()
        .enumerate()
        .rev()
        .filter(|&(slot, _)| Some(slot) != except)
        .find_map(|(slot, worm)| {
            let worm = worm.as_ref()?;
            boxes_overlap(position, extents, worm.body.position, worm.extents).then_some(slot)
        })
}

/// Air over empty cells, water otherwise
#[inline]
pub fn medium_at(terrain: &TerrainMap, position: Vec2) -> Medium {
    if terrain.wall_at(position) == WallType::Empty {
        Medium::Air
    } else {
        Medium::Water
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntityCounts {
    pub worms: usize,
    pub bullets: usize,
    pub explosions: usize,
    pub decorations: usize,
    pub shots: usize,
}

impl EntityCounts {
    pub fn total(&self) -> usize {
        self.worms + self.bullets + self.explosions + self.decorations + self.shots
    }
}
