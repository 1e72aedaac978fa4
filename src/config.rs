use std::ops::RangeInclusive;
use std::str::FromStr;
use std::time::Duration;

use crate::game::scoreboard::Limits;
use crate::game::state::{GameRules, GameType};
use crate::game::terrain::TerrainParams;
use crate::util::vec2::Vec2;

const PERIOD_RANGE: RangeInclusive<u64> = 5..=100;
const MAX_PLAYERS_RANGE: RangeInclusive<usize> = 1..=64;
const MAP_SIDE_RANGE: RangeInclusive<u32> = 8..=1024;
const KILL_LIMIT_RANGE: RangeInclusive<i32> = 1..=2000;
const TIME_LIMIT_RANGE: RangeInclusive<u32> = 1..=2000;
const PERCENT_RANGE: RangeInclusive<u8> = 0..=100;

/// Server configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// Length of one tick in milliseconds
    pub period_millis: u64,
    pub max_players: usize,
    /// Map width in cells; rounded up to a power of two by the terrain
    pub map_width: u32,
    pub map_height: u32,
    pub game_type: GameType,
    pub kill_limit_enabled: bool,
    pub kill_limit: i32,
    pub time_limit_enabled: bool,
    /// Time limit in minutes
    pub time_limit_minutes: u32,
    pub rubble_percent: u8,
    pub blood_percent: u8,
    pub wall_percent: u8,
    pub stone_percent: u8,
    pub water_percent: u8,
    pub wind: Vec2,
    /// Random seed; drawn at startup when unset
    pub seed: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            period_millis: 30,
            max_players: 3,
            map_width: 32,
            map_height: 16,
            game_type: GameType::FreeForAll,
            kill_limit_enabled: false,
            kill_limit: 20,
            time_limit_enabled: false,
            time_limit_minutes: 30,
            rubble_percent: 100,
            blood_percent: 100,
            wall_percent: 40,
            stone_percent: 15,
            water_percent: 40,
            wind: Vec2::ZERO,
            seed: None,
        }
    }
}

/// Rejected configuration values
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be within {min}..={max}, got {value}")]
    OutOfRange {
        name: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },
    #[error("wind must be finite")]
    NonFiniteWind,
}

impl ServerConfig {
    /// Load config from `WORMS_*` environment variables or use defaults
    pub fn load_or_default() -> Self {
        Self::load_from(|name| std::env::var(name).ok())
    }

    /// Load config from any variable source; unparsable or out-of-range
    /// values keep their defaults
    pub fn load_from(var: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        read_in_range(&var, "WORMS_PERIOD_MS", PERIOD_RANGE, &mut config.period_millis);
        read_in_range(&var, "WORMS_MAX_PLAYERS", MAX_PLAYERS_RANGE, &mut config.max_players);
        read_in_range(&var, "WORMS_MAP_WIDTH", MAP_SIDE_RANGE, &mut config.map_width);
        read_in_range(&var, "WORMS_MAP_HEIGHT", MAP_SIDE_RANGE, &mut config.map_height);
        read_in_range(&var, "WORMS_KILL_LIMIT", KILL_LIMIT_RANGE, &mut config.kill_limit);
        read_in_range(&var, "WORMS_TIME_LIMIT_MIN", TIME_LIMIT_RANGE, &mut config.time_limit_minutes);
        read_in_range(&var, "WORMS_RUBBLE_PERCENT", PERCENT_RANGE, &mut config.rubble_percent);
        read_in_range(&var, "WORMS_BLOOD_PERCENT", PERCENT_RANGE, &mut config.blood_percent);
        read_in_range(&var, "WORMS_WALL_PERCENT", PERCENT_RANGE, &mut config.wall_percent);
        read_in_range(&var, "WORMS_STONE_PERCENT", PERCENT_RANGE, &mut config.stone_percent);
        read_in_range(&var, "WORMS_WATER_PERCENT", PERCENT_RANGE, &mut config.water_percent);

        if let Some(enabled) = var("WORMS_KILL_LIMIT_ENABLED") {
            parse_into(&enabled, "WORMS_KILL_LIMIT_ENABLED", &mut config.kill_limit_enabled);
        }
        if let Some(enabled) = var("WORMS_TIME_LIMIT_ENABLED") {
            parse_into(&enabled, "WORMS_TIME_LIMIT_ENABLED", &mut config.time_limit_enabled);
        }

        if let Some(game_type) = var("WORMS_GAME_TYPE") {
            match game_type.to_ascii_lowercase().as_str() {
                "ffa" | "free-for-all" => config.game_type = GameType::FreeForAll,
                "team" | "team-melee" => config.game_type = GameType::TeamMelee,
                _ => tracing::warn!("Invalid WORMS_GAME_TYPE '{}', using default", game_type),
            }
        }

        for (name, component) in [("WORMS_WIND_X", &mut config.wind.x), ("WORMS_WIND_Y", &mut config.wind.y)] {
            if let Some(value) = var(name) {
                match value.parse::<f32>() {
                    Ok(parsed) if parsed.is_finite() => *component = parsed,
                    _ => tracing::warn!("Invalid {} '{}', using default", name, value),
                }
            }
        }

        if let Some(seed) = var("WORMS_SEED") {
            match seed.parse::<u64>() {
                Ok(parsed) => config.seed = Some(parsed),
                Err(_) => tracing::warn!("Invalid WORMS_SEED '{}', using a random seed", seed),
            }
        }

        config
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        check("period_millis", self.period_millis, PERIOD_RANGE)?;
        check("max_players", self.max_players, MAX_PLAYERS_RANGE)?;
        check("map_width", self.map_width, MAP_SIDE_RANGE)?;
        check("map_height", self.map_height, MAP_SIDE_RANGE)?;
        check("kill_limit", self.kill_limit, KILL_LIMIT_RANGE)?;
        check("time_limit_minutes", self.time_limit_minutes, TIME_LIMIT_RANGE)?;
        check("rubble_percent", self.rubble_percent, PERCENT_RANGE)?;
        check("blood_percent", self.blood_percent, PERCENT_RANGE)?;
        check("wall_percent", self.wall_percent, PERCENT_RANGE)?;
        check("stone_percent", self.stone_percent, PERCENT_RANGE)?;
        check("water_percent", self.water_percent, PERCENT_RANGE)?;
        if !self.wind.is_finite() {
            return Err(ConfigError::NonFiniteWind);
        }
        Ok(())
    }

    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_millis)
    }

    pub fn terrain_params(&self) -> TerrainParams {
        TerrainParams {
            width: self.map_width,
            height: self.map_height,
            wall_percent: self.wall_percent,
            stone_percent: self.stone_percent,
            water_percent: self.water_percent,
        }
    }

    pub fn rules(&self) -> GameRules {
        GameRules {
            game_type: self.game_type,
            rubble_percent: self.rubble_percent,
            blood_percent: self.blood_percent,
            wind: self.wind,
        }
    }

    pub fn limits(&self) -> Limits {
        Limits {
            kill_limit: self.kill_limit_enabled.then_some(self.kill_limit),
            time_limit: self
                .time_limit_enabled
                .then(|| Duration::from_secs(u64::from(self.time_limit_minutes) * 60)),
        }
    }
}

fn parse_into<T: FromStr>(value: &str, name: &str, target: &mut T) -> bool {
    match value.trim().parse::<T>() {
        Ok(parsed) => {
            *target = parsed;
            true
        }
        Err(_) => {
            tracing::warn!("Invalid {} '{}', using default", name, value);
            false
        }
    }
}

fn read_in_range<T>(var: &impl Fn(&str) -> Option<String>, name: &str, range: RangeInclusive<T>, target: &mut T)
where
    T: FromStr + PartialOrd + Copy + std::fmt::Display,
{
    let Some(value) = var(name) else {
        return;
    };
    let mut parsed = *target;
    if !parse_into(&value, name, &mut parsed) {
        return;
    }
    if range.contains(&parsed) {
        *target = parsed;
    } else {
        tracing::warn!(
            "{} must be {}-{}, using default",
            name,
            range.start(),
            range.end()
        );
    }
}

fn check<T>(name: &'static str, value: T, range: RangeInclusive<T>) -> Result<(), ConfigError>
where
    T: PartialOrd + Copy + TryInto<i64>,
{
    if range.contains(&value) {
        return Ok(());
    }
    let wide = |v: T| v.try_into().unwrap_or(i64::MAX);
    Err(ConfigError::OutOfRange {
        name,
        value: wide(value),
        min: wide(*range.start()),
        max: wide(*range.end()),
    })
}
