/// Force model constants
pub mod physics {
    /// Gravitational acceleration per tick, downward
    pub const G: f32 = 0.5;
    /// Shape resistance force unit in air (and on ground)
    pub const AIR_RESISTANCE_UNIT: f32 = 0.03;
    /// Shape resistance force unit in water
    pub const WATER_RESISTANCE_UNIT: f32 = 0.2;
    /// Cap of the shape resistance force, per axis
    pub const MAX_RESISTANCE_FORCE: f32 = 2.0;
    /// Density used for buoyancy: force = WATER_DENSITY * G * capacity
    pub const WATER_DENSITY: f32 = 1000.0;
    /// Ground friction coefficient against the vertical force
    pub const GROUND_FRICTION: f32 = 0.3;
    /// Velocities below this magnitude snap to zero while resolving a collision
    pub const VELOCITY_SNAP: f32 = 0.1;
    /// Upper bound on halve-and-retry iterations for one axis
    pub const MAX_RESOLVE_ITERATIONS: u32 = 64;
}

/// Terrain grid constants
pub mod terrain {
    /// Cell width in pixels
    pub const WALL_WIDTH: i32 = 32;
    /// Cell height in pixels
    pub const WALL_HEIGHT: i32 = 32;
    /// log2(WALL_WIDTH)
    pub const WALL_WIDTH_SHIFT: i32 = 5;
    /// log2(WALL_HEIGHT)
    pub const WALL_HEIGHT_SHIFT: i32 = 5;
    /// Hit points of a fresh brick cell
    pub const MAX_WALL_HIT_POINTS: i32 = 200;
    /// Rubble decorations per destroyed wall at 100 % rubble amount
    pub const RUBBLES_PER_WALL: i32 = 30;
    /// Cells cleared around a spawning worm, as (dx, dy)
    pub const ENTERING_CLEAR_OFFSETS: [(i32, i32); 4] = [(0, -1), (-1, 0), (0, 0), (1, 0)];
}

/// Worm body and survival constants
pub mod worm {
    pub const WIDTH: i32 = 21;
    pub const HEIGHT: i32 = 26;
    pub const MASS: f32 = 1.0;
    pub const RESISTANCE_RATE: f32 = 0.4;
    pub const CAPACITY: f32 = 0.00093;
    pub const ANTI_GRAVITY: f32 = 0.0;
    pub const MAX_HIT_POINTS: i32 = 200;
    pub const MAX_OXYGEN: i32 = 1000;
    /// Oxygen regained per tick out of water
    pub const OXYGEN_REFILL: i32 = 10;
    /// Damage per tick when drowning with an empty bottle
    pub const DROWNING_DAMAGE: i32 = 1;
    /// Blood decorations spawned when losing all hit points at 100 % blood amount
    pub const TOTAL_BLOOD: i32 = 200;
    /// Animation phase counts per direction (GroundRight, GroundLeft, AirRight, AirLeft)
    pub const PHASE_COUNTS: [u8; 4] = [3, 3, 4, 4];
    /// Standing phase per direction
    pub const STANDING_PHASES: [u8; 4] = [1, 1, 1, 2];
    /// Walk cycle length; the phase advances every `ANIMATION_CYCLE / phase_count` ticks
    pub const ANIMATION_CYCLE: u64 = 21;
    /// Pause requests granted per worm per game
    pub const MAX_PAUSES: u8 = 3;
}

/// Key-driven movement constants
pub mod movement {
    pub const JUMPING_VELOCITY: f32 = 8.5;
    pub const WALKING_VELOCITY: f32 = 1.3;
    pub const GROUND_ACCELERATION: f32 = 0.25;
    pub const FLYING_VELOCITY: f32 = 1.2;
    pub const AIR_ACCELERATION: f32 = 0.1;
    pub const SWIMMING_VELOCITY: f32 = 0.8;
    pub const WATER_ACCELERATION: f32 = 0.15;
}

/// Grapple rope constants
pub mod rope {
    pub const MASS: f32 = 1.0;
    pub const RESISTANCE_RATE: f32 = 0.01;
    pub const CAPACITY: f32 = 0.02;
    pub const ANTI_GRAVITY: f32 = 0.95;
    pub const WIDTH: i32 = 6;
    pub const HEIGHT: i32 = 6;
    /// Launch speed of a cast rope
    pub const CAST_VELOCITY: f32 = 12.0;
    /// Speed added along the rope while climbing
    pub const CLIMBING_VELOCITY: f32 = 2.5;
}

/// Bullet body constants
pub mod bullets {
    pub mod point {
        pub const MASS: f32 = 0.01;
        pub const RESISTANCE_RATE: f32 = 0.00015;
        pub const CAPACITY: f32 = 0.000_000_3;
        pub const ANTI_GRAVITY: f32 = 0.97;
        pub const WIDTH: i32 = 4;
        pub const HEIGHT: i32 = 4;
        pub const VELOCITY: f32 = 8.0;
    }

    pub mod grenade {
        pub const MASS: f32 = 0.5;
        pub const RESISTANCE_RATE: f32 = 0.015;
        pub const CAPACITY: f32 = 0.00015;
        pub const ANTI_GRAVITY: f32 = 0.6;
        pub const WIDTH: i32 = 6;
        pub const HEIGHT: i32 = 6;
        pub const VELOCITY: f32 = 7.0;
        /// Fraction of axis velocity kept (and reversed) on a bounce
        pub const RESTITUTION: f32 = 0.8;
        /// Ticks after spawn before the fuse detonates the grenade
        pub const DETONATION_TICKS: u64 = 80;
        pub const EXPLOSION_RADIUS: i32 = 100;
        pub const EXPLOSION_DAMAGE: i32 = 25;
        pub const SPLINTER_COUNT: usize = 50;
        pub const SPLINTER_DAMAGE: i32 = 25;
    }

    pub mod rocket {
        pub const MASS: f32 = 1.0;
        pub const RESISTANCE_RATE: f32 = 0.055;
        pub const CAPACITY: f32 = 0.000014;
        pub const ANTI_GRAVITY: f32 = 0.85;
        pub const WIDTH: i32 = 26;
        pub const HEIGHT: i32 = 26;
        pub const VELOCITY: f32 = 10.0;
        pub const EXPLOSION_RADIUS: i32 = 90;
        pub const EXPLOSION_DAMAGE: i32 = 20;
    }
}

/// Weapon timing and payload constants
pub mod weapons {
    pub const RIFLE_RELOAD: u32 = 7;
    pub const RIFLE_DAMAGE: i32 = 11;

    pub const SHOTGUN_RELOAD: u32 = 55;
    pub const SHOTGUN_PELLETS: usize = 14;
    /// Full scatter cone of the shotgun
    pub const SHOTGUN_SCATTER: f32 = std::f32::consts::PI / 13.0;
    pub const SHOTGUN_DAMAGE: i32 = 8;

    pub const GRENADE_LAUNCHER_RELOAD: u32 = 90;
    pub const ROCKET_LAUNCHER_RELOAD: u32 = 120;

    pub const LASER_MAX_RELOAD: u32 = 180;
    pub const LASER_SHOT_COST: u32 = 4;
    pub const LASER_STEP: f32 = 4.0;
    /// Refractive index ratio when entering water from air
    pub const AIR_TO_WATER_INDEX: f32 = 4.0 / 3.0;
    pub const LASER_DAMAGE: i32 = 2;
    /// Breaking points a single trace may produce
    pub const LASER_MAX_SEGMENTS: usize = 64;

    pub const THUNDERBOLT_MAX_RELOAD: u32 = 200;
    pub const THUNDERBOLT_SHOT_COST: u32 = 7;
    pub const THUNDERBOLT_MAX_RANGE: i32 = 100;
    pub const LIGHTNING_COMPONENTS: usize = 16;
    pub const LIGHTNING_DISPERSION: f32 = 10.0;
    pub const LIGHTNING_BLAST_RADIUS: i32 = 20;
    pub const LIGHTNING_BLAST_DAMAGE: i32 = 4;

    /// Box of the probe used to place polyline shot origins outside the worm
    pub const MUZZLE_PROBE_SIZE: i32 = 2;
}

/// Explosion constants
pub mod explosion {
    /// Radius lost per tick
    pub const RADIUS_DECREMENT: i32 = 5;
    /// Number of colored zones drawn per explosion
    pub const ZONE_COUNT: usize = 8;
    /// Radius difference between two zones
    pub const ZONE_SPACING: i32 = 15;
}

/// Cosmetic decoration constants
pub mod decoration {
    pub const MASS: f32 = 0.5;
    pub const RESISTANCE_RATE: f32 = 0.3;
    pub const CAPACITY: f32 = 0.00001;
    pub const ANTI_GRAVITY: f32 = 0.0;
    pub const VELOCITY: f32 = 10.0;
}

/// Spawn placement constants
pub mod spawn {
    /// Failed attempts after which a stone candidate cell is turned to brick
    pub const STONE_CONVERSION_ATTEMPT: u32 = 2000;
    /// Random attempts before falling back to a deterministic scan
    pub const MAX_RANDOM_ATTEMPTS: u32 = 10_000;
}

/// Session constants
pub mod session {
    /// Seconds of simulated time between periodic stats logs
    pub const STATS_INTERVAL_SECS: u64 = 30;
    /// Commands buffered between two ticks before backpressure
    pub const COMMAND_BUFFER_CAPACITY: usize = 1024;
}
