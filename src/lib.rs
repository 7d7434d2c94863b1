//! Lane Runner - A lane-dodging arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, motion, collisions, lives)
//! - `highscores`: Ranked top-10 leaderboard with change subscriptions
//! - `persistence`: Key-value storage backends for the leaderboard
//! - `input`: Tilt sensor to steering/speed translation
//! - `settings`: Player preferences and run configuration
//! - `tuning`: Data-driven game balance

pub mod highscores;
pub mod input;
pub mod persistence;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use highscores::{HighScoreEntry, HighScores, Leaderboard};
pub use settings::Settings;
pub use sim::{CollisionOutcome, GameMode, GameState, Simulation};
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Fixed tick period driven by the host timer (ms)
    pub const TICK_PERIOD_MS: u64 = 30;
    /// Pause after a crash before ticking resumes (ms)
    pub const COLLISION_PAUSE_MS: u64 = 200;

    /// Lane layout
    pub const LANE_COUNT: usize = 5;
    pub const MAX_LIVES: u8 = 3;

    /// Obstacle cap on screen at once
    pub const MAX_OBSTACLES: usize = 4;
    /// Progress advanced per tick at base speed (1.5% of the track)
    pub const BASE_STEP: f32 = 0.015;

    /// Per-tick spawn probabilities
    pub const OBSTACLE_SPAWN_CHANCE: f32 = 0.08;
    pub const COIN_SPAWN_CHANCE: f32 = 0.02;

    /// Entities below this progress block a new spawn in their lane
    pub const NEAR_TOP: f32 = 0.15;

    /// Car row; collisions and pickups happen in [CAR_ROW, CAR_ROW + CAR_BAND)
    pub const CAR_ROW: f32 = 0.8;
    pub const CAR_BAND: f32 = 0.08;

    /// Mode speed factors
    pub const FAST_FACTOR: f32 = 1.7;
    pub const SENSOR_FACTOR: f32 = 0.8;
    /// Sensor multiplier before the first tilt reading arrives
    pub const DEFAULT_SENSOR_MULTIPLIER: f32 = 1.5;

    /// Odometer units per unit of progress
    pub const ODOMETER_SCALE: f32 = 100.0;
}

/// Current wall-clock time as Unix epoch milliseconds
pub fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
