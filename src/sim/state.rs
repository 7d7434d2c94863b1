//! Game state and core simulation types
//!
//! Everything the UI layer reads each tick lives in [`GameState`].

use serde::{Deserialize, Serialize};

use crate::tuning::Tuning;

/// Speed profile selected from the menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum GameMode {
    /// Buttons, base speed
    #[default]
    ButtonSlow,
    /// Buttons, 1.7x speed
    ButtonFast,
    /// Tilt steering, speed follows device pitch
    Sensor,
}

impl GameMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::ButtonSlow => "button_slow",
            GameMode::ButtonFast => "button_fast",
            GameMode::Sensor => "sensor",
        }
    }

    /// Parse a mode tag. Unknown tags play as `button_slow`.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "button_fast" => GameMode::ButtonFast,
            "sensor" => GameMode::Sensor,
            "button_slow" => GameMode::ButtonSlow,
            other => {
                log::debug!("Unknown mode tag {other:?}, falling back to button_slow");
                GameMode::ButtonSlow
            }
        }
    }
}

impl From<String> for GameMode {
    fn from(tag: String) -> Self {
        GameMode::from_tag(&tag)
    }
}

impl From<GameMode> for String {
    fn from(mode: GameMode) -> Self {
        mode.as_str().to_string()
    }
}

impl std::fmt::Display for GameMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An obstacle or coin falling down a lane
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Falling {
    pub lane: usize,
    /// 0 = spawn point, 1 = off screen
    pub progress: f32,
}

impl Falling {
    pub fn new(lane: usize, progress: f32) -> Self {
        Self { lane, progress }
    }
}

/// Discrete steering input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Steer {
    Left,
    Right,
}

/// Result of [`Simulation::resolve_collision`](super::Simulation::resolve_collision)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionOutcome {
    NoCollision,
    /// The car hit something this tick (show the crash feedback)
    Collided {
        /// Obstacles removed from the car's lane
        removed: usize,
        lives_left: u8,
        /// This crash ended the run
        game_over: bool,
    },
}

impl CollisionOutcome {
    pub fn is_crash(&self) -> bool {
        matches!(self, CollisionOutcome::Collided { .. })
    }
}

/// Externally visible run state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub lives: u8,
    pub car_lane: usize,
    /// Distance travelled; this is the run's score
    pub odometer: u64,
    /// Coins currently on the track
    pub coins: Vec<Falling>,
    pub collected_coins: u32,
    pub is_game_over: bool,
    pub is_game_running: bool,
}

impl GameState {
    /// Fresh state: full lives, car in the middle lane
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            lives: tuning.max_lives,
            car_lane: tuning.lane_count / 2,
            odometer: 0,
            coins: Vec::new(),
            collected_coins: 0,
            is_game_over: false,
            is_game_running: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_tags() {
        for mode in [GameMode::ButtonSlow, GameMode::ButtonFast, GameMode::Sensor] {
            assert_eq!(GameMode::from_tag(mode.as_str()), mode);
        }
        assert_eq!(GameMode::from_tag("turbo"), GameMode::ButtonSlow);
        assert_eq!(GameMode::from_tag(""), GameMode::ButtonSlow);
    }

    #[test]
    fn test_mode_serde_uses_tags() {
        let json = serde_json::to_string(&GameMode::ButtonFast).unwrap();
        assert_eq!(json, "\"button_fast\"");
        let mode: GameMode = serde_json::from_str("\"hyperdrive\"").unwrap();
        assert_eq!(mode, GameMode::ButtonSlow);
    }

    #[test]
    fn test_new_state_centers_car() {
        let state = GameState::new(&Tuning::default());
        assert_eq!(state.car_lane, 2);
        assert_eq!(state.lives, 3);
        assert!(state.is_game_running);
        assert!(!state.is_game_over);
    }
}
