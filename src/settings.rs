//! Game settings and preferences
//!
//! Persisted separately from the leaderboard as a JSON file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::consts::{COLLISION_PAUSE_MS, TICK_PERIOD_MS};
use crate::persistence::PersistenceError;
use crate::sim::{DriverConfig, GameMode};
use crate::tuning::Tuning;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Name stamped on leaderboard entries
    pub player_name: String,
    /// Mode selected in the menu
    pub mode: GameMode,
    /// Fixed seed for reproducible runs (None = seed from the clock)
    pub seed: Option<u64>,

    // === Timing ===
    /// Tick period (ms)
    pub tick_ms: u64,
    /// Pause after a crash (ms)
    pub collision_pause_ms: u64,

    // === Storage ===
    /// Leaderboard file
    pub leaderboard_path: PathBuf,

    // === Balance ===
    pub tuning: Tuning,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            player_name: "Player".to_string(),
            mode: GameMode::ButtonSlow,
            seed: None,

            tick_ms: TICK_PERIOD_MS,
            collision_pause_ms: COLLISION_PAUSE_MS,

            leaderboard_path: PathBuf::from("lane_runner_scores.json"),

            tuning: Tuning::default(),
        }
    }
}

impl Settings {
    /// Load settings from `path`, falling back to defaults when the file is
    /// missing or unreadable
    pub fn load(path: &Path) -> Self {
        let settings = match std::fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str::<Settings>(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Failed to parse settings file {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(e) => {
                log::warn!("Failed to read settings file {}: {}", path.display(), e);
                Self::default()
            }
        };
        settings.sanitized()
    }

    /// Save settings to `path`
    pub fn save(&self, path: &Path) -> Result<(), PersistenceError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }

    fn sanitized(mut self) -> Self {
        self.tuning = self.tuning.sanitized();
        if self.tick_ms == 0 {
            log::warn!("tick_ms must be positive, using {TICK_PERIOD_MS}");
            self.tick_ms = TICK_PERIOD_MS;
        }
        self
    }

    /// Driver timing derived from these settings
    pub fn driver_config(&self, realtime: bool) -> DriverConfig {
        DriverConfig {
            tick_period: Duration::from_millis(self.tick_ms),
            collision_pause: Duration::from_millis(self.collision_pause_ms),
            realtime,
        }
    }
}
