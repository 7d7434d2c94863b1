//! The simulation owner
//!
//! [`Simulation`] holds the run state, the obstacle list and the random
//! source. The tick transition lives in `tick.rs`, car interactions in
//! `collision.rs`.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use thiserror::Error;

use super::state::{Falling, GameMode, GameState, Steer};
use crate::tuning::Tuning;

/// Rejected scenario placement
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlacementError {
    #[error("lane {lane} out of range (lane count {lane_count})")]
    LaneOutOfRange { lane: usize, lane_count: usize },

    #[error("progress {0} outside [0, 1)")]
    ProgressOutOfRange(f32),

    #[error("obstacle cap of {0} reached")]
    ObstacleCapReached(usize),
}

/// A single run of the game.
///
/// Not internally synchronized: the tick driver and the input handlers must
/// call into it from one execution context, one call at a time.
#[derive(Debug, Clone)]
pub struct Simulation<R = Pcg32> {
    pub(crate) tuning: Tuning,
    pub(crate) mode: GameMode,
    pub(crate) state: GameState,
    pub(crate) obstacles: Vec<Falling>,
    pub(crate) sensor_multiplier: f32,
    pub(crate) rng: R,
}

impl Simulation<Pcg32> {
    /// Create a seeded run (same seed + same inputs = same run)
    pub fn new(tuning: Tuning, mode: GameMode, seed: u64) -> Self {
        Self::with_rng(tuning, mode, Pcg32::seed_from_u64(seed))
    }
}

impl<R: Rng> Simulation<R> {
    /// Create a run drawing from an injected random source
    pub fn with_rng(tuning: Tuning, mode: GameMode, rng: R) -> Self {
        let tuning = tuning.sanitized();
        let state = GameState::new(&tuning);
        log::debug!(
            "New run: mode={mode}, lanes={}, lives={}",
            tuning.lane_count,
            tuning.max_lives
        );
        Self {
            sensor_multiplier: tuning.default_sensor_multiplier,
            obstacles: Vec::with_capacity(tuning.max_obstacles),
            tuning,
            mode,
            state,
            rng,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn obstacles(&self) -> &[Falling] {
        &self.obstacles
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn speed_multiplier(&self) -> f32 {
        self.sensor_multiplier
    }

    /// Set the sensor-mode speed multiplier.
    ///
    /// Stored as given; callers clamp to [0.5, 3.0]. Only `sensor` mode reads it.
    pub fn set_speed_multiplier(&mut self, multiplier: f32) {
        self.sensor_multiplier = multiplier;
    }

    pub fn steer_left(&mut self) {
        if self.state.car_lane > 0 {
            self.state.car_lane -= 1;
        }
    }

    pub fn steer_right(&mut self) {
        if self.state.car_lane + 1 < self.tuning.lane_count {
            self.state.car_lane += 1;
        }
    }

    pub fn steer(&mut self, steer: Steer) {
        match steer {
            Steer::Left => self.steer_left(),
            Steer::Right => self.steer_right(),
        }
    }

    /// Teardown: stop the run without ending it as a loss.
    ///
    /// Any in-flight driver check observes `is_game_running == false`.
    pub fn stop(&mut self) {
        if self.state.is_game_running {
            log::debug!("Run stopped at odometer {}", self.state.odometer);
        }
        self.state.is_game_running = false;
    }

    /// Put an obstacle on the track directly (scripted scenarios, replays)
    pub fn place_obstacle(&mut self, lane: usize, progress: f32) -> Result<(), PlacementError> {
        self.check_placement(lane, progress)?;
        if self.obstacles.len() >= self.tuning.max_obstacles {
            return Err(PlacementError::ObstacleCapReached(self.tuning.max_obstacles));
        }
        self.obstacles.push(Falling::new(lane, progress));
        Ok(())
    }

    /// Put a coin on the track directly (scripted scenarios, replays)
    pub fn place_coin(&mut self, lane: usize, progress: f32) -> Result<(), PlacementError> {
        self.check_placement(lane, progress)?;
        self.state.coins.push(Falling::new(lane, progress));
        Ok(())
    }

    fn check_placement(&self, lane: usize, progress: f32) -> Result<(), PlacementError> {
        if lane >= self.tuning.lane_count {
            return Err(PlacementError::LaneOutOfRange {
                lane,
                lane_count: self.tuning.lane_count,
            });
        }
        if !(0.0..1.0).contains(&progress) {
            return Err(PlacementError::ProgressOutOfRange(progress));
        }
        Ok(())
    }
}
