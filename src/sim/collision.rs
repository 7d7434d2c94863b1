//! Car interactions: coin pickup and obstacle crashes
//!
//! Both use the same band: an entity in the car's lane with progress in
//! `[car_row, car_row + car_band)` is touching the car.

use rand::Rng;

use super::engine::Simulation;
use super::state::{CollisionOutcome, Falling};
use crate::tuning::Tuning;

/// True if `entity` is in `lane` and inside the car band
#[inline]
fn touching(tuning: &Tuning, lane: usize, entity: &Falling) -> bool {
    entity.lane == lane && tuning.in_car_band(entity.progress)
}

impl<R: Rng> Simulation<R> {
    /// Pick up every coin touching the car. Returns how many were collected.
    pub fn collect_coin(&mut self) -> usize {
        let lane = self.state.car_lane;
        let before = self.state.coins.len();
        let tuning = &self.tuning;
        self.state.coins.retain(|c| !touching(tuning, lane, c));

        let collected = before - self.state.coins.len();
        if collected > 0 {
            self.state.collected_coins += collected as u32;
            log::debug!(
                "Collected {collected} coin(s) in lane {lane}, total {}",
                self.state.collected_coins
            );
        }
        collected
    }

    /// Does an obstacle touch the car right now? Pure query.
    pub fn detect_collision(&self) -> bool {
        let lane = self.state.car_lane;
        self.obstacles.iter().any(|o| touching(&self.tuning, lane, o))
    }

    /// Check for a crash and apply it.
    ///
    /// On a hit: one life lost, the colliding obstacles removed, and the run
    /// ended in this same call if that was the last life. Otherwise nothing
    /// changes.
    pub fn resolve_collision(&mut self) -> CollisionOutcome {
        if !self.detect_collision() {
            return CollisionOutcome::NoCollision;
        }

        let lane = self.state.car_lane;
        let before = self.obstacles.len();
        let tuning = &self.tuning;
        self.obstacles.retain(|o| !touching(tuning, lane, o));
        let removed = before - self.obstacles.len();

        self.state.lives = self.state.lives.saturating_sub(1);
        let game_over = self.state.lives == 0;
        if game_over {
            self.state.is_game_over = true;
            self.state.is_game_running = false;
            log::info!(
                "Game over: odometer {}, coins {}",
                self.state.odometer,
                self.state.collected_coins
            );
        } else {
            log::debug!("Crash in lane {lane}, {} lives left", self.state.lives);
        }

        CollisionOutcome::Collided {
            removed,
            lives_left: self.state.lives,
            game_over,
        }
    }
}
