//! Fixed timestep simulation tick
//!
//! One call to [`Simulation::advance_tick`] is one frame of the host timer.

use rand::Rng;
use rand::seq::IndexedRandom;

use super::engine::Simulation;
use super::state::{Falling, GameMode};
use crate::consts::ODOMETER_SCALE;
use crate::tuning::Tuning;

impl<R: Rng> Simulation<R> {
    /// Progress every falling entity moves this tick.
    ///
    /// Never negative, so a bogus sensor multiplier can stall the track but
    /// not run it backwards.
    pub fn step_size(&self) -> f32 {
        let t = &self.tuning;
        let step = match self.mode {
            GameMode::ButtonFast => t.base_step * t.fast_factor,
            GameMode::Sensor => t.base_step * t.sensor_factor * self.sensor_multiplier,
            GameMode::ButtonSlow => t.base_step,
        };
        if step.is_finite() { step.max(0.0) } else { 0.0 }
    }

    /// Advance the run by one tick.
    ///
    /// Order: obstacle motion, obstacle spawn, odometer, coin motion, coin spawn.
    /// Does nothing once the run is no longer running.
    pub fn advance_tick(&mut self) {
        if !self.state.is_game_running {
            return;
        }

        let step = self.step_size();

        advance(&mut self.obstacles, step);
        self.spawn_obstacle();

        let distance = (step * ODOMETER_SCALE).floor() as u64;
        self.state.odometer = self.state.odometer.saturating_add(distance);

        advance(&mut self.state.coins, step);
        self.spawn_coin();
    }

    fn spawn_obstacle(&mut self) {
        if self.obstacles.len() >= self.tuning.max_obstacles {
            return;
        }
        if self.rng.random::<f32>() >= self.tuning.obstacle_spawn_chance {
            return;
        }

        let open: Vec<usize> = (0..self.tuning.lane_count)
            .filter(|&lane| !lane_blocked(&self.obstacles, lane, &self.tuning))
            .collect();

        match open.choose(&mut self.rng) {
            Some(&lane) => {
                log::trace!("Obstacle spawned in lane {lane}");
                self.obstacles.push(Falling::new(lane, 0.0));
            }
            None => log::trace!("Obstacle spawn skipped, every lane blocked"),
        }
    }

    fn spawn_coin(&mut self) {
        if self.rng.random::<f32>() >= self.tuning.coin_spawn_chance {
            return;
        }

        let lane = self.rng.random_range(0..self.tuning.lane_count);
        if lane_blocked(&self.state.coins, lane, &self.tuning) {
            log::trace!("Coin spawn skipped, lane {lane} blocked");
            return;
        }
        log::trace!("Coin spawned in lane {lane}");
        self.state.coins.push(Falling::new(lane, 0.0));
    }
}

/// Move entities down by `step`, dropping anything that left the track
fn advance(entities: &mut Vec<Falling>, step: f32) {
    for e in entities.iter_mut() {
        e.progress += step;
    }
    entities.retain(|e| e.progress < 1.0);
}

/// A lane is blocked for spawning while an entity sits in its top band
fn lane_blocked(entities: &[Falling], lane: usize, tuning: &Tuning) -> bool {
    entities.iter().any(|e| e.lane == lane && tuning.is_near_top(e.progress))
}
