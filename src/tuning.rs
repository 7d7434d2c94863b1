//! Data-driven game balance
//!
//! Every number the simulation reads lives here so runs can be rebalanced
//! from a settings file without touching the tick code.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Balance values for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Number of lanes (fixed for the whole run)
    pub lane_count: usize,
    /// Lives at the start of a run
    pub max_lives: u8,
    /// Obstacle cap
    pub max_obstacles: usize,
    /// Progress per tick at base speed
    pub base_step: f32,
    pub obstacle_spawn_chance: f32,
    pub coin_spawn_chance: f32,
    /// Spawn exclusion band at the top of each lane
    pub near_top: f32,
    /// Start of the collision/collection band
    pub car_row: f32,
    /// Height of the collision/collection band
    pub car_band: f32,
    pub fast_factor: f32,
    pub sensor_factor: f32,
    pub default_sensor_multiplier: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            lane_count: LANE_COUNT,
            max_lives: MAX_LIVES,
            max_obstacles: MAX_OBSTACLES,
            base_step: BASE_STEP,
            obstacle_spawn_chance: OBSTACLE_SPAWN_CHANCE,
            coin_spawn_chance: COIN_SPAWN_CHANCE,
            near_top: NEAR_TOP,
            car_row: CAR_ROW,
            car_band: CAR_BAND,
            fast_factor: FAST_FACTOR,
            sensor_factor: SENSOR_FACTOR,
            default_sensor_multiplier: DEFAULT_SENSOR_MULTIPLIER,
        }
    }
}

impl Tuning {
    /// Returns true if `progress` lies in the car's collision/collection band
    #[inline]
    pub fn in_car_band(&self, progress: f32) -> bool {
        progress >= self.car_row && progress < self.car_row + self.car_band
    }

    /// Returns true if `progress` is close enough to the top to block a spawn
    #[inline]
    pub fn is_near_top(&self, progress: f32) -> bool {
        progress < self.near_top
    }

    /// Repair values that would break the simulation invariants.
    ///
    /// Applied when tuning comes from an untrusted settings file.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if self.lane_count == 0 {
            log::warn!("lane_count must be at least 1, using {}", defaults.lane_count);
            self.lane_count = defaults.lane_count;
        }
        if self.max_lives == 0 {
            log::warn!("max_lives must be at least 1, using {}", defaults.max_lives);
            self.max_lives = defaults.max_lives;
        }
        if !(self.base_step.is_finite() && self.base_step > 0.0 && self.base_step < 1.0) {
            log::warn!("base_step {} out of range, using {}", self.base_step, defaults.base_step);
            self.base_step = defaults.base_step;
        }
        self.obstacle_spawn_chance = self.obstacle_spawn_chance.clamp(0.0, 1.0);
        self.coin_spawn_chance = self.coin_spawn_chance.clamp(0.0, 1.0);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_car_band_edges() {
        let t = Tuning::default();
        assert!(!t.in_car_band(0.79));
        assert!(t.in_car_band(0.8));
        assert!(t.in_car_band(0.87));
        assert!(!t.in_car_band(0.88));
    }

    #[test]
    fn test_sanitized_repairs_zero_lanes() {
        let t = Tuning {
            lane_count: 0,
            max_lives: 0,
            base_step: -1.0,
            obstacle_spawn_chance: 4.0,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(t.lane_count, LANE_COUNT);
        assert_eq!(t.max_lives, MAX_LIVES);
        assert_eq!(t.base_step, BASE_STEP);
        assert_eq!(t.obstacle_spawn_chance, 1.0);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let t: Tuning = serde_json::from_str(r#"{"lane_count": 3}"#).unwrap();
        assert_eq!(t.lane_count, 3);
        assert_eq!(t.max_obstacles, MAX_OBSTACLES);
    }
}
