//! Tilt sensor input
//!
//! Translates raw accelerometer readings (m/s²) into the two calls the
//! simulation understands: discrete steers and a speed multiplier. The
//! simulation itself never sees sensor units.

use rand::Rng;

use crate::sim::{Simulation, Steer};

/// Slowest sensor-mode multiplier (device tilted fully back)
pub const MIN_SPEED_MULTIPLIER: f32 = 0.5;
/// Multiplier with the device held upright
pub const NEUTRAL_SPEED_MULTIPLIER: f32 = 1.5;
/// Fastest sensor-mode multiplier (device tilted fully forward)
pub const MAX_SPEED_MULTIPLIER: f32 = 3.0;

/// Pitch at which the multiplier saturates (≈45° of gravity)
pub const PITCH_LIMIT: f32 = 6.93;
/// Roll needed before a tilt counts as a steer
pub const ROLL_THRESHOLD: f32 = 2.0;
/// Minimum time between tilt steers, so one lean moves one lane
pub const STEER_COOLDOWN_MS: u64 = 400;

/// One accelerometer sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TiltReading {
    /// Left/right roll; positive = tilted left
    pub x: f32,
    /// Forward/back pitch; positive = tilted forward
    pub z: f32,
}

/// Map forward pitch to a speed multiplier in [0.5, 3.0].
///
/// Upright (0) is 1.5x, interpolated linearly out to ±[`PITCH_LIMIT`].
pub fn speed_from_pitch(z: f32) -> f32 {
    if z.is_nan() {
        return NEUTRAL_SPEED_MULTIPLIER;
    }
    let speed = if z >= 0.0 {
        let t = (z / PITCH_LIMIT).min(1.0);
        NEUTRAL_SPEED_MULTIPLIER + t * (MAX_SPEED_MULTIPLIER - NEUTRAL_SPEED_MULTIPLIER)
    } else {
        let t = ((z + PITCH_LIMIT) / PITCH_LIMIT).max(0.0);
        MIN_SPEED_MULTIPLIER + t * (NEUTRAL_SPEED_MULTIPLIER - MIN_SPEED_MULTIPLIER)
    };
    speed.clamp(MIN_SPEED_MULTIPLIER, MAX_SPEED_MULTIPLIER)
}

/// Map roll to a steer direction, ignoring small tilts
pub fn steer_from_roll(x: f32) -> Option<Steer> {
    if x > ROLL_THRESHOLD {
        Some(Steer::Left)
    } else if x < -ROLL_THRESHOLD {
        Some(Steer::Right)
    } else {
        None
    }
}

/// Rate-limited tilt steering
#[derive(Debug, Clone)]
pub struct TiltSteering {
    cooldown_ms: u64,
    last_steer_ms: Option<u64>,
}

impl Default for TiltSteering {
    fn default() -> Self {
        Self::new(STEER_COOLDOWN_MS)
    }
}

impl TiltSteering {
    pub fn new(cooldown_ms: u64) -> Self {
        Self {
            cooldown_ms,
            last_steer_ms: None,
        }
    }

    /// Feed a reading taken at `now_ms`; returns a steer if one is due
    pub fn update(&mut self, x: f32, now_ms: u64) -> Option<Steer> {
        if let Some(last) = self.last_steer_ms {
            if now_ms.saturating_sub(last) <= self.cooldown_ms {
                return None;
            }
        }
        let steer = steer_from_roll(x)?;
        self.last_steer_ms = Some(now_ms);
        Some(steer)
    }

    /// Apply a reading to a sensor-mode run: update speed, maybe steer.
    ///
    /// Returns the steer that was applied, if any.
    pub fn apply<R: Rng>(
        &mut self,
        sim: &mut Simulation<R>,
        reading: TiltReading,
        now_ms: u64,
    ) -> Option<Steer> {
        sim.set_speed_multiplier(speed_from_pitch(reading.z));
        let steer = self.update(reading.x, now_ms)?;
        sim.steer(steer);
        Some(steer)
    }
}
