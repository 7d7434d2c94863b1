//! Reference tick driver
//!
//! Owns a [`Simulation`] and runs the per-tick contract the UI layer must
//! follow: `advance_tick`, then `collect_coin`, then `resolve_collision`.
//! Stops the moment the run ends and hands back a [`RunSummary`] for the
//! leaderboard.

use std::thread;
use std::time::Duration;

use rand::Rng;
use rand_pcg::Pcg32;

use super::engine::Simulation;
use super::state::{CollisionOutcome, Steer};
use crate::highscores::HighScoreEntry;

/// What happened during one driven tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub coins_collected: usize,
    pub collision: CollisionOutcome,
}

/// Final numbers of a finished (or stopped) run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub score: u64,
    pub coins: u32,
    pub game_mode: String,
    pub ticks: u64,
    pub game_over: bool,
}

impl RunSummary {
    /// Turn the summary into a leaderboard entry
    pub fn into_entry(
        self,
        player_name: impl Into<String>,
        timestamp: u64,
        location: Option<(f64, f64)>,
    ) -> HighScoreEntry {
        HighScoreEntry {
            player_name: player_name.into(),
            score: self.score,
            coins: self.coins,
            game_mode: self.game_mode,
            timestamp,
            latitude: location.map(|(lat, _)| lat),
            longitude: location.map(|(_, lng)| lng),
        }
    }
}

/// Driver timing
#[derive(Debug, Clone, Copy)]
pub struct DriverConfig {
    pub tick_period: Duration,
    /// Extra pause after a crash
    pub collision_pause: Duration,
    /// Sleep between ticks (false = run as fast as possible)
    pub realtime: bool,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            tick_period: Duration::from_millis(crate::consts::TICK_PERIOD_MS),
            collision_pause: Duration::from_millis(crate::consts::COLLISION_PAUSE_MS),
            realtime: false,
        }
    }
}

pub struct TickDriver<R = Pcg32> {
    sim: Simulation<R>,
    config: DriverConfig,
    ticks: u64,
}

impl<R: Rng> TickDriver<R> {
    pub fn new(sim: Simulation<R>, config: DriverConfig) -> Self {
        Self {
            sim,
            config,
            ticks: 0,
        }
    }

    pub fn sim(&self) -> &Simulation<R> {
        &self.sim
    }

    /// Player actions between ticks go through here
    pub fn sim_mut(&mut self) -> &mut Simulation<R> {
        &mut self.sim
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn is_running(&self) -> bool {
        self.sim.state().is_game_running
    }

    /// Run one tick of the contract. Returns None once the run has stopped.
    pub fn step(&mut self) -> Option<TickReport> {
        if !self.is_running() {
            return None;
        }
        self.sim.advance_tick();
        let coins_collected = self.sim.collect_coin();
        let collision = self.sim.resolve_collision();
        self.ticks += 1;
        Some(TickReport {
            coins_collected,
            collision,
        })
    }

    /// Drive the run until it ends or `max_ticks` is reached.
    ///
    /// `pilot` is asked for a steer before every tick.
    pub fn run<F>(&mut self, mut pilot: F, max_ticks: Option<u64>) -> RunSummary
    where
        F: FnMut(&Simulation<R>) -> Option<Steer>,
    {
        while self.is_running() {
            if max_ticks.is_some_and(|max| self.ticks >= max) {
                log::info!("Tick limit reached, stopping run");
                self.stop();
                break;
            }
            if let Some(steer) = pilot(&self.sim) {
                self.sim.steer(steer);
            }
            let Some(report) = self.step() else { break };

            if self.config.realtime {
                let mut pause = self.config.tick_period;
                if report.collision.is_crash() && self.is_running() {
                    pause += self.config.collision_pause;
                }
                thread::sleep(pause);
            }
        }
        self.summary()
    }

    /// Teardown: no further ticks will run
    pub fn stop(&mut self) {
        self.sim.stop();
    }

    pub fn summary(&self) -> RunSummary {
        let state = self.sim.state();
        RunSummary {
            score: state.odometer,
            coins: state.collected_coins,
            game_mode: self.sim.mode().as_str().to_string(),
            ticks: self.ticks,
            game_over: state.is_game_over,
        }
    }
}

/// Simple dodging pilot for demos and soak runs.
///
/// Leaves a lane when an obstacle is closing in on the car, preferring the
/// neighbour with the most headroom. Otherwise drifts toward a coin that is
/// coming down in an adjacent lane.
pub fn autopilot<R: Rng>(sim: &Simulation<R>) -> Option<Steer> {
    let tuning = sim.tuning();
    let lane = sim.state().car_lane;
    let lookahead = tuning.car_row - 0.3;

    // Distance until the nearest obstacle reaches the car band (None = clear)
    let threat = |l: usize| -> Option<f32> {
        sim.obstacles()
            .iter()
            .filter(|o| o.lane == l && o.progress >= lookahead && o.progress < tuning.car_row + tuning.car_band)
            .map(|o| (tuning.car_row - o.progress).max(0.0))
            .reduce(f32::min)
    };

    let neighbours = [
        (lane.checked_sub(1), Steer::Left),
        (Some(lane + 1).filter(|&l| l < tuning.lane_count), Steer::Right),
    ];

    if threat(lane).is_some() {
        return neighbours
            .iter()
            .filter_map(|&(l, steer)| l.map(|l| (threat(l).unwrap_or(f32::MAX), steer)))
            .filter(|&(headroom, _)| headroom > threat(lane).unwrap_or(0.0))
            .max_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, steer)| steer);
    }

    neighbours.iter().find_map(|&(l, steer)| {
        let l = l?;
        let coin_near = sim
            .state()
            .coins
            .iter()
            .any(|c| c.lane == l && c.progress >= lookahead && c.progress < tuning.car_row);
        (coin_near && threat(l).is_none()).then_some(steer)
    })
}
