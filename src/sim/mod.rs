//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed tick only
//! - Injected, seedable RNG only
//! - No rendering, storage or platform dependencies

pub mod collision;
pub mod driver;
pub mod engine;
pub mod state;
pub mod tick;

pub use driver::{DriverConfig, RunSummary, TickDriver, TickReport, autopilot};
pub use engine::{PlacementError, Simulation};
pub use state::{CollisionOutcome, Falling, GameMode, GameState, Steer};
