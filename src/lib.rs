//! Gap Runner - a side-scrolling obstacle-avoidance simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, obstacles, collisions, autopilot)
//! - `schedule`: Fixed-rate periodic tasks driven by host elapsed time
//! - `config`: Tunable constants and difficulty presets
//! - `highscores`: In-memory leaderboard of finished runs

pub mod config;
pub mod error;
pub mod highscores;
pub mod schedule;
pub mod sim;

pub use config::{AutopilotConfig, Difficulty, SimConfig};
pub use error::ConfigError;
pub use highscores::HighScores;
pub use schedule::{PeriodicTask, Scheduler};

/// Timing constants
pub mod consts {
    /// Physics/obstacle/collision tick rate (steps per second)
    pub const PHYSICS_HZ: f32 = 60.0;
    /// Autopilot decision rate (steps per second)
    pub const AUTOPILOT_HZ: f32 = 20.0;
    /// Fixed physics timestep in seconds
    pub const PHYSICS_DT: f32 = 1.0 / PHYSICS_HZ;
    /// Fixed autopilot timestep in seconds
    pub const AUTOPILOT_DT: f32 = 1.0 / AUTOPILOT_HZ;
    /// Maximum ticks per task per host frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Largest host frame delta accepted before clamping (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;
}
