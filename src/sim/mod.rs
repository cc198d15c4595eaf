//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed tick count only, never wall-clock time
//! - Seeded RNG only
//! - Stable iteration order (ascending obstacle `x`)
//! - No rendering or platform dependencies

pub mod autopilot;
pub mod collision;
pub mod obstacles;
pub mod physics;
pub mod state;
pub mod tick;

pub use autopilot::{Decision, Rule, decide, evaluate_policy};
pub use collision::{Aabb, Evaluation, body_hits_obstacle, evaluate};
pub use obstacles::{advance_obstacles, roll_gap_top};
pub use physics::{StepOutcome, apply_impulse, step_body};
pub use state::{
    Body, ControlMode, ImpulseSource, Obstacle, Phase, RenderSnapshot, Session, SimEvent,
    TickReport,
};
pub use tick::{TickInput, autopilot_tick, physics_tick, tick};
