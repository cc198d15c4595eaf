//! Autopilot decision policy
//!
//! A priority-ordered rule list mapping the current body and obstacles to a
//! jump / no-jump decision. The policy is a pure function of its inputs: it
//! holds no state between calls and never mutates the session, the caller
//! applies the impulse.
//!
//! Rules, highest priority first:
//! 1. Near the ceiling, never jump.
//! 2. Near the floor, always jump.
//! 3. With no obstacle ahead, hold a safe altitude.
//! 4. Far from the target, coarsely steer toward just above the gap center.
//! 5. Close to the target, project the fall forward and jump only to avoid
//!    the lower barrier, and only if the climb that follows stays clear of
//!    the upper one. Otherwise hold, with hysteresis around the gap center.
//!
//! Anything undecided resolves to "no jump": gravity undoes an unneeded hold,
//! nothing undoes a missed jump into the lower barrier.

use serde::{Deserialize, Serialize};

use super::state::{Body, Obstacle};
use crate::config::SimConfig;

/// Which rule produced a decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rule {
    CeilingEmergency,
    GroundEmergency,
    HoldAltitude,
    Approach,
    AvoidLowerBarrier,
    AvoidUpperBarrier,
    CenterHysteresis,
}

/// A jump decision and the rule that made it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub jump: bool,
    pub rule: Rule,
}

impl Decision {
    fn new(jump: bool, rule: Rule) -> Self {
        Self { jump, rule }
    }
}

/// Jump or not, given the current body and obstacles
pub fn decide(body: &Body, obstacles: &[Obstacle], config: &SimConfig) -> bool {
    evaluate_policy(body, obstacles, config).jump
}

/// Full decision including the rule that fired
pub fn evaluate_policy(body: &Body, obstacles: &[Obstacle], config: &SimConfig) -> Decision {
    let ap = &config.autopilot;
    let y = body.pos.y;

    if y < ap.ceiling_margin {
        return Decision::new(false, Rule::CeilingEmergency);
    }
    if y > config.max_body_y() - ap.ground_margin {
        return Decision::new(true, Rule::GroundEmergency);
    }

    let Some(target) = find_target(body, obstacles, config) else {
        let jump = y > config.field_height * ap.safe_altitude_fraction;
        return Decision::new(jump, Rule::HoldAltitude);
    };

    let body_center = y + config.body_size / 2.0;
    let gap_center = target.gap_center();
    // Distance from the body's front to the obstacle's front; negative once inside
    let distance = target.x - (body.pos.x + config.body_size);

    if distance > ap.proximity_threshold {
        let aim = gap_center - ap.approach_offset;
        return Decision::new(body_center > aim + ap.approach_margin, Rule::Approach);
    }

    let ticks = ticks_until_reached(distance, config);
    let fall = sweep_y(y, body.velocity, ticks, config.gravity);

    if fall.lowest + config.body_size > target.gap_bottom - ap.safety_margin {
        let climb = sweep_y(y, config.jump_force, ticks_to_apex(config), config.gravity);
        let clears_top = climb.highest >= target.gap_top + ap.safety_margin;
        let rule = if clears_top {
            Rule::AvoidLowerBarrier
        } else {
            Rule::AvoidUpperBarrier
        };
        return Decision::new(clears_top, rule);
    }
    if fall.highest < target.gap_top + ap.safety_margin {
        return Decision::new(false, Rule::AvoidUpperBarrier);
    }

    let below_center = body_center - gap_center > ap.hysteresis_band;
    let falling = body.velocity > 0.0;
    Decision::new(below_center && falling, Rule::CenterHysteresis)
}

/// Nearest obstacle whose trailing edge is still ahead of the body
pub fn find_target<'a>(body: &Body, obstacles: &'a [Obstacle], config: &SimConfig) -> Option<&'a Obstacle> {
    obstacles
        .iter()
        .filter(|o| o.trailing_edge(config.pipe_width) > body.pos.x)
        .min_by(|a, b| a.x.total_cmp(&b.x))
}

/// Ticks until the obstacle reaches the body, clamped to the projection window
pub fn ticks_until_reached(distance: f32, config: &SimConfig) -> u32 {
    let ap = &config.autopilot;
    let horizon = ap.projection_horizon.max(1);
    let floor = ap.min_projection.clamp(1, horizon);
    let ticks = (distance.max(0.0) / config.pipe_speed).ceil();
    if ticks.is_finite() {
        (ticks as u32).clamp(floor, horizon)
    } else {
        horizon
    }
}

/// Ticks an impulse keeps the body rising
pub fn ticks_to_apex(config: &SimConfig) -> u32 {
    let ticks = (-config.jump_force / config.gravity).ceil();
    if ticks.is_finite() && ticks >= 1.0 {
        ticks as u32
    } else {
        config.autopilot.projection_horizon.max(1)
    }
}

/// Vertical extent of a projected free-fall path (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sweep {
    /// Smallest `y` reached
    pub highest: f32,
    /// Largest `y` reached
    pub lowest: f32,
    /// `y` after the last step
    pub end: f32,
}

/// Step `y` forward `ticks` times under gravity, tracking the extremes.
///
/// The starting point is not part of the sweep; with zero ticks all three
/// fields equal `y`.
pub fn sweep_y(y: f32, velocity: f32, ticks: u32, gravity: f32) -> Sweep {
    let mut y = y;
    let mut velocity = velocity;
    let mut highest = f32::INFINITY;
    let mut lowest = f32::NEG_INFINITY;
    for _ in 0..ticks {
        y += velocity;
        velocity += gravity;
        highest = highest.min(y);
        lowest = lowest.max(y);
    }
    if ticks == 0 {
        highest = y;
        lowest = y;
    }
    Sweep {
        highest,
        lowest,
        end: y,
    }
}

/// Vertical position after `ticks` free-fall steps from the body's current state
pub fn project_y(body: &Body, ticks: u32, gravity: f32) -> f32 {
    sweep_y(body.pos.y, body.velocity, ticks, gravity).end
}
