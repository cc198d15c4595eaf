//! Body integration under gravity and impulse

use super::state::Body;
use crate::config::SimConfig;

/// Result of advancing the body one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepOutcome {
    /// The body stayed inside the field
    Moved(Body),
    /// The step would leave the field; the body is left at its pre-step value
    BoundaryViolation,
}

/// Advance the body one tick: `y += velocity`, then `velocity += gravity`
pub fn step_body(body: &Body, config: &SimConfig) -> StepOutcome {
    let y = body.pos.y + body.velocity;
    if y < 0.0 || y > config.max_body_y() {
        return StepOutcome::BoundaryViolation;
    }

    let mut next = *body;
    next.pos.y = y;
    next.velocity += config.gravity;
    StepOutcome::Moved(next)
}

/// Override vertical velocity with one jump impulse
#[inline]
pub fn apply_impulse(body: &mut Body, config: &SimConfig) {
    body.velocity = config.jump_force;
}
