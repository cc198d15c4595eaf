//! Collision detection and scoring
//!
//! The body and both barriers of an obstacle are axis-aligned boxes. A hit is
//! any horizontal overlap while the body is not fully inside the gap; a point
//! is scored the first time the body clears an obstacle's trailing edge.

use glam::Vec2;

use super::state::{Body, Obstacle, SimEvent, TickReport};
use crate::config::SimConfig;

/// Axis-aligned bounding box (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, size: Vec2) -> Self {
        Self {
            min,
            max: min + size,
        }
    }

    pub fn of_body(body: &Body, config: &SimConfig) -> Self {
        Self::new(body.pos, Vec2::splat(config.body_size))
    }

    /// Horizontal overlap only (touching edges do not overlap)
    #[inline]
    pub fn overlaps_x(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x && self.max.x > other.min.x
    }

    /// True if this box lies within the vertical band `[top, bottom]`
    #[inline]
    pub fn within_y(&self, top: f32, bottom: f32) -> bool {
        self.min.y >= top && self.max.y <= bottom
    }
}

/// Horizontal extent of an obstacle as a full-height box
pub fn obstacle_column(obstacle: &Obstacle, config: &SimConfig) -> Aabb {
    Aabb::new(
        Vec2::new(obstacle.x, 0.0),
        Vec2::new(config.pipe_width, config.field_height),
    )
}

/// True if the body overlaps either barrier of the obstacle
pub fn body_hits_obstacle(body: &Body, obstacle: &Obstacle, config: &SimConfig) -> bool {
    let body_box = Aabb::of_body(body, config);
    body_box.overlaps_x(&obstacle_column(obstacle, config))
        && !body_box.within_y(obstacle.gap_top, obstacle.gap_bottom)
}

/// True if the body has cleared the obstacle's trailing edge
#[inline]
pub fn body_cleared(body: &Body, obstacle: &Obstacle, config: &SimConfig) -> bool {
    body.pos.x > obstacle.trailing_edge(config.pipe_width)
}

/// Outcome of checking one tick's state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Evaluation {
    /// Number of obstacles newly marked passed
    pub points: u32,
    /// First obstacle the body collided with, if any
    pub collision: Option<u32>,
    pub report: TickReport,
}

/// Score and collide the body against every tracked obstacle, in ascending `x`.
///
/// `passed` flags are updated in place; `score` is the running total
/// before this tick and is only used to label `Scored` events.
pub fn evaluate(body: &Body, obstacles: &mut [Obstacle], score: u32, config: &SimConfig) -> Evaluation {
    let mut eval = Evaluation::default();

    for obstacle in obstacles.iter_mut() {
        if !obstacle.passed && body_cleared(body, obstacle, config) {
            obstacle.passed = true;
            eval.points += 1;
            eval.report.push(SimEvent::Scored {
                id: obstacle.id,
                score: score + eval.points,
            });
        }

        if body_hits_obstacle(body, obstacle, config) {
            eval.collision = Some(obstacle.id);
            eval.report.push(SimEvent::Collision { id: obstacle.id });
            break;
        }
    }

    eval
}
