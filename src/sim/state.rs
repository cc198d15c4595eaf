//! Session state and core simulation types
//!
//! One authoritative `Session` owns the body, the obstacle stream, the score
//! and the seeded RNG. Everything the presentation layer needs is exposed
//! through `RenderSnapshot`, a pure projection taken once per tick.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::config::SimConfig;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Waiting for the first control input
    Idle,
    /// Active gameplay
    Running,
    /// Run ended; only a reset recovers
    Over,
}

/// Who issues jump impulses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ControlMode {
    #[default]
    Manual,
    Autopilot,
}

impl ControlMode {
    pub fn toggled(self) -> Self {
        match self {
            ControlMode::Manual => ControlMode::Autopilot,
            ControlMode::Autopilot => ControlMode::Manual,
        }
    }
}

/// The controlled body
///
/// `pos.x` is fixed for the lifetime of a run, `pos` is the top-left corner
/// of a square hitbox of side `SimConfig::body_size`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub pos: Vec2,
    /// Signed vertical velocity in pixels per tick (positive is downward)
    pub velocity: f32,
}

impl Body {
    pub fn new(config: &SimConfig) -> Self {
        Self {
            pos: Vec2::new(config.body_x, config.start_y()),
            velocity: 0.0,
        }
    }

    #[inline]
    pub fn x(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    pub fn y(&self) -> f32 {
        self.pos.y
    }
}

/// A pair of barriers with a passable gap between them
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    /// Stable identity within a session
    pub id: u32,
    /// Left edge
    pub x: f32,
    /// Lower edge of the upper barrier
    pub gap_top: f32,
    /// Upper edge of the lower barrier (always `gap_top + pipe_gap`)
    pub gap_bottom: f32,
    /// Set once, when the body clears the trailing edge
    pub passed: bool,
}

impl Obstacle {
    pub fn new(id: u32, x: f32, gap_top: f32, gap_height: f32) -> Self {
        Self {
            id,
            x,
            gap_top,
            gap_bottom: gap_top + gap_height,
            passed: false,
        }
    }

    /// Right edge, the last part of the obstacle the body clears
    #[inline]
    pub fn trailing_edge(&self, pipe_width: f32) -> f32 {
        self.x + pipe_width
    }

    #[inline]
    pub fn gap_center(&self) -> f32 {
        (self.gap_top + self.gap_bottom) / 2.0
    }
}

/// Origin of a jump impulse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImpulseSource {
    Manual,
    Autopilot,
}

/// Something observable that happened during a transition
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    /// Phase went Idle -> Running
    Started,
    Jumped { source: ImpulseSource },
    Spawned { id: u32, gap_top: f32 },
    Despawned { id: u32 },
    Scored { id: u32, score: u32 },
    Collision { id: u32 },
    BoundaryViolation,
    Reset,
    ModeChanged { mode: ControlMode },
}

/// Events produced by one transition, in the order they happened
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub events: Vec<SimEvent>,
}

impl TickReport {
    pub fn push(&mut self, event: SimEvent) {
        self.events.push(event);
    }

    pub fn extend(&mut self, other: TickReport) {
        self.events.extend(other.events);
    }

    pub fn contains(&self, event: &SimEvent) -> bool {
        self.events.contains(event)
    }

    /// True if this transition ended the run
    pub fn ended_run(&self) -> bool {
        self.events
            .iter()
            .any(|e| matches!(e, SimEvent::Collision { .. } | SimEvent::BoundaryViolation))
    }
}

/// Read-only view handed to presentation and the autopilot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSnapshot {
    pub body: Body,
    /// Ascending `x`, nearest obstacle first
    pub obstacles: Vec<Obstacle>,
    pub score: u32,
    pub best_score: u32,
    pub phase: Phase,
    pub mode: ControlMode,
    pub ticks: u64,
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct Session {
    /// Run seed for reproducibility
    pub seed: u64,
    pub(crate) config: SimConfig,
    pub(crate) rng: Pcg32,
    pub(crate) body: Body,
    /// Spawn order, which is also ascending `x` since all obstacles share one speed
    pub(crate) obstacles: Vec<Obstacle>,
    pub(crate) score: u32,
    pub(crate) best_score: u32,
    pub(crate) phase: Phase,
    pub(crate) mode: ControlMode,
    /// Physics ticks since the run started
    pub(crate) ticks: u64,
    next_id: u32,
}

impl Session {
    /// Create an idle session with the given seed
    pub fn new(config: SimConfig, seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            body: Body::new(&config),
            obstacles: Vec::new(),
            score: 0,
            best_score: 0,
            phase: Phase::Idle,
            mode: ControlMode::Manual,
            ticks: 0,
            next_id: 1,
            config,
        }
    }

    /// Allocate a new obstacle ID
    pub(crate) fn next_obstacle_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn best_score(&self) -> u32 {
        self.best_score
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn mode(&self) -> ControlMode {
        self.mode
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn snapshot(&self) -> RenderSnapshot {
        RenderSnapshot {
            body: self.body,
            obstacles: self.obstacles.clone(),
            score: self.score,
            best_score: self.best_score,
            phase: self.phase,
            mode: self.mode,
            ticks: self.ticks,
        }
    }

    /// Place the body directly (test scenarios and replays)
    pub fn set_body(&mut self, body: Body) {
        self.body = body;
    }

    /// Insert an obstacle directly, keeping ascending `x` order
    pub fn insert_obstacle(&mut self, x: f32, gap_top: f32) -> u32 {
        let id = self.next_obstacle_id();
        let obstacle = Obstacle::new(id, x, gap_top, self.config.pipe_gap);
        let at = self.obstacles.partition_point(|o| o.x <= x);
        self.obstacles.insert(at, obstacle);
        id
    }
}
