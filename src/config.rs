//! Simulation constants and difficulty presets
//!
//! Every scalar that shapes the physics, obstacle stream and autopilot lives
//! here. A `Session` takes its own copy at construction, so configuration is
//! never mutated while a run is in progress.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Difficulty preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Relaxed,
    #[default]
    Classic,
    Frantic,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Relaxed => "Relaxed",
            Difficulty::Classic => "Classic",
            Difficulty::Frantic => "Frantic",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "relaxed" | "easy" => Some(Difficulty::Relaxed),
            "classic" | "normal" => Some(Difficulty::Classic),
            "frantic" | "hard" => Some(Difficulty::Frantic),
            _ => None,
        }
    }

    /// Vertical opening between barriers
    pub fn pipe_gap(&self) -> f32 {
        match self {
            Difficulty::Relaxed => 150.0,
            Difficulty::Classic => 130.0,
            Difficulty::Frantic => 115.0,
        }
    }

    /// Horizontal scroll speed (pixels per tick)
    pub fn pipe_speed(&self) -> f32 {
        match self {
            Difficulty::Relaxed => 2.5,
            Difficulty::Classic => 3.0,
            Difficulty::Frantic => 3.5,
        }
    }

    /// Distance the previous obstacle must travel before the next one spawns
    pub fn horizontal_spacing(&self) -> f32 {
        match self {
            Difficulty::Relaxed => 240.0,
            Difficulty::Classic => 220.0,
            Difficulty::Frantic => 200.0,
        }
    }
}

/// Autopilot thresholds
///
/// All distances are in field pixels, `projection_horizon` is in ticks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AutopilotConfig {
    /// Jump unconditionally once `y` is within this distance of the floor
    pub ground_margin: f32,
    /// Never jump while `y` is within this distance of the ceiling
    pub ceiling_margin: f32,
    /// With no target ahead, jump whenever `y` is below this fraction of the field height
    pub safe_altitude_fraction: f32,
    /// Horizontal distance at which coarse positioning gives way to precision control
    pub proximity_threshold: f32,
    /// How far above the gap center the approach phase aims
    pub approach_offset: f32,
    /// How far below the approach target the body must sink before a jump
    pub approach_margin: f32,
    /// Maximum number of ticks projected forward in the precision phase
    pub projection_horizon: u32,
    /// Minimum number of ticks projected, at least one decision period
    pub min_projection: u32,
    /// Clearance kept from either barrier when judging a projection
    pub safety_margin: f32,
    /// Dead band around the gap center in which the precision phase holds
    pub hysteresis_band: f32,
}

impl Default for AutopilotConfig {
    fn default() -> Self {
        Self {
            ground_margin: 50.0,
            // Must exceed the height gained by one jump from rest (68 px with defaults)
            ceiling_margin: 72.0,
            safe_altitude_fraction: 0.5,
            proximity_threshold: 120.0,
            approach_offset: 10.0,
            approach_margin: 26.0,
            projection_horizon: 12,
            min_projection: 4,
            safety_margin: 1.0,
            hysteresis_band: 20.0,
        }
    }
}

/// Simulation constants
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimConfig {
    // === Field ===
    pub field_width: f32,
    pub field_height: f32,

    // === Body ===
    /// Fixed horizontal position of the body
    pub body_x: f32,
    /// Side length of the body's square hitbox
    pub body_size: f32,
    /// Added to vertical velocity every tick (positive is downward)
    pub gravity: f32,
    /// Vertical velocity set by one impulse (negative is upward)
    pub jump_force: f32,

    // === Obstacles ===
    pub pipe_width: f32,
    pub pipe_gap: f32,
    /// Leftward movement of every obstacle per tick
    pub pipe_speed: f32,
    pub horizontal_spacing: f32,
    /// Minimum distance between a gap and the top or bottom of the field
    pub min_margin: f32,
    /// Largest allowed change in gap top between consecutive obstacles (None = unbounded)
    pub max_consecutive_difference: Option<f32>,

    // === Autopilot ===
    pub autopilot: AutopilotConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::from_preset(Difficulty::Classic)
    }
}

impl SimConfig {
    /// Create a configuration from a difficulty preset
    pub fn from_preset(preset: Difficulty) -> Self {
        Self {
            field_width: 400.0,
            field_height: 600.0,
            body_x: 50.0,
            body_size: 25.0,
            gravity: 0.5,
            jump_force: -8.0,
            pipe_width: 60.0,
            pipe_gap: preset.pipe_gap(),
            pipe_speed: preset.pipe_speed(),
            horizontal_spacing: preset.horizontal_spacing(),
            min_margin: 50.0,
            max_consecutive_difference: Some(150.0),
            autopilot: AutopilotConfig::default(),
        }
    }

    /// Parse a configuration from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Largest valid `y` for the body (its top edge)
    pub fn max_body_y(&self) -> f32 {
        self.field_height - self.body_size
    }

    /// Initial vertical position: body centered in the field
    pub fn start_y(&self) -> f32 {
        (self.field_height - self.body_size) / 2.0
    }

    /// Range a new gap top is drawn from, before any consecutive-difference clamp
    pub fn gap_top_range(&self) -> (f32, f32) {
        (
            self.min_margin,
            self.field_height - self.pipe_gap - self.min_margin,
        )
    }

    /// True when the gap-top range is empty and spawns fall back to clamping
    pub fn has_degenerate_spawn_range(&self) -> bool {
        let (lo, hi) = self.gap_top_range();
        lo > hi
    }

    /// Reject constants that would make the formulas meaningless.
    ///
    /// A degenerate spawn range is not an error (the generator clamps), but
    /// it is logged.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let finite = [
            ("field_width", self.field_width),
            ("field_height", self.field_height),
            ("body_x", self.body_x),
            ("body_size", self.body_size),
            ("gravity", self.gravity),
            ("jump_force", self.jump_force),
            ("pipe_width", self.pipe_width),
            ("pipe_gap", self.pipe_gap),
            ("pipe_speed", self.pipe_speed),
            ("horizontal_spacing", self.horizontal_spacing),
            ("min_margin", self.min_margin),
            ("autopilot.ground_margin", self.autopilot.ground_margin),
            ("autopilot.ceiling_margin", self.autopilot.ceiling_margin),
            (
                "autopilot.safe_altitude_fraction",
                self.autopilot.safe_altitude_fraction,
            ),
            ("autopilot.proximity_threshold", self.autopilot.proximity_threshold),
            ("autopilot.approach_offset", self.autopilot.approach_offset),
            ("autopilot.approach_margin", self.autopilot.approach_margin),
            ("autopilot.safety_margin", self.autopilot.safety_margin),
            ("autopilot.hysteresis_band", self.autopilot.hysteresis_band),
        ];
        for (field, value) in finite {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { field });
            }
        }
        if let Some(diff) = self.max_consecutive_difference {
            if !diff.is_finite() {
                return Err(ConfigError::NonFinite {
                    field: "max_consecutive_difference",
                });
            }
        }

        let positive = [
            ("field_width", self.field_width),
            ("field_height", self.field_height),
            ("body_size", self.body_size),
            ("pipe_width", self.pipe_width),
            ("pipe_gap", self.pipe_gap),
            ("pipe_speed", self.pipe_speed),
            ("horizontal_spacing", self.horizontal_spacing),
        ];
        for (field, value) in positive {
            if value <= 0.0 {
                return Err(ConfigError::NonPositive { field, value });
            }
        }
        if self.jump_force >= 0.0 {
            return Err(ConfigError::InvalidJumpForce {
                value: self.jump_force,
            });
        }
        if self.min_margin < 0.0 {
            return Err(ConfigError::Negative {
                field: "min_margin",
                value: self.min_margin,
            });
        }

        if self.has_degenerate_spawn_range() {
            let (lo, hi) = self.gap_top_range();
            log::warn!(
                "Gap top range [{lo}, {hi}] is empty; obstacles will spawn at the clamped bound"
            );
        }
        if self.horizontal_spacing < self.pipe_width + self.body_size {
            log::warn!(
                "horizontal_spacing {} allows more than one obstacle to overlap the body",
                self.horizontal_spacing
            );
        }
        Ok(())
    }
}
