//! Configuration errors

use core::fmt;

/// Reasons a configuration is rejected
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// A constant is NaN or infinite
    NonFinite { field: &'static str },
    /// A dimension, speed or rate that must be strictly positive is not
    NonPositive { field: &'static str, value: f32 },
    /// A margin that may be zero but not negative is
    Negative { field: &'static str, value: f32 },
    /// Jump force must point upward (negative vertical velocity)
    InvalidJumpForce { value: f32 },
    /// JSON could not be parsed into a configuration
    Parse(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonFinite { field } => write!(f, "{field} must be a finite number"),
            Self::NonPositive { field, value } => {
                write!(f, "{field} must be greater than zero (got {value})")
            }
            Self::Negative { field, value } => {
                write!(f, "{field} must not be negative (got {value})")
            }
            Self::InvalidJumpForce { value } => {
                write!(f, "jump_force must be negative (got {value})")
            }
            Self::Parse(msg) => write!(f, "invalid configuration JSON: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}
