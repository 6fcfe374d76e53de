//! Configuration error types

use thiserror::Error;

/// Rejected configuration, reported at setup/build entry before any state
/// is created or mutated.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{what} needs at least {min} segments, got {got}")]
    InvalidSegments { what: &'static str, min: u32, got: u32 },

    #[error("{what} must be positive, got {got}")]
    InvalidDimension { what: &'static str, got: f32 },

    #[error("min velocity {min} exceeds max velocity {max}")]
    VelocityRange { min: f32, max: f32 },

    #[error("{what} must be finite")]
    NonFinite { what: &'static str },

    #[error("{what} is empty but at least one entry is required")]
    EmptyCatalogue { what: &'static str },

    #[error("grid size {0} is too small, need at least 3")]
    InvalidGrid(usize),

    #[error("{what} must be at least {min}, got {got}")]
    InvalidCount { what: &'static str, min: usize, got: usize },

    #[error("unknown {what} preset `{name}`")]
    UnknownPreset { what: &'static str, name: String },
}

/// Checks shared by every generator's `validate`.
pub fn ensure_segments(what: &'static str, got: u32, min: u32) -> Result<(), ConfigError> {
    if got < min {
        return Err(ConfigError::InvalidSegments { what, min, got });
    }
    Ok(())
}

pub fn ensure_positive(what: &'static str, got: f32) -> Result<(), ConfigError> {
    if !got.is_finite() {
        return Err(ConfigError::NonFinite { what });
    }
    if got <= 0.0 {
        return Err(ConfigError::InvalidDimension { what, got });
    }
    Ok(())
}

pub fn ensure_non_negative(what: &'static str, got: f32) -> Result<(), ConfigError> {
    if !got.is_finite() {
        return Err(ConfigError::NonFinite { what });
    }
    if got < 0.0 {
        return Err(ConfigError::InvalidDimension { what, got });
    }
    Ok(())
}

pub fn ensure_finite(what: &'static str, got: f32) -> Result<(), ConfigError> {
    if !got.is_finite() {
        return Err(ConfigError::NonFinite { what });
    }
    Ok(())
}
