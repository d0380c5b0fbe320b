//! Simulation Configuration
//!
//! Tunables for the clock, movement and runners. Every field has a default,
//! so a JSON file only needs the values it overrides.

use std::fs;
use std::path::{Path, PathBuf};
use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::game::entity::RUNNER_HALF_SIZE;
use crate::{FIXED_STEP_MS, FRAME_YIELD_MS, MAX_CATCH_UP_STEPS, SPEED_FACTOR};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid JSON for this schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A fixed step of zero would never advance.
    #[error("fixed_step_ms must be greater than zero")]
    ZeroStep,

    /// Speed must be a positive finite number.
    #[error("speed_factor must be positive and finite, got {0}")]
    InvalidSpeed(f32),

    /// A cap of zero would freeze the simulation.
    #[error("max_catch_up_steps must be greater than zero when set")]
    ZeroCatchUpCap,

    /// Runner body must have a usable size.
    #[error("runner_half_size must be in (0, 0.5), got {0}")]
    InvalidRunnerSize(f32),
}

/// Simulation tunables.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Size of one full simulation step, in milliseconds.
    pub fixed_step_ms: u64,

    /// Maze units moved per millisecond by a held direction.
    pub speed_factor: f32,

    /// Maximum full steps per frame; `None` means unbounded catch-up.
    pub max_catch_up_steps: Option<u64>,

    /// Pause between frames in the headless real-time driver.
    pub frame_yield_ms: u64,

    /// Half extent of a runner body, in tiles.
    pub runner_half_size: f32,

    /// Layout file to load instead of the built-in maze.
    pub maze_path: Option<PathBuf>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            fixed_step_ms: FIXED_STEP_MS,
            speed_factor: SPEED_FACTOR,
            max_catch_up_steps: Some(MAX_CATCH_UP_STEPS),
            frame_yield_ms: FRAME_YIELD_MS,
            runner_half_size: RUNNER_HALF_SIZE,
            maze_path: None,
        }
    }
}

impl SimConfig {
    /// Read, parse and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Parse and validate JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fixed_step_ms == 0 {
            return Err(ConfigError::ZeroStep);
        }
        if !(self.speed_factor.is_finite() && self.speed_factor > 0.0) {
            return Err(ConfigError::InvalidSpeed(self.speed_factor));
        }
        if self.max_catch_up_steps == Some(0) {
            return Err(ConfigError::ZeroCatchUpCap);
        }
        if !(self.runner_half_size > 0.0 && self.runner_half_size < 0.5) {
            return Err(ConfigError::InvalidRunnerSize(self.runner_half_size));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SimConfig::default();
        assert_eq!(config.fixed_step_ms, 5);
        assert_eq!(config.speed_factor, 0.003);
        assert_eq!(config.max_catch_up_steps, Some(50));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = SimConfig::from_json_str(r#"{ "max_catch_up_steps": null, "frame_yield_ms": 2 }"#).unwrap();
        assert_eq!(config.max_catch_up_steps, None);
        assert_eq!(config.frame_yield_ms, 2);
        assert_eq!(config.fixed_step_ms, FIXED_STEP_MS);
    }

    #[test]
    fn test_validation_errors() {
        assert!(matches!(
            SimConfig::from_json_str(r#"{ "fixed_step_ms": 0 }"#),
            Err(ConfigError::ZeroStep)
        ));
        assert!(matches!(
            SimConfig::from_json_str(r#"{ "speed_factor": -1.0 }"#),
            Err(ConfigError::InvalidSpeed(_))
        ));
        assert!(matches!(
            SimConfig::from_json_str(r#"{ "max_catch_up_steps": 0 }"#),
            Err(ConfigError::ZeroCatchUpCap)
        ));
        assert!(matches!(
            SimConfig::from_json_str(r#"{ "runner_half_size": 0.5 }"#),
            Err(ConfigError::InvalidRunnerSize(_))
        ));
        assert!(matches!(
            SimConfig::from_json_str("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }
}
