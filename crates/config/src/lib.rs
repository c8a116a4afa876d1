//! Shared configuration for navmesh painting
//!
//! This crate is the single source of truth for the subdivision depth limits,
//! the mesh-wide leaf area budget, and the rule that turns a texture sample
//! into a painted state.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Deepest subdivision level any triangle may reach
pub const MAX_DEPTH: u32 = 16;

/// Default requested subdivision depth
pub const DEFAULT_MAX_DEPTH: u32 = 5;

/// Default mesh-wide area budget (world units squared)
pub const DEFAULT_MAX_AREA: f32 = 1.0;

/// Default sampling threshold
pub const DEFAULT_THRESHOLD: f32 = 0.5;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue {
        field: &'static str,
        reason: String,
    },
}

/// Texel channel read when sampling a texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Red,
    Green,
    Blue,
    #[default]
    Alpha,
    /// Rec. 709 luma of the RGB channels
    Luminance,
}

/// How a texture sample becomes a walkable or blocked cell
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    pub channel: Channel,
    /// Threshold in [0, 1]
    pub threshold: f32,
    /// Values at or above the threshold are walkable when true
    pub walkable_above: bool,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            channel: Channel::Alpha,
            threshold: DEFAULT_THRESHOLD,
            walkable_above: true,
        }
    }
}

/// Painter configuration shared by all triangles of a mesh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PainterConfig {
    /// Requested subdivision depth, before the per-triangle area heuristic
    pub max_depth: u32,
    /// Mesh-wide area budget that leaf cells are normalized against
    pub max_area: f32,
    pub sampling: SamplingConfig,
}

impl Default for PainterConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_area: DEFAULT_MAX_AREA,
            sampling: SamplingConfig::default(),
        }
    }
}

impl PainterConfig {
    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth > MAX_DEPTH {
            return Err(ConfigError::InvalidValue {
                field: "max_depth",
                reason: format!("{} exceeds limit {}", self.max_depth, MAX_DEPTH),
            });
        }
        if !(self.max_area.is_finite() && self.max_area > 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "max_area",
                reason: format!("{} is not a positive finite area", self.max_area),
            });
        }
        if !(0.0..=1.0).contains(&self.sampling.threshold) {
            return Err(ConfigError::InvalidValue {
                field: "sampling.threshold",
                reason: format!("{} is outside [0, 1]", self.sampling.threshold),
            });
        }
        Ok(())
    }
}
