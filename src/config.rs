//=========================================================================
// Game Configuration
//=========================================================================
//
// Construction options for a Game, loadable from TOML.
//
// Example:
// ```toml
// auto_start = false
// frame_rate = 60.0
// need_scene = true
//
// [[systems]]
// name = "physics"
// params = { gravity = -9.8 }
// ```
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

//=== Internal Dependencies ===============================================

use crate::core::system::Params;
use crate::core::ticker::checked_period;

//=== Defaults ============================================================

pub const DEFAULT_FRAME_RATE: f64 = 120.0;

fn default_true() -> bool {
    true
}

fn default_frame_rate() -> f64 {
    DEFAULT_FRAME_RATE
}

//=== SystemSpec ==========================================================

/// A system to install at construction, resolved by name through the
/// game's [`SystemFactory`](crate::core::system::SystemFactory).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemSpec {
    pub name: String,

    /// Passed to the system's `init` hook.
    #[serde(default)]
    pub params: Params,
}

impl SystemSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Params::new(),
        }
    }
}

//=== GameConfig ==========================================================

/// Options applied by [`GameBuilder::build`](crate::GameBuilder::build).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Start the ticker as soon as the game is built.
    #[serde(default = "default_true")]
    pub auto_start: bool,

    /// Target frames per second for the default ticker.
    #[serde(default = "default_frame_rate")]
    pub frame_rate: f64,

    /// Systems installed, in order, before the game starts.
    #[serde(default)]
    pub systems: Vec<SystemSpec>,

    /// Create an empty primary scene at construction.
    #[serde(default = "default_true")]
    pub need_scene: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            auto_start: true,
            frame_rate: DEFAULT_FRAME_RATE,
            systems: Vec::new(),
            need_scene: true,
        }
    }
}

impl GameConfig {
    /// Parses a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Serializes the configuration back to TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// Checks that the frame rate yields a usable frame period.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if checked_period(self.frame_rate).is_none() {
            return Err(ConfigError::Invalid(format!(
                "frame_rate must be positive and finite with a representable period, got {}",
                self.frame_rate
            )));
        }
        Ok(())
    }
}

//=== ConfigError =========================================================

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Serialization error: {0}")]
    Serialize(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

//=========================================================================
// Unit Tests
//=========================================================================
