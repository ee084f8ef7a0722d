//! # Spawner Configuration
//!
//! Tunables for every handle kind plus logging. All sections default to the
//! values the host engine expects, so an empty file is a valid configuration.
//!
//! ```toml
//! [logging]
//! level = "debug"
//!
//! [effects]
//! static_refresh_secs = 4.0
//! ```

use serde::{Serialize, Deserialize};
use std::time::Duration;

pub use crate::config::{Config, ConfigError};

/// # Logging Configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// # Mesh Configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshConfig {
    /// Asset load state at which the engine considers a model fully resident
    pub ready_load_state: u8,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            ready_load_state: 7,
        }
    }
}

/// # Effect Configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectConfig {
    /// Refresh period of untargeted (static) effects; the default `0` tracks no expiry
    /// Refresh period of untargeted (static) effects; `0` disables expiry tracking
    pub static_refresh_secs: f32,
    /// Lifetime of actor-attached effects when the caller gives none
    pub actor_duration_secs: f32,
    /// Flag bits OR-ed into a static effect on every (re)creation
    pub force_visible_flag: u32,
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self {
            static_refresh_secs: 0.0,
            actor_duration_secs: 5.0,
            force_visible_flag: 0x2,
        }
    }
}

impl EffectConfig {
    /// Static effect refresh period as a duration
    pub fn static_refresh(&self) -> Duration {
        Duration::from_secs_f32(self.static_refresh_secs.max(0.0))
    }

    /// Default actor effect lifetime as a duration
    pub fn actor_duration(&self) -> Duration {
        Duration::from_secs_f32(self.actor_duration_secs.max(0.0))
    }
}

/// # Group Configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupConfig {
    /// Highlight value groups start with
    pub default_highlight: u8,
    /// Whether spawned groups collide unless the caller says otherwise
    pub collide_by_default: bool,
}

impl Default for GroupConfig {
    fn default() -> Self {
        Self {
            default_highlight: 70,
            collide_by_default: false,
        }
    }
}

/// # Complete Spawner Configuration
///
/// Top-level configuration handed to the host context.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnerConfig {
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Mesh handle configuration
    pub mesh: MeshConfig,
    /// Effect handle configuration
    pub effects: EffectConfig,
    /// Group handle configuration
    pub groups: GroupConfig,
}

impl SpawnerConfig {
    /// Builder pattern: Set log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.logging.level = level.into();
        self
    }

    /// Builder pattern: Set the static effect refresh period
    pub fn with_static_refresh_secs(mut self, secs: f32) -> Self {
        self.effects.static_refresh_secs = secs;
        self
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::Invalid("logging.level cannot be empty".to_string()));
        }

        for (name, secs) in [
            ("effects.static_refresh_secs", self.effects.static_refresh_secs),
            ("effects.actor_duration_secs", self.effects.actor_duration_secs),
        ] {
            if !secs.is_finite() || secs < 0.0 {
                return Err(ConfigError::Invalid(format!("{name} must be a finite, non-negative number")));
            }
        }

        if self.effects.force_visible_flag == 0 {
            return Err(ConfigError::Invalid("effects.force_visible_flag must set at least one bit".to_string()));
        }

        Ok(())
    }
}

impl Config for SpawnerConfig {}
