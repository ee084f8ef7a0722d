//! # Core Module
//!
//! Shared configuration for every subsystem of the spawner.

pub mod config;

pub use config::{
    SpawnerConfig,
    LoggingConfig,
    MeshConfig,
    EffectConfig,
    GroupConfig,
    Config,
    ConfigError,
};
