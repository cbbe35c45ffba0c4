//! Configuration management for SoundDrive
//!
//! Holds the speed thresholds the controller evaluates and the host settings the
//! daemon uses to pick its audio and ownership backends. Startup configuration is
//! layered: built-in defaults, then an optional TOML file, then `SOUNDDRIVE_*`
//! environment variables.

mod control;
mod daemon_config;
mod shared;

pub use control::Configuration;
pub use daemon_config::{AudioBackend, DaemonConfig, OwnershipBackend};
pub use shared::SharedConfiguration;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid thresholds: low ({low}) must be below high ({high})")]
    InvalidThresholds { low: f32, high: f32 },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

/// Standard configuration directory
pub const CONFIG_DIR: &str = "/etc/sounddrive";

/// Prefix for environment overrides, e.g. `SOUNDDRIVE_CONTROL__START_THRESHOLD`
pub const ENV_PREFIX: &str = "SOUNDDRIVE";

/// Main SoundDrive configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SoundDriveConfig {
    #[serde(default)]
    pub control: Configuration,

    #[serde(default)]
    pub daemon: DaemonConfig,
}

impl SoundDriveConfig {
    /// Load configuration from a file, with environment overrides on top
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        Self::build(Some(path))
    }

    /// Load configuration from the default location.
    ///
    /// A missing file is not an error; defaults and environment overrides apply.
    pub fn load_default() -> Result<Self, ConfigError> {
        let system_config = Path::new(CONFIG_DIR).join("config.toml");
        if system_config.exists() {
            return Self::build(Some(&system_config));
        }

        tracing::warn!("No configuration file found, using defaults");
        Self::build(None)
    }

    fn build(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let loaded: Self = builder.build()?.try_deserialize()?;
        loaded.control.validate()?;

        if let Some(path) = path {
            tracing::info!("Configuration loaded from {}", path.display());
        }
        Ok(loaded)
    }
}
