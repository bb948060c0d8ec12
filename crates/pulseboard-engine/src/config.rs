//! Configuration loading and typed config structures.
//!
//! The canonical configuration lives in `pulseboard.yaml`. This module
//! defines strongly-typed structs mirroring the YAML structure, with
//! defaults for every field so a missing file or empty document yields a
//! runnable configuration. The reference tables (users, priorities) are
//! part of the configuration: they are read-only and already resident in
//! memory by the time the engine starts.

use std::path::Path;

use pulseboard_sim::SimConfig;
use pulseboard_types::{PriorityRecord, UserRecord};
use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level dashboard configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DashboardConfig {
    /// Engine loop settings.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Simulation tunables exposed to configuration.
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// Infrastructure connection settings.
    #[serde(default)]
    pub infrastructure: InfrastructureConfig,

    /// Read-only reference tables.
    #[serde(default)]
    pub reference: ReferenceConfig,
}

/// Engine loop settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Milliseconds between ticks (~30 fps by default).
    pub tick_interval_ms: u64,

    /// The current session's user id, used as the actor fallback of last
    /// resort during normalization.
    pub session_user_id: Option<i64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 33,
            session_user_id: None,
        }
    }
}

/// The subset of simulation tunables exposed to configuration. Everything
/// else keeps the built-in defaults of [`SimConfig`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Viewport width in pixels.
    pub viewport_width: f64,

    /// Viewport height in pixels.
    pub viewport_height: f64,

    /// Maximum live particle population.
    pub particle_cap: usize,

    /// Relation-edge time-to-live in seconds.
    pub edge_ttl_seconds: f64,

    /// Placement RNG seed.
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        let defaults = SimConfig::default();
        Self {
            viewport_width: defaults.viewport_width,
            viewport_height: defaults.viewport_height,
            particle_cap: defaults.particle_cap,
            edge_ttl_seconds: defaults.edge_ttl_seconds,
            seed: defaults.seed,
        }
    }
}

impl SimulationConfig {
    /// Expand into a full [`SimConfig`].
    pub fn to_sim_config(&self) -> SimConfig {
        SimConfig {
            viewport_width: self.viewport_width,
            viewport_height: self.viewport_height,
            particle_cap: self.particle_cap,
            edge_ttl_seconds: self.edge_ttl_seconds,
            seed: self.seed,
            ..SimConfig::default()
        }
    }
}

/// Infrastructure connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct InfrastructureConfig {
    /// NATS server URL for the change notification source.
    pub nats_url: String,

    /// Subject the change notifications are published on.
    pub change_subject: String,
}

impl Default for InfrastructureConfig {
    fn default() -> Self {
        Self {
            nats_url: String::from("nats://localhost:4222"),
            change_subject: String::from("changes.>"),
        }
    }
}

/// Read-only reference tables loaded at startup.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReferenceConfig {
    /// User records.
    pub users: Vec<UserRecord>,

    /// Priority records.
    pub priorities: Vec<PriorityRecord>,
}

impl DashboardConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// The `NATS_URL` environment variable overrides
    /// `infrastructure.nats_url` when set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if it does not parse.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = serde_yml::from_str(&content)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from a path when the file exists, or fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            let mut config = Self::default();
            config.apply_env_overrides();
            Ok(config)
        }
    }

    /// Apply environment overrides for infrastructure settings.
    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("NATS_URL") {
            if !url.is_empty() {
                self.infrastructure.nats_url = url;
            }
        }
    }
}
