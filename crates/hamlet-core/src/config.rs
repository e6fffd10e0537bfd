//! Configuration loading and typed config structures.
//!
//! The canonical configuration lives in `hamlet-config.yaml` at the
//! project root. This module defines strongly-typed structs that mirror
//! the YAML structure and a loader that reads the file. Every field has
//! a default so an empty file (or no file at all) yields a runnable
//! configuration.

use std::path::Path;

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

/// Top-level simulation configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimConfig {
    /// World identity and seeding.
    #[serde(default)]
    pub world: WorldSettings,

    /// Loop cadences and the action timeout.
    #[serde(default)]
    pub cycles: CycleSettings,

    /// Population bounds.
    #[serde(default)]
    pub population: PopulationSettings,

    /// Offline catch-up behavior.
    #[serde(default)]
    pub offline: OfflineSettings,

    /// Observer HTTP server settings.
    #[serde(default)]
    pub server: ServerSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl SimConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_yml::from_str(&contents)?)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yml::from_str(yaml)?)
    }
}

/// World identity and seeding.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldSettings {
    /// Human-readable world name.
    #[serde(default = "default_world_name")]
    pub name: String,

    /// Random seed for reproducible runs.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            seed: default_seed(),
        }
    }
}

/// Loop cadences and the action timeout.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CycleSettings {
    /// Seconds between decision cycles.
    #[serde(default = "default_action_interval_secs")]
    pub action_interval_secs: u64,

    /// Seconds between ambient emotional-drift passes.
    #[serde(default = "default_emotion_interval_secs")]
    pub emotion_interval_secs: u64,

    /// Seconds between society passes (village scan, elections, culture).
    #[serde(default = "default_society_interval_secs")]
    pub society_interval_secs: u64,

    /// Seconds between stale-trade sweeps.
    #[serde(default = "default_trade_sweep_interval_secs")]
    pub trade_sweep_interval_secs: u64,

    /// Milliseconds an action may run before it is treated as failed.
    #[serde(default = "default_action_timeout_ms")]
    pub action_timeout_ms: u64,
}

impl Default for CycleSettings {
    fn default() -> Self {
        Self {
            action_interval_secs: default_action_interval_secs(),
            emotion_interval_secs: default_emotion_interval_secs(),
            society_interval_secs: default_society_interval_secs(),
            trade_sweep_interval_secs: default_trade_sweep_interval_secs(),
            action_timeout_ms: default_action_timeout_ms(),
        }
    }
}

/// Population bounds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PopulationSettings {
    /// Agents spawned on a fresh world.
    #[serde(default = "default_initial_agents")]
    pub initial_agents: u32,

    /// Hard cap on live agents.
    #[serde(default = "default_max_agents")]
    pub max_agents: u32,
}

impl Default for PopulationSettings {
    fn default() -> Self {
        Self {
            initial_agents: default_initial_agents(),
            max_agents: default_max_agents(),
        }
    }
}

/// Offline catch-up behavior.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OfflineSettings {
    /// Whether catch-up runs at startup.
    #[serde(default = "default_offline_enabled")]
    pub enabled: bool,

    /// Cap on how many offline hours are simulated.
    #[serde(default = "default_offline_max_hours")]
    pub max_hours: u64,
}

impl Default for OfflineSettings {
    fn default() -> Self {
        Self {
            enabled: default_offline_enabled(),
            max_hours: default_offline_max_hours(),
        }
    }
}

/// Observer HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerSettings {
    /// Socket address the observer API binds to.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingSettings {
    /// Default tracing filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

fn default_world_name() -> String {
    "Hamlet".to_owned()
}

const fn default_seed() -> u64 {
    42
}

const fn default_action_interval_secs() -> u64 {
    8
}

const fn default_emotion_interval_secs() -> u64 {
    60
}

const fn default_society_interval_secs() -> u64 {
    300
}

const fn default_trade_sweep_interval_secs() -> u64 {
    60
}

const fn default_action_timeout_ms() -> u64 {
    8_000
}

const fn default_initial_agents() -> u32 {
    5
}

const fn default_max_agents() -> u32 {
    50
}

const fn default_offline_enabled() -> bool {
    true
}

const fn default_offline_max_hours() -> u64 {
    72
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_owned()
}

fn default_log_filter() -> String {
    "info".to_owned()
}
