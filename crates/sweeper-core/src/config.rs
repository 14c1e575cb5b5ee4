//! Configuration loading and typed config structures for the Sweeper backend.
//!
//! The configuration lives in `sweeper-config.yaml`. Every field has a
//! default, so an empty document (or no file at all) yields a working
//! in-memory setup. `DATABASE_URL` in the environment overrides the YAML
//! database URL.

use std::path::Path;
use std::time::Duration;

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

    /// The configuration parsed but holds unusable values.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// What is wrong.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SweeperConfig {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerSettings,

    /// Spectator simulation settings.
    #[serde(default)]
    pub simulation: SimulationSettings,

    /// External service connection strings.
    #[serde(default)]
    pub infrastructure: InfrastructureConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SweeperConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.infrastructure.apply_env_overrides();
        config.simulation.validate()?;
        Ok(config)
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerSettings {
    /// Address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Spectator simulation settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SimulationSettings {
    /// Wall-clock milliseconds slept between ticks.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Milliseconds between snapshots pushed to each stream subscriber.
    #[serde(default = "default_publish_interval_ms")]
    pub publish_interval_ms: u64,

    /// Board rows.
    #[serde(default = "default_rows")]
    pub rows: usize,

    /// Board columns.
    #[serde(default = "default_cols")]
    pub cols: usize,

    /// Mines reported per session.
    #[serde(default = "default_mines")]
    pub mines: u32,

    /// Names of the simulated players, in display order.
    #[serde(default = "default_roster")]
    pub roster: Vec<String>,

    /// Seed for reproducible runs. OS randomness when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl SimulationSettings {
    /// Tick period as a [`Duration`].
    pub const fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Publish period as a [`Duration`].
    pub const fn publish_interval(&self) -> Duration {
        Duration::from_millis(self.publish_interval_ms)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let reason = if self.tick_interval_ms == 0 {
            "simulation.tick_interval_ms must be at least 1"
        } else if self.publish_interval_ms == 0 {
            "simulation.publish_interval_ms must be at least 1"
        } else if self.rows == 0 || self.cols == 0 {
            "simulation.rows and simulation.cols must be at least 1"
        } else if self.roster.is_empty() {
            "simulation.roster must name at least one player"
        } else {
            return Ok(());
        };
        Err(ConfigError::Invalid {
            reason: reason.to_owned(),
        })
    }
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            publish_interval_ms: default_publish_interval_ms(),
            rows: default_rows(),
            cols: default_cols(),
            mines: default_mines(),
            roster: default_roster(),
            seed: None,
        }
    }
}

/// External service connection strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct InfrastructureConfig {
    /// `PostgreSQL` URL. The in-memory store is used when absent.
    #[serde(default)]
    pub database_url: Option<String>,
}

impl InfrastructureConfig {
    /// Override connection strings with environment variables.
    ///
    /// - `DATABASE_URL` overrides `database_url` (an empty value clears it)
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("DATABASE_URL") {
            self.database_url = Some(val).filter(|v| !v.is_empty());
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_port() -> u16 {
    8000
}

const fn default_tick_interval_ms() -> u64 {
    1500
}

const fn default_publish_interval_ms() -> u64 {
    1000
}

const fn default_rows() -> usize {
    9
}

const fn default_cols() -> usize {
    9
}

const fn default_mines() -> u32 {
    10
}

fn default_roster() -> Vec<String> {
    ["SweeperPro", "MineHunter", "FlagQueen", "BombSquad"]
        .into_iter()
        .map(str::to_owned)
        .collect()
}

fn default_log_level() -> String {
    "info".to_owned()
}
