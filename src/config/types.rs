//! Core configuration types and loading.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use super::protection::ProtectionConfig;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Services node configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Our identity on the network.
    pub server: ServerConfig,
    /// Uplink connection.
    pub link: LinkConfig,
    /// SQLite storage.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Nickname protection tuning.
    #[serde(default)]
    pub protection: ProtectionConfig,
    /// Log output.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

/// Server identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Server name we introduce ourselves as (e.g., "services.straylight.net").
    pub name: String,
    /// Server ID for TS6 (3 characters).
    pub sid: String,
    /// Server description.
    #[serde(default = "default_description")]
    pub description: String,
}

fn default_description() -> String {
    "Nickname Protection Services".to_string()
}

/// Uplink configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LinkConfig {
    /// Uplink address (`host:port`).
    pub address: String,
    /// Link password sent in PASS.
    pub password: String,
    /// Seconds to wait before reconnecting after the link drops (default: 10).
    #[serde(default = "default_reconnect_delay")]
    pub reconnect_delay: u64,
}

fn default_reconnect_delay() -> u64 {
    10
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to SQLite database file.
    #[serde(default = "default_database_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

fn default_database_path() -> String {
    "nickguard.db".to_string()
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Logging configuration. Filtering itself is controlled by `RUST_LOG`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
}
