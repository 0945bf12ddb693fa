//! Configuration loading and management.
//!
//! - [`types`]: top-level `Config` and the server/link/database/logging blocks
//! - [`protection`]: nickname protection and escalation tuning
//! - [`validation`]: startup validation collecting every problem at once

mod protection;
mod types;
mod validation;

pub use protection::ProtectionConfig;
pub use types::{Config, ConfigError, DatabaseConfig, LinkConfig, LogFormat, LoggingConfig, ServerConfig};
pub use validation::{ValidationError, validate};
