//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use crate::proto::NickExt;
use std::path::Path;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("server.name is required")]
    MissingServerName,
    #[error("server.sid must be exactly 3 characters, got {0}")]
    InvalidSid(usize),
    #[error("server.sid must match pattern [0-9][A-Z0-9][A-Z0-9], got '{0}'")]
    InvalidSidFormat(String),
    #[error("link.address is required")]
    MissingLinkAddress,
    #[error("protection.nick is not a valid nickname: '{0}'")]
    InvalidServiceNick(String),
    #[error("protection.ops_channel must start with '#', got '{0}'")]
    InvalidOpsChannel(String),
    #[error("protection.{0} must be greater than zero")]
    ZeroDuration(&'static str),
    #[error("protection.gline_attempts must be at least 1")]
    ZeroAttempts,
    #[error("database.path parent directory does not exist: {0}")]
    DatabasePathInvalid(String),
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.name.is_empty() {
        errors.push(ValidationError::MissingServerName);
    }

    // SID validation (TS6 format)
    let sid = &config.server.sid;
    if sid.len() != 3 {
        errors.push(ValidationError::InvalidSid(sid.len()));
    } else {
        let chars: Vec<char> = sid.chars().collect();
        let valid = chars[0].is_ascii_digit()
            && (chars[1].is_ascii_uppercase() || chars[1].is_ascii_digit())
            && (chars[2].is_ascii_uppercase() || chars[2].is_ascii_digit());
        if !valid {
            errors.push(ValidationError::InvalidSidFormat(sid.clone()));
        }
    }

    if config.link.address.is_empty() {
        errors.push(ValidationError::MissingLinkAddress);
    }

    let protection = &config.protection;
    if !protection.nick.is_valid_nick() {
        errors.push(ValidationError::InvalidServiceNick(protection.nick.clone()));
    }
    if !protection.ops_channel.starts_with('#') {
        errors.push(ValidationError::InvalidOpsChannel(
            protection.ops_channel.clone(),
        ));
    }
    if protection.grace_period == 0 {
        errors.push(ValidationError::ZeroDuration("grace_period"));
    }
    if protection.check_interval == 0 {
        errors.push(ValidationError::ZeroDuration("check_interval"));
    }
    if protection.retry_poll_interval == 0 {
        errors.push(ValidationError::ZeroDuration("retry_poll_interval"));
    }
    if protection.gline_attempts == 0 {
        errors.push(ValidationError::ZeroAttempts);
    }

    let db_path = Path::new(&config.database.path);
    if config.database.path != ":memory:"
        && let Some(parent) = db_path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        errors.push(ValidationError::DatabasePathInvalid(
            config.database.path.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
