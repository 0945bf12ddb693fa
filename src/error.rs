//! Error types for event processing and the uplink.
//!
//! Persistence and configuration errors live beside their modules
//! ([`crate::db::DbError`], [`crate::config::ConfigError`]).

use thiserror::Error;
use tokio_util::codec::LinesCodecError;

// ============================================================================
// Engine Errors (event processing)
// ============================================================================

/// Errors that can occur while handling a single link event.
///
/// None of these are fatal; the dispatch loop logs them and moves on.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("engine is not running")]
    NotRunning,

    #[error("unknown session: {0}")]
    UnknownSession(String),
}

impl EngineError {
    /// Get a static error code string for log fields.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotRunning => "not_running",
            Self::UnknownSession(_) => "unknown_session",
        }
    }
}

// ============================================================================
// Link Errors (uplink connection)
// ============================================================================

/// Errors that end an uplink connection.
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line codec error: {0}")]
    Codec(#[from] LinesCodecError),

    #[error("uplink sent ERROR: {0}")]
    Remote(String),

    #[error("connection closed by uplink")]
    Closed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(EngineError::NotRunning.error_code(), "not_running");
        assert_eq!(
            EngineError::UnknownSession("001AAAAAA".into()).error_code(),
            "unknown_session"
        );
    }

    #[test]
    fn link_error_display() {
        let err = LinkError::Remote("Closing Link: bad password".into());
        assert_eq!(err.to_string(), "uplink sent ERROR: Closing Link: bad password");
    }
}
