//! Outbound actions produced by the engine.
//!
//! Services produce effects; the uplink turns them into protocol lines.
//! Keeping them as data lets tests assert on exactly what would be sent.

use crate::state::Uid;

/// Unified effect type returned by event handling, commands and the scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceEffect {
    /// NOTICE from the service to a session.
    Notice { target_uid: Uid, text: String },

    /// Disconnect a session (enforcement, GHOST, escalation retries).
    Kill { target_uid: Uid, reason: String },

    /// Put a placeholder session on the network to hold a nickname.
    IntroducePlaceholder {
        uid: Uid,
        nick: String,
        ident: String,
        host: String,
        gecos: String,
        ts: i64,
    },

    /// Take a placeholder session off the network.
    RemovePlaceholder { uid: Uid, reason: String },

    /// Force a session onto a new nickname (RECOVER).
    ForceNick {
        target_uid: Uid,
        new_nick: String,
        new_ts: i64,
        old_ts: i64,
    },

    /// Message to the operations channel.
    Announce { text: String },
}

impl ServiceEffect {
    /// Target session of the effect, if it has one.
    pub fn target(&self) -> Option<&str> {
        match self {
            Self::Notice { target_uid, .. }
            | Self::Kill { target_uid, .. }
            | Self::ForceNick { target_uid, .. } => Some(target_uid),
            Self::IntroducePlaceholder { uid, .. } | Self::RemovePlaceholder { uid, .. } => {
                Some(uid)
            }
            Self::Announce { .. } => None,
        }
    }
}
