//! Placeholder sessions occupying abused nicknames.

use crate::proto::irc_to_lower;
use crate::state::Uid;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::time::{Duration, Instant};

/// A placeholder currently holding a nickname.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DummyOccupant {
    /// Nickname being held.
    pub nick: String,
    /// UID the placeholder was introduced with.
    pub uid: Uid,
    /// Offending host the occupation was created for.
    pub host: String,
    /// Start of the occupation, for expiry.
    pub created_at: Instant,
}

/// At most one placeholder per (casefolded) nickname.
#[derive(Debug, Default)]
pub struct DummyRegistry {
    occupants: DashMap<String, DummyOccupant>,
}

impl DummyRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a placeholder. Fails if the nickname is already occupied.
    pub fn claim(&self, occupant: DummyOccupant) -> bool {
        match self.occupants.entry(irc_to_lower(&occupant.nick)) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(occupant);
                true
            }
        }
    }

    /// Placeholder holding `nick`, if any.
    pub fn get(&self, nick: &str) -> Option<DummyOccupant> {
        self.occupants
            .get(&irc_to_lower(nick))
            .map(|o| o.value().clone())
    }

    /// Whether `nick` is held by a placeholder.
    pub fn contains(&self, nick: &str) -> bool {
        self.occupants.contains_key(&irc_to_lower(nick))
    }

    /// Whether any placeholder uses `uid`.
    pub fn has_uid(&self, uid: &str) -> bool {
        self.occupants.iter().any(|o| o.uid == uid)
    }

    /// Forget the placeholder holding `nick`, returning it.
    pub fn release(&self, nick: &str) -> Option<DummyOccupant> {
        self.occupants.remove(&irc_to_lower(nick)).map(|(_, o)| o)
    }

    /// Forget the placeholder using `uid`, if any.
    pub fn remove_by_uid(&self, uid: &str) -> Option<DummyOccupant> {
        let key = self
            .occupants
            .iter()
            .find(|o| o.uid == uid)
            .map(|o| o.key().clone())?;
        self.occupants
            .remove_if(&key, |_, o| o.uid == uid)
            .map(|(_, o)| o)
    }

    /// Placeholders older than `lifetime`.
    pub fn expired(&self, now: Instant, lifetime: Duration) -> Vec<DummyOccupant> {
        self.occupants
            .iter()
            .filter(|o| now.saturating_duration_since(o.created_at) >= lifetime)
            .map(|o| o.value().clone())
            .collect()
    }

    /// Number of active placeholders.
    pub fn len(&self) -> usize {
        self.occupants.len()
    }

    /// Whether no placeholder is active.
    pub fn is_empty(&self) -> bool {
        self.occupants.is_empty()
    }

    /// Forget every placeholder (link loss).
    pub fn clear(&self) {
        self.occupants.clear();
    }
}
