//! Sessions currently on the enforcement clock.

use crate::state::Uid;
use dashmap::DashMap;
use std::time::{Duration, Instant};

/// A session holding a protected nickname it has not authenticated for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnforcementEntry {
    /// Nickname the entry was created or last updated for.
    pub nick: String,
    /// When the grace period started.
    pub created_at: Instant,
}

impl EnforcementEntry {
    fn expired(&self, now: Instant, grace: Duration) -> bool {
        now.saturating_duration_since(self.created_at) >= grace
    }
}

/// At most one entry per session.
#[derive(Debug, Default)]
pub struct EnforcementTracker {
    entries: DashMap<Uid, EnforcementEntry>,
}

impl EnforcementTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a session on the clock. Returns `true` only if no entry existed.
    ///
    /// An existing entry keeps its original deadline; only its nick is updated.
    pub fn track(&self, uid: &str, nick: &str, now: Instant) -> bool {
        let mut created = false;
        self.entries
            .entry(uid.to_string())
            .and_modify(|e| e.nick = nick.to_string())
            .or_insert_with(|| {
                created = true;
                EnforcementEntry {
                    nick: nick.to_string(),
                    created_at: now,
                }
            });
        created
    }

    /// Take a session off the clock.
    pub fn clear(&self, uid: &str) -> bool {
        self.entries.remove(uid).is_some()
    }

    /// Current entry for a session.
    pub fn get(&self, uid: &str) -> Option<EnforcementEntry> {
        self.entries.get(uid).map(|e| e.value().clone())
    }

    /// Whether a session is on the clock.
    pub fn contains(&self, uid: &str) -> bool {
        self.entries.contains_key(uid)
    }

    /// Time left before the session's grace period runs out.
    pub fn remaining(&self, uid: &str, now: Instant, grace: Duration) -> Option<Duration> {
        let entry = self.entries.get(uid)?;
        Some(grace.saturating_sub(now.saturating_duration_since(entry.created_at)))
    }

    /// Snapshot of sessions whose grace period has run out.
    pub fn expired(&self, now: Instant, grace: Duration) -> Vec<Uid> {
        self.entries
            .iter()
            .filter(|e| e.value().expired(now, grace))
            .map(|e| e.key().clone())
            .collect()
    }

    /// Remove the entry only if it is still present and still expired.
    pub fn consume_expired(
        &self,
        uid: &str,
        now: Instant,
        grace: Duration,
    ) -> Option<EnforcementEntry> {
        self.entries
            .remove_if(uid, |_, e| e.expired(now, grace))
            .map(|(_, e)| e)
    }

    /// Number of sessions on the clock.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no session is on the clock.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry (link loss).
    pub fn clear_all(&self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRACE: Duration = Duration::from_secs(60);

    #[test]
    fn track_is_idempotent_and_keeps_deadline() {
        let tracker = EnforcementTracker::new();
        let t0 = Instant::now();
        assert!(tracker.track("001AAAAAA", "alice", t0));
        assert!(!tracker.track("001AAAAAA", "alice_", t0 + Duration::from_secs(30)));

        let entry = tracker.get("001AAAAAA").unwrap();
        assert_eq!(entry.created_at, t0);
        assert_eq!(entry.nick, "alice_");
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn expiry_boundary_is_inclusive() {
        let tracker = EnforcementTracker::new();
        let t0 = Instant::now();
        tracker.track("001AAAAAA", "alice", t0);

        assert!(tracker.expired(t0 + Duration::from_secs(59), GRACE).is_empty());
        assert_eq!(
            tracker.remaining("001AAAAAA", t0 + Duration::from_secs(45), GRACE),
            Some(Duration::from_secs(15))
        );
        assert_eq!(tracker.expired(t0 + GRACE, GRACE), vec!["001AAAAAA".to_string()]);
    }

    #[test]
    fn consume_expired_rechecks_entry() {
        let tracker = EnforcementTracker::new();
        let t0 = Instant::now();
        tracker.track("001AAAAAA", "alice", t0);

        assert!(tracker.consume_expired("001AAAAAA", t0, GRACE).is_none());
        assert!(tracker.contains("001AAAAAA"));

        // Cleared between the snapshot and the mutation
        tracker.clear("001AAAAAA");
        assert!(tracker.consume_expired("001AAAAAA", t0 + GRACE, GRACE).is_none());

        tracker.track("001AAAAAB", "bob", t0);
        assert!(tracker.consume_expired("001AAAAAB", t0 + GRACE, GRACE).is_some());
        assert!(tracker.is_empty());
    }
}
