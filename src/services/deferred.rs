//! One-shot work scheduled for later: occupation retries and RECOVER renames.
//!
//! Tasks carry only identifiers. Whoever runs a task looks everything up
//! again, since the network may have changed in the meantime.

use crate::proto::irc_eq;
use crate::state::Uid;
use parking_lot::Mutex;
use std::time::Instant;

/// A deferred unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeferredTask {
    /// Try to put a placeholder on `nick` for abuse from `host`.
    Occupy {
        nick: String,
        /// Abuse key the occupation is for.
        host: String,
        /// Zero for the first try; selects the backoff before the next.
        attempt: u32,
    },
    /// Move `uid` onto `nick` once the previous holder is gone.
    Rename { uid: Uid, nick: String },
}

impl DeferredTask {
    fn nick(&self) -> &str {
        match self {
            Self::Occupy { nick, .. } | Self::Rename { nick, .. } => nick,
        }
    }
}

/// A task and when it becomes due.
#[derive(Debug, Clone)]
pub struct Deferred {
    pub task: DeferredTask,
    pub due_at: Instant,
}

/// Pending deferred tasks, in no particular order.
#[derive(Debug, Default)]
pub struct DeferredQueue {
    pending: Mutex<Vec<Deferred>>,
}

impl DeferredQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `task` to run once `due_at` has passed.
    pub fn schedule(&self, task: DeferredTask, due_at: Instant) {
        self.pending.lock().push(Deferred { task, due_at });
    }

    /// Remove and return every task due at `now`, earliest first.
    pub fn take_due(&self, now: Instant) -> Vec<DeferredTask> {
        let mut due = {
            let mut pending = self.pending.lock();
            let (due, rest): (Vec<_>, Vec<_>) =
                pending.drain(..).partition(|d| d.due_at <= now);
            *pending = rest;
            due
        };
        due.sort_by_key(|d| d.due_at);
        due.into_iter().map(|d| d.task).collect()
    }

    /// Drop pending occupation attempts for `nick`. Returns how many were dropped.
    pub fn cancel_occupy(&self, nick: &str) -> usize {
        let mut pending = self.pending.lock();
        let before = pending.len();
        pending.retain(|d| {
            !(matches!(d.task, DeferredTask::Occupy { .. }) && irc_eq(d.task.nick(), nick))
        });
        before - pending.len()
    }

    /// Copy of every pending task, for inspection.
    pub fn snapshot(&self) -> Vec<Deferred> {
        self.pending.lock().clone()
    }

    /// Number of pending tasks.
    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    /// Whether nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }

    /// Drop every pending task (link loss).
    pub fn clear(&self) {
        self.pending.lock().clear();
    }
}
