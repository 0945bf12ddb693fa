//! Nick enforcement background task.
//!
//! A sweep consumes enforcement entries whose grace period has run out and
//! disconnects the sessions that still hold a protected nick they do not
//! own. A faster poll pumps the deferred queue (occupation retries and
//! RECOVER renames).

use super::guard::NickGuard;
use super::protection::Protection;
use super::ServiceEffect;
use crate::proto::irc_eq;
use crate::state::Session;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Store round trips spent on one expired session before it is re-tracked.
const MAX_REVALIDATIONS: usize = 3;

/// Spawn the nick enforcement background task.
///
/// Effects are handed to the uplink through `effects`; the task ends when
/// the receiving side goes away.
pub fn spawn_enforcement_task(
    guard: Arc<NickGuard>,
    effects: mpsc::Sender<ServiceEffect>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut sweep = tokio::time::interval(guard.config().sweep_interval());
        let mut poll = tokio::time::interval(guard.config().poll_interval());
        sweep.set_missed_tick_behavior(MissedTickBehavior::Delay);
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let batch = tokio::select! {
                _ = sweep.tick() => guard.sweep().await,
                _ = poll.tick() => guard.run_deferred().await,
            };

            for effect in batch {
                if effects.send(effect).await.is_err() {
                    debug!("Effect channel closed, enforcement task exiting");
                    return;
                }
            }
        }
    })
}

impl NickGuard {
    /// Disconnect sessions whose grace period ran out and reap stale placeholders.
    pub async fn sweep(&self) -> Vec<ServiceEffect> {
        if !self.is_running() {
            return Vec::new();
        }

        let now = self.now();
        let grace = self.config().grace();
        let mut effects = Vec::new();

        for uid in self.tracker().expired(now, grace) {
            // Cleared since the snapshot: nothing to do
            if self.tracker().consume_expired(&uid, now, grace).is_none() {
                continue;
            }
            effects.extend(self.enforce_expired(&uid).await);
        }

        for occupant in self.dummies().expired(now, self.config().block_duration()) {
            if let Some(removal) = self.release_placeholder(&occupant.nick, "Placeholder expired") {
                effects.push(removal);
            }
        }

        effects
    }

    /// Re-validate a session whose grace period ran out and disconnect it
    /// if it still holds a nick it does not own.
    ///
    /// Events keep arriving while the store is consulted. The verdict only
    /// stands for the session as it is afterwards: a changed account binding
    /// is resolved again, a rename hands the session back to the event path.
    async fn enforce_expired(&self, uid: &str) -> Vec<ServiceEffect> {
        let Some(mut session) = self.sessions().get(uid) else {
            debug!(uid = %uid, "Expired session already gone");
            return Vec::new();
        };
        let expired_account = session.account.clone();

        for _ in 0..MAX_REVALIDATIONS {
            if session.is_privileged() {
                return Vec::new();
            }
            let verdict = self
                .protection(&session.nick, session.account.as_deref())
                .await;

            let Some(current) = self.sessions().get(uid) else {
                debug!(uid = %uid, "Session left during enforcement");
                return Vec::new();
            };
            if !irc_eq(&current.nick, &session.nick) {
                debug!(uid = %uid, nick = %current.nick, "Renamed during enforcement");
                return Vec::new();
            }
            if current.account != session.account || current.is_privileged() {
                session = current;
                continue;
            }

            return match verdict {
                Protection::Violated { .. } => self.enforce(&current).await,
                Protection::Owned { .. } if current.account != expired_account => {
                    info!(uid = %uid, nick = %current.nick, "Owner identified as grace ran out");
                    vec![self.owner_confirmation(uid, &current.nick)]
                }
                _ => {
                    debug!(uid = %uid, nick = %current.nick, "Enforcement no longer applies");
                    Vec::new()
                }
            };
        }

        // Account still flapping: give it another grace period
        debug!(uid = %uid, nick = %session.nick, "Session kept changing, re-tracking");
        self.tracker().track(uid, &session.nick, self.now());
        Vec::new()
    }

    /// Disconnect a session holding a nick it does not own, count the
    /// attempt against its host and consider escalation.
    ///
    /// The kill is issued before any store access so it applies to the
    /// session exactly as the caller validated it.
    pub(crate) async fn enforce(&self, session: &Session) -> Vec<ServiceEffect> {
        let host = session.host_key();
        let reason = format!(
            "Nickname enforcement: {} is registered and you did not identify in time",
            session.nick
        );
        let kill = self.kill(&session.uid, &reason);

        let attempts = match self.store().record_failed_attempt(&host).await {
            Ok(attempts) => Some(attempts),
            Err(e) => {
                warn!(host = %host, error = %e, "Failed to record abuse attempt");
                None
            }
        };
        info!(
            uid = %session.uid,
            nick = %session.nick,
            host = %host,
            attempts = attempts.unwrap_or_default(),
            "Nick enforcement: disconnecting session"
        );

        if let Some(attempts) = attempts {
            self.schedule_escalation(&session.nick, &host, attempts).await;
        }
        vec![kill]
    }
}
