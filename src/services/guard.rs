//! The nickname protection engine.
//!
//! One [`NickGuard`] owns every piece of in-memory protection state: the
//! session directory, the enforcement tracker, the placeholder registry and
//! the deferred queue. Inbound events, the sweep, the deferred pump and
//! NickServ commands all run against the same instance and return
//! [`ServiceEffect`]s for the uplink to send.

use super::base::ServiceBase;
use super::deferred::DeferredQueue;
use super::dummy::DummyRegistry;
use super::protection::{self, Protection};
use super::tracker::EnforcementTracker;
use super::ServiceEffect;
use crate::config::ProtectionConfig;
use crate::db::NickStore;
use crate::state::{Clock, SessionDirectory, Uid, UidGenerator};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Placeholder UID candidates tried before an occupation fails.
pub const MAX_UID_ATTEMPTS: usize = 16;

/// Link phase as seen by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Not linked; events are refused.
    Stopped,
    /// Receiving the uplink's initial burst.
    Burst,
    /// Burst finished.
    Live,
}

pub struct NickGuard {
    config: ProtectionConfig,
    store: Arc<dyn NickStore>,
    clock: Arc<dyn Clock>,
    uids: UidGenerator,
    service_uid: Uid,
    phase: RwLock<Phase>,
    sessions: SessionDirectory,
    tracker: EnforcementTracker,
    dummies: DummyRegistry,
    deferred: DeferredQueue,
}

impl ServiceBase for NickGuard {
    fn service_name(&self) -> &str {
        &self.config.nick
    }
}

impl NickGuard {
    pub fn new(
        config: ProtectionConfig,
        sid: &str,
        store: Arc<dyn NickStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let uids = UidGenerator::new(sid.to_string());
        let service_uid = uids.service_uid();
        Self {
            config,
            store,
            clock,
            uids,
            service_uid,
            phase: RwLock::new(Phase::Stopped),
            sessions: SessionDirectory::new(),
            tracker: EnforcementTracker::new(),
            dummies: DummyRegistry::new(),
            deferred: DeferredQueue::new(),
        }
    }

    /// Begin processing a fresh link. Starts in the burst phase.
    pub fn start(&self) {
        self.reset();
        *self.phase.write() = Phase::Burst;
        info!("Nickname protection started, awaiting end of burst");
    }

    /// Stop processing and forget all network state.
    pub fn stop(&self) {
        *self.phase.write() = Phase::Stopped;
        let (tracked, placeholders) = (self.tracker.len(), self.dummies.len());
        self.reset();
        info!(tracked, placeholders, "Nickname protection stopped");
    }

    fn reset(&self) {
        self.tracker.clear_all();
        self.dummies.clear();
        self.deferred.clear();
        self.sessions.clear();
    }

    pub fn phase(&self) -> Phase {
        *self.phase.read()
    }

    pub fn is_running(&self) -> bool {
        self.phase() != Phase::Stopped
    }

    /// Move from burst to live. Returns `true` on the transition itself.
    pub(crate) fn end_burst(&self) -> bool {
        let mut phase = self.phase.write();
        if *phase == Phase::Burst {
            *phase = Phase::Live;
            true
        } else {
            false
        }
    }

    pub fn config(&self) -> &ProtectionConfig {
        &self.config
    }

    pub fn service_uid(&self) -> &str {
        &self.service_uid
    }

    pub fn sessions(&self) -> &SessionDirectory {
        &self.sessions
    }

    pub fn tracker(&self) -> &EnforcementTracker {
        &self.tracker
    }

    pub fn dummies(&self) -> &DummyRegistry {
        &self.dummies
    }

    pub fn deferred(&self) -> &DeferredQueue {
        &self.deferred
    }

    pub(crate) fn store(&self) -> &dyn NickStore {
        self.store.as_ref()
    }

    pub(crate) fn uids(&self) -> &UidGenerator {
        &self.uids
    }

    pub(crate) fn now(&self) -> Instant {
        self.clock.now()
    }

    pub(crate) fn unix_now(&self) -> i64 {
        self.clock.unix_now()
    }

    pub(crate) async fn protection(&self, nick: &str, account: Option<&str>) -> Protection {
        protection::resolve(self.store(), nick, account, self.unix_now()).await
    }

    /// Kill a session and drop it from local state.
    ///
    /// The network does not echo our own KILL back, so the session is
    /// forgotten here rather than on a later disconnect event.
    pub(crate) fn kill(&self, uid: &str, reason: &str) -> ServiceEffect {
        self.tracker.clear(uid);
        self.sessions.remove(uid);
        ServiceEffect::Kill {
            target_uid: uid.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Move a session onto `nick` right away.
    pub(crate) fn force_nick(&self, uid: &str, nick: &str) -> Option<ServiceEffect> {
        let new_ts = self.unix_now();
        let session = self.sessions.get(uid)?;
        self.sessions.rename(uid, nick, new_ts)?;
        self.tracker.clear(uid);
        info!(uid = %uid, old_nick = %session.nick, new_nick = %nick, "Forcing nick change");
        Some(ServiceEffect::ForceNick {
            target_uid: uid.to_string(),
            new_nick: nick.to_string(),
            new_ts,
            old_ts: session.nick_ts,
        })
    }

    /// Remove the placeholder holding `nick`, if there is one.
    ///
    /// Pending occupation retries for the nickname are dropped with it.
    pub(crate) fn release_placeholder(&self, nick: &str, reason: &str) -> Option<ServiceEffect> {
        let occupant = self.dummies.release(nick)?;
        self.sessions.remove(&occupant.uid);
        self.deferred.cancel_occupy(nick);
        info!(nick = %occupant.nick, uid = %occupant.uid, reason = %reason, "Placeholder released");
        Some(ServiceEffect::RemovePlaceholder {
            uid: occupant.uid,
            reason: reason.to_string(),
        })
    }

    pub(crate) fn announce(&self, text: String) -> ServiceEffect {
        ServiceEffect::Announce { text }
    }

    /// Confirmation for a tracked session that identified as the owner.
    pub(crate) fn owner_confirmation(&self, uid: &str, nick: &str) -> ServiceEffect {
        self.reply_effect(
            uid,
            &format!("You are now recognized as the owner of \x02{}\x02.", nick),
        )
    }

    /// Notices sent once when a session is put on the clock.
    pub(crate) fn warnings(&self, uid: &str, nick: &str) -> Vec<ServiceEffect> {
        let registered = format!(
            "The nickname \x02{}\x02 is registered and protected. If it is your nickname, identify via \x02{}\x02.",
            nick, self.config.auth_service
        );
        let deadline = format!(
            "If you do not identify within \x02{}\x02 seconds, you will be disconnected.",
            self.config.grace_period
        );
        self.reply_effects(
            uid,
            vec![
                registered.as_str(),
                deadline.as_str(),
                "Otherwise, please choose a different nickname.",
            ],
        )
    }
}
