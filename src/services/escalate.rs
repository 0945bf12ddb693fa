//! Placeholder escalation for repeated abuse.
//!
//! After a host has been disconnected `gline_attempts` times, the nickname
//! it keeps taking is occupied by a service-flagged placeholder for
//! `gline_duration` seconds and the host is blocked for the same window.
//! Our KILL is not confirmed before the placeholder is introduced, so the
//! occupation runs as a chain of deferred attempts: each one either finds
//! the nick free and occupies it, or kills whoever holds it and tries again
//! after a backoff.

use super::deferred::DeferredTask;
use super::dummy::DummyOccupant;
use super::guard::{MAX_UID_ATTEMPTS, NickGuard};
use super::ServiceEffect;
use crate::state::Session;
use tracing::{debug, error, info, warn};

impl NickGuard {
    /// Queue the first occupation attempt if `host` has crossed the threshold.
    pub(crate) async fn schedule_escalation(&self, nick: &str, host: &str, attempts: u32) {
        if !self.config().gline_enabled || attempts < self.config().gline_attempts {
            return;
        }

        match self.store().abuse_record(host).await {
            Ok(Some(record)) if record.is_blocked(self.unix_now()) => {
                debug!(host = %host, "Host already blocked, not escalating");
                return;
            }
            Ok(_) => {}
            Err(e) => {
                warn!(host = %host, error = %e, "Abuse lookup failed, not escalating");
                return;
            }
        }

        let due = self.now() + self.config().backoff(0);
        self.deferred().schedule(
            DeferredTask::Occupy {
                nick: nick.to_string(),
                host: host.to_string(),
                attempt: 0,
            },
            due,
        );
        info!(nick = %nick, host = %host, attempts, "Escalating to placeholder occupation");
    }

    /// Run every deferred task that is due.
    pub async fn run_deferred(&self) -> Vec<ServiceEffect> {
        if !self.is_running() {
            return Vec::new();
        }

        let mut effects = Vec::new();
        for task in self.deferred().take_due(self.now()) {
            match task {
                DeferredTask::Occupy {
                    nick,
                    host,
                    attempt,
                } => effects.extend(self.try_occupy(&nick, &host, attempt).await),
                DeferredTask::Rename { uid, nick } => {
                    effects.extend(self.complete_recover(&uid, &nick).await)
                }
            }
        }
        effects
    }

    async fn try_occupy(&self, nick: &str, host: &str, attempt: u32) -> Vec<ServiceEffect> {
        if self.dummies().contains(nick) {
            debug!(nick = %nick, "Already occupied");
            return Vec::new();
        }

        match self.sessions().by_nick(nick) {
            Some(holder) => self.contest(holder, nick, host, attempt).await,
            None => self.occupy(nick, host, attempt).await,
        }
    }

    /// Run the same attempt again on the next poll.
    fn retry_occupy(&self, nick: &str, host: &str, attempt: u32) {
        self.deferred().schedule(
            DeferredTask::Occupy {
                nick: nick.to_string(),
                host: host.to_string(),
                attempt,
            },
            self.now(),
        );
    }

    /// Someone took the nick again before the placeholder could.
    async fn contest(
        &self,
        holder: Session,
        nick: &str,
        host: &str,
        attempt: u32,
    ) -> Vec<ServiceEffect> {
        if holder.is_privileged() {
            debug!(nick = %nick, uid = %holder.uid, "Nick held by a privileged session");
            return Vec::new();
        }
        let verdict = self.protection(nick, holder.account.as_deref()).await;

        // The verdict is for the holder as it was before the lookup
        match self.sessions().by_nick(nick) {
            Some(current) if current.uid == holder.uid && current.account == holder.account => {}
            _ => {
                debug!(nick = %nick, uid = %holder.uid, "Holder changed during lookup, retrying");
                self.retry_occupy(nick, host, attempt);
                return Vec::new();
            }
        }

        if !verdict.is_violated() {
            info!(nick = %nick, uid = %holder.uid, "Nick reclaimed by its owner, abandoning occupation");
            return Vec::new();
        }

        let max = self.config().max_retries;
        if attempt > max {
            warn!(nick = %nick, host = %host, attempt, "Occupation still contested, giving up");
            return vec![self.announce(format!(
                "Could not occupy {} after {} attempts: nickname keeps being retaken",
                nick, attempt
            ))];
        }

        let reason = if attempt < max {
            "Nickname is being held by services"
        } else {
            "Nickname is being held by services (final notice)"
        };
        let kill = self.kill(&holder.uid, reason);

        let next = attempt + 1;
        self.deferred().schedule(
            DeferredTask::Occupy {
                nick: nick.to_string(),
                host: host.to_string(),
                attempt: next,
            },
            self.now() + self.config().backoff(next),
        );
        debug!(nick = %nick, uid = %holder.uid, attempt, "Occupation contested, retrying");
        vec![kill]
    }

    /// The nick is free: claim it, block the host and introduce the placeholder.
    async fn occupy(&self, nick: &str, host: &str, attempt: u32) -> Vec<ServiceEffect> {
        let now = self.unix_now();

        match self.store().abuse_record(host).await {
            Ok(Some(record))
                if record.attempts >= self.config().gline_attempts && !record.is_blocked(now) => {}
            Ok(_) => {
                debug!(nick = %nick, host = %host, "Escalation no longer warranted");
                return Vec::new();
            }
            Err(e) => {
                warn!(host = %host, error = %e, "Abuse lookup failed, abandoning occupation");
                return Vec::new();
            }
        }
        if !self.protection(nick, None).await.is_violated() {
            debug!(nick = %nick, "Nick no longer protected");
            return Vec::new();
        }

        // Someone may have taken the nick during the lookups
        if self.sessions().by_nick(nick).is_some() {
            debug!(nick = %nick, "Nick retaken during lookup, retrying");
            self.retry_occupy(nick, host, attempt);
            return Vec::new();
        }

        let Some(uid) = self.uids().allocate(MAX_UID_ATTEMPTS, |uid| {
            self.sessions().contains(uid) || self.dummies().has_uid(uid)
        }) else {
            error!(nick = %nick, host = %host, "Placeholder UID allocation exhausted");
            return vec![self.announce(format!(
                "Failed to occupy {}: no free placeholder UID",
                nick
            ))];
        };

        let claimed = self.dummies().claim(DummyOccupant {
            nick: nick.to_string(),
            uid: uid.clone(),
            host: host.to_string(),
            created_at: self.now(),
        });
        if !claimed {
            debug!(nick = %nick, "Placeholder raced, already occupied");
            return Vec::new();
        }

        let config = self.config();
        self.sessions().insert(Session {
            uid: uid.clone(),
            nick: nick.to_string(),
            ident: config.placeholder_ident.clone(),
            host: config.placeholder_host.clone(),
            account: None,
            is_oper: false,
            is_service: true,
            first_seen_at: now,
            nick_ts: now,
        });

        let duration = config.block_duration().as_secs();
        let until = now.saturating_add(i64::try_from(duration).unwrap_or(i64::MAX));
        if let Err(e) = self.store().block_host(host, until).await {
            error!(host = %host, error = %e, "Failed to persist host block, releasing claim");
            self.dummies().remove_by_uid(&uid);
            self.sessions().remove(&uid);
            return Vec::new();
        }

        info!(nick = %nick, uid = %uid, host = %host, until, "Nickname occupied by placeholder");
        vec![
            ServiceEffect::IntroducePlaceholder {
                uid,
                nick: nick.to_string(),
                ident: config.placeholder_ident.clone(),
                host: config.placeholder_host.clone(),
                gecos: config.placeholder_gecos.clone(),
                ts: now,
            },
            self.announce(format!(
                "Nickname {} occupied for {} seconds after repeated abuse from {}",
                nick, duration, host
            )),
        ]
    }
}
