//! Inbound session lifecycle events and their classification.

use super::base::ServiceBase;
use super::guard::{NickGuard, Phase};
use super::nickserv;
use super::protection::Protection;
use super::ServiceEffect;
use crate::error::EngineError;
use crate::state::{Session, Uid};
use tracing::{debug, info, warn};

/// Login information carried on a session introduction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountBinding {
    pub account: String,
    pub timestamp: i64,
    pub account_id: Option<String>,
}

/// A session introduced by the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSession {
    pub uid: Uid,
    pub nick: String,
    pub ident: String,
    pub host: String,
    pub is_oper: bool,
    pub is_service: bool,
    /// Nick timestamp from the introduction.
    pub ts: i64,
    pub login: Option<AccountBinding>,
}

/// Everything the engine consumes from the uplink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    SessionEstablished(NewSession),
    EndOfBurst,
    Rename { uid: Uid, nick: String, ts: i64 },
    /// `None` is a logout.
    Authenticated { uid: Uid, account: Option<String> },
    Disconnected { uid: Uid },
    ServiceMessage { from_uid: Uid, text: String },
}

impl NickGuard {
    /// Process one inbound event.
    pub async fn handle_event(&self, event: LinkEvent) -> Result<Vec<ServiceEffect>, EngineError> {
        if !self.is_running() {
            return Err(EngineError::NotRunning);
        }

        match event {
            LinkEvent::SessionEstablished(new) => Ok(self.on_session(new).await),
            LinkEvent::EndOfBurst => {
                if self.end_burst() {
                    info!(sessions = self.sessions().len(), "End of burst, now live");
                }
                Ok(Vec::new())
            }
            LinkEvent::Rename { uid, nick, ts } => self.on_rename(&uid, &nick, ts).await,
            LinkEvent::Authenticated { uid, account } => self.on_authenticated(&uid, account).await,
            LinkEvent::Disconnected { uid } => self.on_disconnect(&uid),
            LinkEvent::ServiceMessage { from_uid, text } => {
                let sender = self
                    .sessions()
                    .get(&from_uid)
                    .ok_or(EngineError::UnknownSession(from_uid))?;
                Ok(nickserv::dispatch(self, &sender, &text).await)
            }
        }
    }

    async fn on_session(&self, new: NewSession) -> Vec<ServiceEffect> {
        if new.uid.is_empty() || new.nick.is_empty() {
            debug!(uid = %new.uid, "Ignoring malformed session introduction");
            return Vec::new();
        }

        let session = Session {
            uid: new.uid,
            nick: new.nick,
            ident: new.ident,
            host: new.host,
            account: new.login.map(|l| l.account),
            is_oper: new.is_oper,
            is_service: new.is_service,
            first_seen_at: new.ts,
            nick_ts: new.ts,
        };
        self.tracker().clear(&session.uid);
        self.sessions().insert(session.clone());

        if session.is_privileged() {
            return Vec::new();
        }

        let mut effects = Vec::new();
        if let Some(account) = &session.account {
            effects.extend(self.on_login(&session, account).await);
        }

        if self
            .protection(&session.nick, session.account.as_deref())
            .await
            .is_violated()
        {
            if self.phase() == Phase::Burst {
                info!(uid = %session.uid, nick = %session.nick, "Protected nick held during burst");
                effects.extend(self.enforce(&session).await);
            } else if self.tracker().track(&session.uid, &session.nick, self.now()) {
                effects.extend(self.warnings(&session.uid, &session.nick));
            }
        }
        effects
    }

    async fn on_rename(
        &self,
        uid: &str,
        nick: &str,
        ts: i64,
    ) -> Result<Vec<ServiceEffect>, EngineError> {
        self.sessions()
            .rename(uid, nick, ts)
            .ok_or_else(|| EngineError::UnknownSession(uid.to_string()))?;
        let session = self
            .sessions()
            .get(uid)
            .ok_or_else(|| EngineError::UnknownSession(uid.to_string()))?;

        if session.is_privileged() {
            self.tracker().clear(uid);
            return Ok(Vec::new());
        }
        Ok(self.reevaluate(&session).await)
    }

    /// Put the session on the clock or take it off, for its current nick.
    async fn reevaluate(&self, session: &Session) -> Vec<ServiceEffect> {
        match self
            .protection(&session.nick, session.account.as_deref())
            .await
        {
            Protection::Violated { .. } => {
                if self.tracker().track(&session.uid, &session.nick, self.now()) {
                    return self.warnings(&session.uid, &session.nick);
                }
            }
            Protection::Owned { .. } | Protection::Unprotected => {
                if self.tracker().clear(&session.uid) {
                    debug!(uid = %session.uid, nick = %session.nick, "Enforcement cleared");
                }
            }
        }
        Vec::new()
    }

    async fn on_authenticated(
        &self,
        uid: &str,
        account: Option<String>,
    ) -> Result<Vec<ServiceEffect>, EngineError> {
        if !self.sessions().set_account(uid, account.clone()) {
            return Err(EngineError::UnknownSession(uid.to_string()));
        }
        let session = self
            .sessions()
            .get(uid)
            .ok_or_else(|| EngineError::UnknownSession(uid.to_string()))?;

        let Some(account) = account else {
            debug!(uid = %uid, nick = %session.nick, "Session logged out");
            if session.is_privileged() {
                return Ok(Vec::new());
            }
            return Ok(self.reevaluate(&session).await);
        };

        let mut effects = self.on_login(&session, &account).await;

        if self.tracker().contains(uid) {
            match self.protection(&session.nick, Some(&account)).await {
                Protection::Owned { .. } => {
                    self.tracker().clear(uid);
                    info!(uid = %uid, nick = %session.nick, account = %account, "Owner identified");
                    effects.push(self.owner_confirmation(uid, &session.nick));
                }
                Protection::Unprotected => {
                    self.tracker().clear(uid);
                }
                Protection::Violated { owner } => {
                    effects.push(self.reply_effect(
                        uid,
                        &format!(
                            "You are identified as \x02{}\x02, but \x02{}\x02 belongs to \x02{}\x02. Change your nickname or identify to the owning account.",
                            account, session.nick, owner
                        ),
                    ));
                }
            }
        }
        Ok(effects)
    }

    /// An account was bound to a session: forgive its host and free the
    /// account's nicknames from placeholders.
    async fn on_login(&self, session: &Session, account: &str) -> Vec<ServiceEffect> {
        if let Err(e) = self.store().clear_abuse(&session.host_key()).await {
            warn!(host = %session.host_key(), error = %e, "Failed to clear abuse record");
        }
        if let Err(e) = self.store().touch_account(account, self.unix_now()).await {
            debug!(account = %account, error = %e, "Failed to update last seen");
        }

        let mut nicks = vec![account.to_string()];
        match self.store().list_reservations(account).await {
            Ok(reservations) => nicks.extend(reservations.into_iter().map(|r| r.nickname)),
            Err(e) => warn!(account = %account, error = %e, "Failed to list reservations"),
        }

        let mut effects = Vec::new();
        for nick in nicks {
            if self.deferred().cancel_occupy(&nick) > 0 {
                debug!(nick = %nick, account = %account, "Pending occupation cancelled");
            }
            if let Some(removal) = self.release_placeholder(&nick, "Released: owner identified") {
                effects.push(removal);
                effects.push(self.reply_effect(
                    &session.uid,
                    &format!("Your nickname \x02{}\x02 has been released from its placeholder.", nick),
                ));
                effects.push(self.announce(format!(
                    "Placeholder on {} released: owner {} identified",
                    nick, account
                )));
            }
        }
        effects
    }

    fn on_disconnect(&self, uid: &str) -> Result<Vec<ServiceEffect>, EngineError> {
        self.tracker().clear(uid);
        let session = self.sessions().remove(uid);
        if let Some(occupant) = self.dummies().remove_by_uid(uid) {
            info!(nick = %occupant.nick, uid = %uid, "Placeholder left the network");
        }
        match session {
            Some(_) => Ok(Vec::new()),
            None => Err(EngineError::UnknownSession(uid.to_string())),
        }
    }
}
