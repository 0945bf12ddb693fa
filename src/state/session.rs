//! Session directory: the services node's view of who is on the network.
//!
//! Populated from the link's event stream. Readers get cloned snapshots;
//! anything acting on a snapshot later must look the session up again.

use super::Uid;
use crate::proto::irc_to_lower;
use dashmap::DashMap;

/// A connected identity on the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub uid: Uid,
    pub nick: String,
    pub ident: String,
    pub host: String,
    /// Bound account, if authenticated.
    pub account: Option<String>,
    pub is_oper: bool,
    pub is_service: bool,
    /// Network timestamp from the introduction.
    pub first_seen_at: i64,
    /// Timestamp of the current nick, required to force-rename on TS6.
    pub nick_ts: i64,
}

impl Session {
    /// Abuse counter key.
    pub fn host_key(&self) -> String {
        format!("{}@{}", self.ident, self.host)
    }

    /// Opers and services are never subject to nickname enforcement.
    pub fn is_privileged(&self) -> bool {
        self.is_oper || self.is_service
    }
}

/// Concurrent uid → session map with a casefolded nick index.
#[derive(Debug, Default)]
pub struct SessionDirectory {
    users: DashMap<Uid, Session>,
    nicks: DashMap<String, Uid>,
}

impl SessionDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a session.
    pub fn insert(&self, session: Session) {
        if let Some(old) = self.users.insert(session.uid.clone(), session.clone()) {
            self.unindex(&old.nick, &old.uid);
        }
        self.nicks.insert(irc_to_lower(&session.nick), session.uid);
    }

    /// Remove a session, returning its last snapshot.
    pub fn remove(&self, uid: &str) -> Option<Session> {
        let (_, session) = self.users.remove(uid)?;
        self.unindex(&session.nick, uid);
        Some(session)
    }

    /// Change a session's nick. Returns the old nick.
    pub fn rename(&self, uid: &str, new_nick: &str, nick_ts: i64) -> Option<String> {
        let old_nick = {
            let mut session = self.users.get_mut(uid)?;
            session.nick_ts = nick_ts;
            std::mem::replace(&mut session.nick, new_nick.to_string())
        };
        self.unindex(&old_nick, uid);
        self.nicks.insert(irc_to_lower(new_nick), uid.to_string());
        Some(old_nick)
    }

    /// Bind (or with `None`, unbind) an account.
    pub fn set_account(&self, uid: &str, account: Option<String>) -> bool {
        match self.users.get_mut(uid) {
            Some(mut session) => {
                session.account = account;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, uid: &str) -> Option<Session> {
        self.users.get(uid).map(|s| s.value().clone())
    }

    pub fn contains(&self, uid: &str) -> bool {
        self.users.contains_key(uid)
    }

    /// Session currently using `nick`.
    pub fn by_nick(&self, nick: &str) -> Option<Session> {
        let uid = self.nicks.get(&irc_to_lower(nick))?.value().clone();
        self.get(&uid)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn clear(&self) {
        self.users.clear();
        self.nicks.clear();
    }

    /// Drop the nick index entry only if it still points at `uid`.
    fn unindex(&self, nick: &str, uid: &str) {
        self.nicks.remove_if(&irc_to_lower(nick), |_, owner| owner == uid);
    }
}
