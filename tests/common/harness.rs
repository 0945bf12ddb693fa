//! Engine harness: an in-memory database, a manual clock and a live engine.

#![allow(dead_code)]

use super::gate::GatedStore;
use slirc_nickguard::config::ProtectionConfig;
use slirc_nickguard::db::Database;
use slirc_nickguard::services::{AccountBinding, LinkEvent, NewSession, NickGuard, ServiceEffect};
use slirc_nickguard::state::{Clock, ManualClock};
use std::sync::Arc;
use std::time::Duration;

/// Unix time the manual clock starts at.
pub const START: i64 = 1_700_000_000;

pub struct Harness {
    pub guard: Arc<NickGuard>,
    pub db: Database,
    /// The store the engine sees; pass-through until armed.
    pub gate: Arc<GatedStore>,
    pub clock: Arc<ManualClock>,
}

impl Harness {
    /// Engine with default protection settings, still in the burst phase.
    pub async fn new() -> anyhow::Result<Self> {
        Self::with_config(ProtectionConfig::default()).await
    }

    pub async fn with_config(config: ProtectionConfig) -> anyhow::Result<Self> {
        let db = Database::new(":memory:").await?;
        let gate = Arc::new(GatedStore::new(db.clone()));
        let clock = Arc::new(ManualClock::new(START));
        let guard = Arc::new(NickGuard::new(config, "00X", gate.clone(), clock.clone()));
        guard.start();
        Ok(Self {
            guard,
            db,
            gate,
            clock,
        })
    }

    /// Engine past its burst with the given accounts registered.
    pub async fn live(accounts: &[&str]) -> anyhow::Result<Self> {
        let harness = Self::new().await?;
        for account in accounts {
            harness.register(account).await?;
        }
        harness.end_burst().await?;
        Ok(harness)
    }

    pub async fn register(&self, account: &str) -> anyhow::Result<()> {
        self.db.accounts().create(account, START).await?;
        Ok(())
    }

    pub async fn end_burst(&self) -> anyhow::Result<()> {
        self.guard.handle_event(LinkEvent::EndOfBurst).await?;
        Ok(())
    }

    /// Introduce an unauthenticated user from `ident@host`.
    pub async fn connect(
        &self,
        uid: &str,
        nick: &str,
        ident: &str,
        host: &str,
    ) -> anyhow::Result<Vec<ServiceEffect>> {
        self.introduce(uid, nick, ident, host, None).await
    }

    /// Introduce a user already logged in to `account`.
    pub async fn connect_as(
        &self,
        uid: &str,
        nick: &str,
        account: &str,
    ) -> anyhow::Result<Vec<ServiceEffect>> {
        self.introduce(uid, nick, "owner", "owner.example.org", Some(account))
            .await
    }

    async fn introduce(
        &self,
        uid: &str,
        nick: &str,
        ident: &str,
        host: &str,
        account: Option<&str>,
    ) -> anyhow::Result<Vec<ServiceEffect>> {
        let event = LinkEvent::SessionEstablished(NewSession {
            uid: uid.to_string(),
            nick: nick.to_string(),
            ident: ident.to_string(),
            host: host.to_string(),
            is_oper: false,
            is_service: false,
            ts: self.clock_unix(),
            login: account.map(|a| AccountBinding {
                account: a.to_string(),
                timestamp: self.clock_unix(),
                account_id: None,
            }),
        });
        Ok(self.guard.handle_event(event).await?)
    }

    pub async fn rename(&self, uid: &str, nick: &str) -> anyhow::Result<Vec<ServiceEffect>> {
        let event = LinkEvent::Rename {
            uid: uid.to_string(),
            nick: nick.to_string(),
            ts: self.clock_unix(),
        };
        Ok(self.guard.handle_event(event).await?)
    }

    pub async fn login(
        &self,
        uid: &str,
        account: Option<&str>,
    ) -> anyhow::Result<Vec<ServiceEffect>> {
        let event = LinkEvent::Authenticated {
            uid: uid.to_string(),
            account: account.map(str::to_string),
        };
        Ok(self.guard.handle_event(event).await?)
    }

    pub async fn quit(&self, uid: &str) -> anyhow::Result<Vec<ServiceEffect>> {
        let event = LinkEvent::Disconnected {
            uid: uid.to_string(),
        };
        Ok(self.guard.handle_event(event).await?)
    }

    /// PRIVMSG NickServ from `uid`.
    pub async fn msg(&self, uid: &str, text: &str) -> anyhow::Result<Vec<ServiceEffect>> {
        let event = LinkEvent::ServiceMessage {
            from_uid: uid.to_string(),
            text: text.to_string(),
        };
        Ok(self.guard.handle_event(event).await?)
    }

    pub fn advance(&self, by: Duration) {
        self.clock.advance(by);
    }

    /// One scheduler round: the sweep, then the deferred queue.
    pub async fn tick(&self) -> Vec<ServiceEffect> {
        let mut effects = self.guard.sweep().await;
        effects.extend(self.guard.run_deferred().await);
        effects
    }

    pub fn clock_unix(&self) -> i64 {
        self.clock.unix_now()
    }
}

/// Notice texts addressed to `uid`.
pub fn notices_to(effects: &[ServiceEffect], uid: &str) -> Vec<String> {
    effects
        .iter()
        .filter_map(|e| match e {
            ServiceEffect::Notice { target_uid, text } if target_uid == uid => Some(text.clone()),
            _ => None,
        })
        .collect()
}

/// UIDs killed by the effects.
pub fn kills(effects: &[ServiceEffect]) -> Vec<String> {
    effects
        .iter()
        .filter_map(|e| match e {
            ServiceEffect::Kill { target_uid, .. } => Some(target_uid.clone()),
            _ => None,
        })
        .collect()
}
