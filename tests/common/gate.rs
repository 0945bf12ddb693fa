//! Store wrapper that can hold the engine inside a lookup.
//!
//! Arming the gate parks the next protection lookup until the test lets it
//! go, so link events can be delivered while a sweep or an occupation
//! attempt is suspended on the store.

#![allow(dead_code)]

use async_trait::async_trait;
use slirc_nickguard::db::{AbuseRecord, Account, Database, DbError, NickStore, Reservation};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Notify;

pub struct GatedStore {
    inner: Database,
    armed: AtomicBool,
    fail_block: AtomicBool,
    /// Signalled once a lookup is held at the gate.
    pub parked: Notify,
    /// Lets the held lookup continue.
    pub release: Notify,
}

impl GatedStore {
    pub fn new(inner: Database) -> Self {
        Self {
            inner,
            armed: AtomicBool::new(false),
            fail_block: AtomicBool::new(false),
            parked: Notify::new(),
            release: Notify::new(),
        }
    }

    /// Hold the next exemption lookup.
    pub fn arm(&self) {
        self.armed.store(true, Ordering::SeqCst);
    }

    /// Make host blocks fail to persist.
    pub fn fail_blocks(&self, fail: bool) {
        self.fail_block.store(fail, Ordering::SeqCst);
    }

    async fn checkpoint(&self) {
        if self.armed.swap(false, Ordering::SeqCst) {
            self.parked.notify_one();
            self.release.notified().await;
        }
    }
}

#[async_trait]
impl NickStore for GatedStore {
    async fn find_account(&self, name: &str) -> Result<Option<Account>, DbError> {
        self.inner.find_account(name).await
    }

    async fn touch_account(&self, name: &str, now: i64) -> Result<(), DbError> {
        self.inner.touch_account(name, now).await
    }

    async fn is_protection_exempt(&self, account: &str) -> Result<bool, DbError> {
        self.checkpoint().await;
        self.inner.is_protection_exempt(account).await
    }

    async fn find_reservation(&self, nickname: &str) -> Result<Option<Reservation>, DbError> {
        self.inner.find_reservation(nickname).await
    }

    async fn list_reservations(&self, account: &str) -> Result<Vec<Reservation>, DbError> {
        self.inner.list_reservations(account).await
    }

    async fn insert_reservation(
        &self,
        nickname: &str,
        account: &str,
        now: i64,
    ) -> Result<(), DbError> {
        self.inner.insert_reservation(nickname, account, now).await
    }

    async fn delete_reservation(&self, nickname: &str) -> Result<bool, DbError> {
        self.inner.delete_reservation(nickname).await
    }

    async fn touch_reservation(&self, nickname: &str, now: i64) -> Result<(), DbError> {
        self.inner.touch_reservation(nickname, now).await
    }

    async fn abuse_record(&self, host: &str) -> Result<Option<AbuseRecord>, DbError> {
        self.inner.abuse_record(host).await
    }

    async fn record_failed_attempt(&self, host: &str) -> Result<u32, DbError> {
        self.inner.record_failed_attempt(host).await
    }

    async fn block_host(&self, host: &str, until: i64) -> Result<(), DbError> {
        if self.fail_block.load(Ordering::SeqCst) {
            return Err(DbError::Sqlx(sqlx::Error::PoolTimedOut));
        }
        self.inner.block_host(host, until).await
    }

    async fn clear_abuse(&self, host: &str) -> Result<(), DbError> {
        self.inner.clear_abuse(host).await
    }
}
