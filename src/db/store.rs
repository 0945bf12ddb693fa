//! Narrow persistence interface used by the protection engine.
//!
//! The engine never touches SQL directly; every lookup it needs is one
//! call here. `Database` is the production implementation.

use super::{AbuseRecord, Account, Database, DbError, Reservation};
use async_trait::async_trait;

/// Storage operations the protection engine depends on.
#[async_trait]
pub trait NickStore: Send + Sync {
    /// Primary registration for `name`, if any.
    async fn find_account(&self, name: &str) -> Result<Option<Account>, DbError>;

    /// Record that the account was seen identified.
    async fn touch_account(&self, name: &str, now: i64) -> Result<(), DbError>;

    /// Whether the account opted out of nickname protection.
    async fn is_protection_exempt(&self, account: &str) -> Result<bool, DbError>;

    /// Reservation covering `nickname`, if any.
    async fn find_reservation(&self, nickname: &str) -> Result<Option<Reservation>, DbError>;

    async fn list_reservations(&self, account: &str) -> Result<Vec<Reservation>, DbError>;

    async fn insert_reservation(
        &self,
        nickname: &str,
        account: &str,
        now: i64,
    ) -> Result<(), DbError>;

    async fn delete_reservation(&self, nickname: &str) -> Result<bool, DbError>;

    /// Record that a reservation was confirmed in use.
    async fn touch_reservation(&self, nickname: &str, now: i64) -> Result<(), DbError>;

    async fn abuse_record(&self, host: &str) -> Result<Option<AbuseRecord>, DbError>;

    /// Count one more failed attempt for `host`; returns the new total.
    async fn record_failed_attempt(&self, host: &str) -> Result<u32, DbError>;

    async fn block_host(&self, host: &str, until: i64) -> Result<(), DbError>;

    async fn clear_abuse(&self, host: &str) -> Result<(), DbError>;
}

#[async_trait]
impl NickStore for Database {
    async fn find_account(&self, name: &str) -> Result<Option<Account>, DbError> {
        self.accounts().find_by_name(name).await
    }

    async fn touch_account(&self, name: &str, now: i64) -> Result<(), DbError> {
        self.accounts().touch(name, now).await
    }

    async fn is_protection_exempt(&self, account: &str) -> Result<bool, DbError> {
        self.accounts().is_noprotect(account).await
    }

    async fn find_reservation(&self, nickname: &str) -> Result<Option<Reservation>, DbError> {
        self.reservations().find(nickname).await
    }

    async fn list_reservations(&self, account: &str) -> Result<Vec<Reservation>, DbError> {
        self.reservations().list(account).await
    }

    async fn insert_reservation(
        &self,
        nickname: &str,
        account: &str,
        now: i64,
    ) -> Result<(), DbError> {
        self.reservations().insert(nickname, account, now).await
    }

    async fn delete_reservation(&self, nickname: &str) -> Result<bool, DbError> {
        self.reservations().delete(nickname).await
    }

    async fn touch_reservation(&self, nickname: &str, now: i64) -> Result<(), DbError> {
        self.reservations().touch(nickname, now).await
    }

    async fn abuse_record(&self, host: &str) -> Result<Option<AbuseRecord>, DbError> {
        self.abuse().get(host).await
    }

    async fn record_failed_attempt(&self, host: &str) -> Result<u32, DbError> {
        self.abuse().increment(host).await
    }

    async fn block_host(&self, host: &str, until: i64) -> Result<(), DbError> {
        self.abuse().set_blocked_until(host, until).await
    }

    async fn clear_abuse(&self, host: &str) -> Result<(), DbError> {
        self.abuse().clear(host).await
    }
}
