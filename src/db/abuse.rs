//! Abuse counters keyed by `ident@host`.

use super::DbError;
use sqlx::SqlitePool;

/// Failed identification attempts for one host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbuseRecord {
    pub host: String,
    pub attempts: u32,
    /// Unix timestamp until which escalation for this host is suppressed.
    pub blocked_until: Option<i64>,
}

impl AbuseRecord {
    /// Whether the host is inside an unexpired block window at `now`.
    pub fn is_blocked(&self, now: i64) -> bool {
        self.blocked_until.is_some_and(|until| until > now)
    }
}

pub struct AbuseRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> AbuseRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, host: &str) -> Result<Option<AbuseRecord>, DbError> {
        let row = sqlx::query_as::<_, (String, i64, Option<i64>)>(
            "SELECT host, attempts, blocked_until FROM abuse WHERE host = ?",
        )
        .bind(host)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|(host, attempts, blocked_until)| AbuseRecord {
            host,
            attempts: u32::try_from(attempts).unwrap_or(u32::MAX),
            blocked_until,
        }))
    }

    /// Increment the attempt counter, creating the row if needed.
    /// Returns the new count.
    pub async fn increment(&self, host: &str) -> Result<u32, DbError> {
        let attempts = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO abuse (host, attempts) VALUES (?, 1)
            ON CONFLICT(host) DO UPDATE SET attempts = attempts + 1
            RETURNING attempts
            "#,
        )
        .bind(host)
        .fetch_one(self.pool)
        .await?;

        Ok(u32::try_from(attempts).unwrap_or(u32::MAX))
    }

    pub async fn set_blocked_until(&self, host: &str, until: i64) -> Result<(), DbError> {
        sqlx::query(
            r#"
            INSERT INTO abuse (host, attempts, blocked_until) VALUES (?, 0, ?)
            ON CONFLICT(host) DO UPDATE SET blocked_until = excluded.blocked_until
            "#,
        )
        .bind(host)
        .bind(until)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    pub async fn clear(&self, host: &str) -> Result<(), DbError> {
        sqlx::query("DELETE FROM abuse WHERE host = ?")
            .bind(host)
            .execute(self.pool)
            .await?;
        Ok(())
    }
}
