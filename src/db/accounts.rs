//! Account repository.
//!
//! Accounts are owned by the registration service. This side reads them
//! for ownership checks and INFO, and can create bare rows for seeding.

use super::DbError;
use sqlx::SqlitePool;

/// A registered account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub registered_at: i64,
    pub last_seen_at: i64,
    /// Owner opted out of nickname protection.
    pub noprotect: bool,
}

type AccountRow = (i64, String, i64, i64, bool);

fn from_row((id, name, registered_at, last_seen_at, noprotect): AccountRow) -> Account {
    Account {
        id,
        name,
        registered_at,
        last_seen_at,
        noprotect,
    }
}

/// Repository for account operations.
pub struct AccountRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> AccountRepository<'a> {
    /// Create a new account repository.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert an account row.
    pub async fn create(&self, name: &str, now: i64) -> Result<Account, DbError> {
        let result = sqlx::query(
            r#"
            INSERT INTO accounts (name, registered_at, last_seen_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(name)
        .bind(now)
        .bind(now)
        .execute(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return DbError::AccountExists(name.to_string());
            }
            DbError::from(e)
        })?;

        Ok(Account {
            id: result.last_insert_rowid(),
            name: name.to_string(),
            registered_at: now,
            last_seen_at: now,
            noprotect: false,
        })
    }

    /// Find account by name (case-insensitive).
    pub async fn find_by_name(&self, name: &str) -> Result<Option<Account>, DbError> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT id, name, registered_at, last_seen_at, noprotect
            FROM accounts
            WHERE name = ? COLLATE NOCASE
            "#,
        )
        .bind(name)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(from_row))
    }

    /// Read the protection opt-out flag.
    pub async fn is_noprotect(&self, name: &str) -> Result<bool, DbError> {
        let flag = sqlx::query_scalar::<_, bool>(
            "SELECT noprotect FROM accounts WHERE name = ? COLLATE NOCASE",
        )
        .bind(name)
        .fetch_optional(self.pool)
        .await?;

        flag.ok_or_else(|| DbError::AccountNotFound(name.to_string()))
    }

    /// Set the protection opt-out flag.
    pub async fn set_noprotect(&self, name: &str, noprotect: bool) -> Result<(), DbError> {
        let result = sqlx::query("UPDATE accounts SET noprotect = ? WHERE name = ? COLLATE NOCASE")
            .bind(noprotect)
            .bind(name)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::AccountNotFound(name.to_string()));
        }
        Ok(())
    }

    /// Bump last-seen after the account is seen in use.
    pub async fn touch(&self, name: &str, now: i64) -> Result<(), DbError> {
        sqlx::query("UPDATE accounts SET last_seen_at = ? WHERE name = ? COLLATE NOCASE")
            .bind(now)
            .bind(name)
            .execute(self.pool)
            .await?;
        Ok(())
    }
}
