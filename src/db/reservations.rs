//! Reservation repository: extra nicknames owned by an account.

use super::DbError;
use sqlx::SqlitePool;

/// A reserved nickname.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    pub nickname: String,
    pub account: String,
    pub reserved_at: i64,
    pub last_seen_at: i64,
}

type ReservationRow = (String, String, i64, i64);

fn from_row((nickname, account, reserved_at, last_seen_at): ReservationRow) -> Reservation {
    Reservation {
        nickname,
        account,
        reserved_at,
        last_seen_at,
    }
}

/// Repository for reservation operations.
pub struct ReservationRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ReservationRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Look up the reservation for a nickname (case-insensitive).
    pub async fn find(&self, nickname: &str) -> Result<Option<Reservation>, DbError> {
        let row = sqlx::query_as::<_, ReservationRow>(
            r#"
            SELECT nickname, account, reserved_at, last_seen_at
            FROM reservations
            WHERE nickname = ? COLLATE NOCASE
            "#,
        )
        .bind(nickname)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(from_row))
    }

    /// All reservations held by an account, oldest first.
    pub async fn list(&self, account: &str) -> Result<Vec<Reservation>, DbError> {
        let rows = sqlx::query_as::<_, ReservationRow>(
            r#"
            SELECT nickname, account, reserved_at, last_seen_at
            FROM reservations
            WHERE account = ? COLLATE NOCASE
            ORDER BY reserved_at, nickname
            "#,
        )
        .bind(account)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(from_row).collect())
    }

    /// Insert a reservation. The nickname column is unique, so a concurrent
    /// reserve of the same nickname loses with `AlreadyReserved`.
    pub async fn insert(&self, nickname: &str, account: &str, now: i64) -> Result<(), DbError> {
        sqlx::query(
            r#"
            INSERT INTO reservations (nickname, account, reserved_at, last_seen_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(nickname)
        .bind(account)
        .bind(now)
        .bind(now)
        .execute(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return DbError::AlreadyReserved(nickname.to_string());
            }
            DbError::from(e)
        })?;
        Ok(())
    }

    /// Delete a reservation. Returns whether a row was removed.
    pub async fn delete(&self, nickname: &str) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM reservations WHERE nickname = ? COLLATE NOCASE")
            .bind(nickname)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Update last-seen for a reservation.
    pub async fn touch(&self, nickname: &str, now: i64) -> Result<(), DbError> {
        sqlx::query("UPDATE reservations SET last_seen_at = ? WHERE nickname = ? COLLATE NOCASE")
            .bind(now)
            .bind(nickname)
            .execute(self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::db::{Database, DbError};

    async fn db_with_bob() -> Database {
        let db = Database::new(":memory:").await.unwrap();
        db.accounts().create("bob", 1).await.unwrap();
        db
    }

    #[tokio::test]
    async fn insert_find_and_list() {
        let db = db_with_bob().await;
        db.reservations().insert("bobby", "bob", 10).await.unwrap();
        db.reservations().insert("b0b", "bob", 20).await.unwrap();

        let found = db.reservations().find("BOBBY").await.unwrap().unwrap();
        assert_eq!(found.account, "bob");
        assert_eq!(found.reserved_at, 10);

        let list = db.reservations().list("Bob").await.unwrap();
        let nicks: Vec<_> = list.iter().map(|r| r.nickname.as_str()).collect();
        assert_eq!(nicks, vec!["bobby", "b0b"]);
    }

    #[tokio::test]
    async fn duplicate_insert_is_already_reserved() {
        let db = db_with_bob().await;
        db.reservations().insert("bobby", "bob", 10).await.unwrap();
        let err = db.reservations().insert("Bobby", "bob", 11).await.unwrap_err();
        assert!(matches!(err, DbError::AlreadyReserved(_)));
    }

    #[tokio::test]
    async fn delete_and_touch() {
        let db = db_with_bob().await;
        db.reservations().insert("bobby", "bob", 10).await.unwrap();
        db.reservations().touch("bobby", 99).await.unwrap();
        assert_eq!(
            db.reservations().find("bobby").await.unwrap().unwrap().last_seen_at,
            99
        );

        assert!(db.reservations().delete("BOBBY").await.unwrap());
        assert!(!db.reservations().delete("bobby").await.unwrap());
        assert!(db.reservations().find("bobby").await.unwrap().is_none());
    }
}
