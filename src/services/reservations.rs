//! Nickname reservations: extra nicknames protected on behalf of an account.

use crate::db::{DbError, NickStore, Reservation};
use crate::proto::{NickExt, irc_eq};
use thiserror::Error;
use tracing::info;

/// Most reservations a single account may hold.
pub const MAX_RESERVATIONS: usize = 5;

/// Why a reservation request was refused. Displays as the user-facing reply.
#[derive(Debug, Error)]
pub enum ReserveError {
    #[error("\x02{0}\x02 is not a valid nickname.")]
    InvalidNick(String),

    #[error("\x02{0}\x02 is your account name and is already protected.")]
    OwnAccount(String),

    #[error("\x02{0}\x02 is a registered account and cannot be reserved.")]
    Registered(String),

    #[error("You have already reserved \x02{0}\x02.")]
    AlreadyYours(String),

    #[error("\x02{0}\x02 is already reserved by another account.")]
    ReservedByOther(String),

    #[error("You already hold the maximum of {0} reserved nicknames.")]
    LimitReached(usize),

    #[error("\x02{0}\x02 is not reserved.")]
    NotReserved(String),

    #[error("You do not hold the reservation for \x02{0}\x02.")]
    NotOwner(String),

    #[error("Reservation storage is unavailable, please try again later.")]
    Storage(#[from] DbError),
}

/// Owner-facing operations over the reservation table.
pub struct ReservationManager<'a> {
    store: &'a dyn NickStore,
}

impl<'a> ReservationManager<'a> {
    pub fn new(store: &'a dyn NickStore) -> Self {
        Self { store }
    }

    /// Reserve `nick` for `account`.
    pub async fn reserve(&self, nick: &str, account: &str, now: i64) -> Result<(), ReserveError> {
        if !nick.is_valid_nick() {
            return Err(ReserveError::InvalidNick(nick.to_string()));
        }
        if irc_eq(nick, account) {
            return Err(ReserveError::OwnAccount(nick.to_string()));
        }
        if self.store.find_account(nick).await?.is_some() {
            return Err(ReserveError::Registered(nick.to_string()));
        }
        if let Some(existing) = self.store.find_reservation(nick).await? {
            return Err(if irc_eq(&existing.account, account) {
                ReserveError::AlreadyYours(existing.nickname)
            } else {
                ReserveError::ReservedByOther(existing.nickname)
            });
        }
        if self.store.list_reservations(account).await?.len() >= MAX_RESERVATIONS {
            return Err(ReserveError::LimitReached(MAX_RESERVATIONS));
        }

        match self.store.insert_reservation(nick, account, now).await {
            Ok(()) => {}
            Err(DbError::AlreadyReserved(_)) => {
                return Err(ReserveError::ReservedByOther(nick.to_string()));
            }
            Err(e) => return Err(e.into()),
        }
        info!(nick = %nick, account = %account, "Nickname reserved");
        Ok(())
    }

    /// Drop a reservation. Only its holder or an operator may do so.
    pub async fn unreserve(
        &self,
        nick: &str,
        requester: &str,
        is_oper: bool,
    ) -> Result<Reservation, ReserveError> {
        let Some(existing) = self.store.find_reservation(nick).await? else {
            return Err(ReserveError::NotReserved(nick.to_string()));
        };
        if !is_oper && !irc_eq(&existing.account, requester) {
            return Err(ReserveError::NotOwner(existing.nickname));
        }
        if !self.store.delete_reservation(nick).await? {
            return Err(ReserveError::NotReserved(nick.to_string()));
        }
        info!(nick = %existing.nickname, account = %existing.account, by = %requester, "Reservation removed");
        Ok(existing)
    }

    pub async fn list(&self, account: &str) -> Result<Vec<Reservation>, ReserveError> {
        Ok(self.store.list_reservations(account).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    async fn db() -> Database {
        let db = Database::new(":memory:").await.unwrap();
        db.accounts().create("alice", 0).await.unwrap();
        db.accounts().create("bob", 0).await.unwrap();
        db
    }

    #[tokio::test]
    async fn reserve_rejections() {
        let db = db().await;
        let mgr = ReservationManager::new(&db);

        assert!(matches!(
            mgr.reserve("1bad", "alice", 1).await,
            Err(ReserveError::InvalidNick(_))
        ));
        assert!(matches!(
            mgr.reserve("ALICE", "alice", 1).await,
            Err(ReserveError::OwnAccount(_))
        ));
        assert!(matches!(
            mgr.reserve("bob", "alice", 1).await,
            Err(ReserveError::Registered(_))
        ));

        mgr.reserve("alice_", "alice", 1).await.unwrap();
        assert!(matches!(
            mgr.reserve("Alice_", "alice", 1).await,
            Err(ReserveError::AlreadyYours(_))
        ));
        assert!(matches!(
            mgr.reserve("alice_", "bob", 1).await,
            Err(ReserveError::ReservedByOther(_))
        ));
    }

    #[tokio::test]
    async fn sixth_reservation_is_rejected() {
        let db = db().await;
        let mgr = ReservationManager::new(&db);
        for i in 0..MAX_RESERVATIONS {
            mgr.reserve(&format!("alice{}", i), "alice", 1).await.unwrap();
        }
        let err = mgr.reserve("alice9", "alice", 1).await.unwrap_err();
        assert!(matches!(err, ReserveError::LimitReached(5)));
        assert_eq!(mgr.list("alice").await.unwrap().len(), MAX_RESERVATIONS);
    }

    #[tokio::test]
    async fn unreserve_requires_holder_or_oper() {
        let db = db().await;
        let mgr = ReservationManager::new(&db);
        mgr.reserve("alice_", "alice", 1).await.unwrap();

        assert!(matches!(
            mgr.unreserve("alice_", "bob", false).await,
            Err(ReserveError::NotOwner(_))
        ));
        assert_eq!(mgr.unreserve("alice_", "bob", true).await.unwrap().account, "alice");
        assert!(matches!(
            mgr.unreserve("alice_", "alice", false).await,
            Err(ReserveError::NotReserved(_))
        ));
    }

    #[test]
    fn errors_read_as_replies() {
        assert_eq!(
            ReserveError::LimitReached(5).to_string(),
            "You already hold the maximum of 5 reserved nicknames."
        );
    }
}
