//! Nickname protection resolution.
//!
//! A nickname is protected when it is an account's primary name or a
//! reservation. Lookup failures degrade the way an operator would expect:
//! a failed exemption lookup enforces, a failed ownership lookup does not
//! grant ownership.

use crate::db::NickStore;
use crate::proto::irc_eq;
use tracing::warn;

/// How a nickname came to be owned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerKind {
    Registration,
    Reservation,
}

/// The account a nickname belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NickOwner {
    pub account: String,
    pub kind: OwnerKind,
}

/// Outcome of checking a session's nickname against its bound account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Protection {
    /// Not registered, not reserved, or the owner opted out.
    Unprotected,
    /// Protected and the bound account owns it.
    Owned { owner: String },
    /// Protected and the session is not authenticated as the owner.
    Violated { owner: String },
}

impl Protection {
    pub fn is_violated(&self) -> bool {
        matches!(self, Self::Violated { .. })
    }
}

/// Owner of `nick`, by primary registration first, then reservation.
pub async fn nick_owner(store: &dyn NickStore, nick: &str) -> Option<NickOwner> {
    match store.find_account(nick).await {
        Ok(Some(account)) => {
            return Some(NickOwner {
                account: account.name,
                kind: OwnerKind::Registration,
            });
        }
        Ok(None) => {}
        Err(e) => warn!(nick = %nick, error = %e, "Registration lookup failed"),
    }

    match store.find_reservation(nick).await {
        Ok(Some(reservation)) => Some(NickOwner {
            account: reservation.account,
            kind: OwnerKind::Reservation,
        }),
        Ok(None) => None,
        Err(e) => {
            warn!(nick = %nick, error = %e, "Reservation lookup failed");
            None
        }
    }
}

/// Whether `account` owns `nick`, directly or through a reservation.
///
/// A reservation match records the reservation as seen.
pub async fn account_owns(store: &dyn NickStore, account: &str, nick: &str, now: i64) -> bool {
    if irc_eq(account, nick) {
        match store.find_account(nick).await {
            Ok(Some(_)) => return true,
            Ok(None) => {}
            Err(e) => warn!(nick = %nick, error = %e, "Registration lookup failed"),
        }
    }

    match store.find_reservation(nick).await {
        Ok(Some(reservation)) if irc_eq(&reservation.account, account) => {
            if let Err(e) = store.touch_reservation(nick, now).await {
                warn!(nick = %nick, error = %e, "Failed to touch reservation");
            }
            true
        }
        Ok(_) => false,
        Err(e) => {
            warn!(nick = %nick, account = %account, error = %e, "Reservation ownership check failed");
            false
        }
    }
}

/// Resolve whether a session holding `nick` with `account` bound must be enforced.
pub async fn resolve(
    store: &dyn NickStore,
    nick: &str,
    account: Option<&str>,
    now: i64,
) -> Protection {
    let Some(owner) = nick_owner(store, nick).await else {
        return Protection::Unprotected;
    };

    match store.is_protection_exempt(&owner.account).await {
        Ok(true) => return Protection::Unprotected,
        Ok(false) => {}
        Err(e) => {
            warn!(account = %owner.account, error = %e, "Exemption lookup failed, enforcing");
        }
    }

    match account {
        Some(account) if account_owns(store, account, nick, now).await => Protection::Owned {
            owner: owner.account,
        },
        _ => Protection::Violated {
            owner: owner.account,
        },
    }
}
