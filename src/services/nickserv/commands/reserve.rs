//! RESERVE, UNRESERVE and LISTRESERVE command handlers for NickServ.

use super::{NickServResult, require_account};
use crate::services::base::ServiceBase;
use crate::services::guard::NickGuard;
use crate::services::reservations::{MAX_RESERVATIONS, ReservationManager};
use crate::state::Session;

/// Handle RESERVE command.
pub async fn handle_reserve(guard: &NickGuard, sender: &Session, nick: &str) -> NickServResult {
    let uid = sender.uid.as_str();
    let account = match require_account(guard, sender) {
        Ok(account) => account,
        Err(reply) => return reply,
    };

    let manager = ReservationManager::new(guard.store());
    match manager.reserve(nick, &account, guard.unix_now()).await {
        Ok(()) => {
            let mut effects = vec![guard.reply_effect(
                uid,
                &format!("\x02{}\x02 is now reserved for your account.", nick),
            )];
            // Someone may already be sitting on it
            if let Some(holder) = guard.sessions().by_nick(nick)
                && !holder.is_privileged()
                && holder.uid != sender.uid
                && guard
                    .protection(&holder.nick, holder.account.as_deref())
                    .await
                    .is_violated()
                && guard.tracker().track(&holder.uid, &holder.nick, guard.now())
            {
                effects.extend(guard.warnings(&holder.uid, &holder.nick));
            }
            effects
        }
        Err(e) => guard.error_reply(uid, &e.to_string()),
    }
}

/// Handle UNRESERVE command.
pub async fn handle_unreserve(guard: &NickGuard, sender: &Session, nick: &str) -> NickServResult {
    let uid = sender.uid.as_str();
    let account = match require_account(guard, sender) {
        Ok(account) => account,
        Err(reply) => return reply,
    };

    let manager = ReservationManager::new(guard.store());
    match manager.unreserve(nick, &account, sender.is_oper).await {
        Ok(removed) => {
            let mut effects = vec![guard.reply_effect(
                uid,
                &format!("\x02{}\x02 is no longer reserved.", removed.nickname),
            )];
            // Nothing protects it any more
            if let Some(holder) = guard.sessions().by_nick(nick)
                && guard.tracker().clear(&holder.uid)
            {
                effects.push(guard.reply_effect(
                    &holder.uid,
                    &format!("\x02{}\x02 is no longer protected; you may keep using it.", holder.nick),
                ));
            }
            effects
        }
        Err(e) => guard.error_reply(uid, &e.to_string()),
    }
}

/// Handle LISTRESERVE command.
pub async fn handle_listreserve(guard: &NickGuard, sender: &Session) -> NickServResult {
    let uid = sender.uid.as_str();
    let account = match require_account(guard, sender) {
        Ok(account) => account,
        Err(reply) => return reply,
    };

    let reservations = match ReservationManager::new(guard.store()).list(&account).await {
        Ok(reservations) => reservations,
        Err(e) => return guard.error_reply(uid, &e.to_string()),
    };

    if reservations.is_empty() {
        return guard.error_reply(uid, "You have no reserved nicknames.");
    }

    let mut effects = vec![guard.reply_effect(
        uid,
        &format!(
            "Reserved nicknames for \x02{}\x02 ({}/{}):",
            account,
            reservations.len(),
            MAX_RESERVATIONS
        ),
    )];
    for reservation in &reservations {
        effects.push(guard.reply_effect(uid, &format!("  {}", reservation.nickname)));
    }
    effects
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{connect, live_guard, notices};
    use super::*;

    #[tokio::test]
    async fn reserve_list_and_unreserve() {
        let (guard, _db, _clock) = live_guard().await;
        let me = connect(&guard, "001AAAAAA", "alice", Some("alice")).await;

        let effects = handle_reserve(&guard, &me, "alice_").await;
        assert_eq!(
            notices(&effects),
            vec!["\x02alice_\x02 is now reserved for your account."]
        );

        let effects = handle_listreserve(&guard, &me).await;
        assert_eq!(
            notices(&effects),
            vec!["Reserved nicknames for \x02alice\x02 (1/5):", "  alice_"]
        );

        let effects = handle_unreserve(&guard, &me, "alice_").await;
        assert_eq!(notices(&effects), vec!["\x02alice_\x02 is no longer reserved."]);
        let effects = handle_listreserve(&guard, &me).await;
        assert_eq!(notices(&effects), vec!["You have no reserved nicknames."]);
    }

    #[tokio::test]
    async fn reserving_occupied_nick_starts_enforcement() {
        let (guard, _db, _clock) = live_guard().await;
        let squatter = connect(&guard, "001AAAAAB", "alice_", None).await;
        assert!(!guard.tracker().contains(&squatter.uid));

        let me = connect(&guard, "001AAAAAA", "alice", Some("alice")).await;
        let effects = handle_reserve(&guard, &me, "alice_").await;
        assert!(guard.tracker().contains(&squatter.uid));
        assert!(effects.iter().any(|e| e.target() == Some("001AAAAAB")));
    }

    #[tokio::test]
    async fn unidentified_cannot_reserve() {
        let (guard, _db, _clock) = live_guard().await;
        let me = connect(&guard, "001AAAAAA", "carol", None).await;
        let effects = handle_reserve(&guard, &me, "carol_").await;
        assert!(notices(&effects)[0].starts_with("You must be identified"));
    }

    #[tokio::test]
    async fn other_account_cannot_unreserve() {
        let (guard, _db, _clock) = live_guard().await;
        let alice = connect(&guard, "001AAAAAA", "alice", Some("alice")).await;
        handle_reserve(&guard, &alice, "alice_").await;

        let bob = connect(&guard, "001AAAAAB", "bob", Some("bob")).await;
        let effects = handle_unreserve(&guard, &bob, "alice_").await;
        assert_eq!(
            notices(&effects),
            vec!["You do not hold the reservation for \x02alice_\x02."]
        );
    }
}
