//! RELEASE command handler for NickServ.

use super::{NickServResult, require_owned};
use crate::services::base::ServiceBase;
use crate::services::guard::NickGuard;
use crate::state::Session;

/// Handle RELEASE command.
pub async fn handle_release(guard: &NickGuard, sender: &Session, nick: &str) -> NickServResult {
    let uid = sender.uid.as_str();
    let account = match require_owned(guard, sender, nick).await {
        Ok(account) => account,
        Err(reply) => return reply,
    };

    let Some(removal) = guard.release_placeholder(nick, &format!("Released by {}", sender.nick))
    else {
        return guard.error_reply(uid, &format!("\x02{}\x02 is not held by a placeholder.", nick));
    };

    vec![
        removal,
        guard.reply_effect(uid, &format!("\x02{}\x02 has been released.", nick)),
        guard.announce(format!("Placeholder on {} released by {} ({})", nick, sender.nick, account)),
    ]
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{connect, live_guard, notices, occupy};
    use super::*;
    use crate::services::ServiceEffect;

    #[tokio::test]
    async fn release_removes_placeholder() {
        let (guard, _db, _clock) = live_guard().await;
        let owner = connect(&guard, "001AAAAAA", "alice_", Some("alice")).await;
        occupy(&guard, "alice", "00XAAAAAB");

        let effects = handle_release(&guard, &owner, "alice").await;
        assert!(matches!(
            &effects[0],
            ServiceEffect::RemovePlaceholder { uid, .. } if uid == "00XAAAAAB"
        ));
        assert!(guard.dummies().is_empty());
        assert!(guard.sessions().by_nick("alice").is_none());
    }

    #[tokio::test]
    async fn release_without_placeholder() {
        let (guard, _db, _clock) = live_guard().await;
        let owner = connect(&guard, "001AAAAAA", "alice_", Some("alice")).await;
        let effects = handle_release(&guard, &owner, "alice").await;
        assert_eq!(
            notices(&effects),
            vec!["\x02alice\x02 is not held by a placeholder."]
        );
    }

    #[tokio::test]
    async fn release_requires_ownership() {
        let (guard, _db, _clock) = live_guard().await;
        occupy(&guard, "alice", "00XAAAAAB");
        let bob = connect(&guard, "001AAAAAA", "bob", Some("bob")).await;
        let effects = handle_release(&guard, &bob, "alice").await;
        assert!(notices(&effects)[0].starts_with("Access denied"));
        assert!(guard.dummies().contains("alice"));
    }
}
