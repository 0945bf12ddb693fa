//! GHOST command handler for NickServ.

use super::{NickServResult, require_owned};
use crate::proto::irc_eq;
use crate::services::base::ServiceBase;
use crate::services::guard::NickGuard;
use crate::state::Session;
use tracing::info;

/// Handle GHOST command.
pub async fn handle_ghost(guard: &NickGuard, sender: &Session, target_nick: &str) -> NickServResult {
    let uid = sender.uid.as_str();
    let account = match require_owned(guard, sender, target_nick).await {
        Ok(account) => account,
        Err(reply) => return reply,
    };

    let Some(target) = guard.sessions().by_nick(target_nick) else {
        return guard.error_reply(uid, &format!("\x02{}\x02 is not online.", target_nick));
    };

    if target.uid == sender.uid {
        return guard.error_reply(uid, "You cannot ghost yourself.");
    }

    if target.is_service {
        let hint = if guard.dummies().contains(target_nick) {
            format!(
                "\x02{}\x02 is held by a placeholder. Use \x02RELEASE\x02 or \x02RECOVER\x02 instead.",
                target_nick
            )
        } else {
            format!("\x02{}\x02 is a network service and cannot be ghosted.", target_nick)
        };
        return guard.error_reply(uid, &hint);
    }

    if target
        .account
        .as_deref()
        .is_some_and(|a| irc_eq(a, &account))
    {
        return guard.error_reply(
            uid,
            &format!(
                "\x02{}\x02 is identified to your account. Use \x02RECOVER\x02 to take it over.",
                target_nick
            ),
        );
    }

    info!(nick = %sender.nick, target = %target.nick, target_uid = %target.uid, "Ghost requested");
    vec![
        guard.kill(&target.uid, &format!("Ghosted by {}", sender.nick)),
        guard.reply_effect(uid, &format!("\x02{}\x02 has been ghosted.", target.nick)),
    ]
}
