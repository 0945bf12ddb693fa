//! RECOVER (alias REGAIN) command handler for NickServ.
//!
//! A held nick is freed first (GHOST for a live session, RELEASE for a
//! placeholder) and the requester is switched to it after `recover_delay`,
//! giving the network time to process the removal. A free nick is taken
//! immediately.

use super::{NickServResult, require_owned};
use crate::proto::irc_eq;
use crate::services::ServiceEffect;
use crate::services::base::ServiceBase;
use crate::services::deferred::DeferredTask;
use crate::services::guard::NickGuard;
use crate::services::protection;
use crate::state::Session;
use tracing::{debug, info};

/// Handle RECOVER command.
pub async fn handle_recover(guard: &NickGuard, sender: &Session, nick: &str) -> NickServResult {
    let uid = sender.uid.as_str();
    if let Err(reply) = require_owned(guard, sender, nick).await {
        return reply;
    }

    if irc_eq(&sender.nick, nick) {
        return guard.error_reply(uid, &format!("You are already using \x02{}\x02.", nick));
    }

    let mut effects = Vec::new();
    match guard.sessions().by_nick(nick) {
        Some(holder) if holder.is_service => {
            match guard.release_placeholder(nick, &format!("Recovered by {}", sender.nick)) {
                Some(removal) => effects.push(removal),
                None => {
                    return guard.error_reply(
                        uid,
                        &format!("\x02{}\x02 is a network service and cannot be recovered.", nick),
                    );
                }
            }
        }
        Some(holder) => {
            info!(nick = %sender.nick, target = %holder.nick, target_uid = %holder.uid, "Recover requested");
            effects.push(guard.kill(&holder.uid, &format!("Recovered by {}", sender.nick)));
        }
        None => {
            if let Some(removal) =
                guard.release_placeholder(nick, &format!("Recovered by {}", sender.nick))
            {
                effects.push(removal);
            } else {
                return match guard.force_nick(uid, nick) {
                    Some(rename) => vec![
                        rename,
                        guard.reply_effect(uid, &format!("You are now using \x02{}\x02.", nick)),
                    ],
                    None => Vec::new(),
                };
            }
        }
    }

    guard.deferred().schedule(
        DeferredTask::Rename {
            uid: uid.to_string(),
            nick: nick.to_string(),
        },
        guard.now() + guard.config().recover_wait(),
    );
    effects.push(guard.reply_effect(
        uid,
        &format!(
            "\x02{}\x02 has been recovered. You will be switched to it shortly.",
            nick
        ),
    ));
    effects
}

impl NickGuard {
    /// Deferred half of RECOVER: switch `uid` onto `nick` if that still makes sense.
    pub(crate) async fn complete_recover(&self, uid: &str, nick: &str) -> Vec<ServiceEffect> {
        let Some(session) = self.sessions().get(uid) else {
            debug!(uid = %uid, nick = %nick, "Recovering session is gone");
            return Vec::new();
        };
        if irc_eq(&session.nick, nick) {
            return Vec::new();
        }

        if let Some(holder) = self.sessions().by_nick(nick)
            && holder.uid != uid
        {
            return vec![self.reply_effect(
                uid,
                &format!(
                    "\x02{}\x02 was taken again before you could be switched. Try RECOVER once more.",
                    nick
                ),
            )];
        }

        let owns = match session.account.as_deref() {
            Some(account) => {
                protection::account_owns(self.store(), account, nick, self.unix_now()).await
            }
            None => false,
        };
        if !owns {
            return vec![self.reply_effect(
                uid,
                &format!("You no longer own \x02{}\x02; not switching you to it.", nick),
            )];
        }

        self.force_nick(uid, nick).into_iter().collect()
    }
}
