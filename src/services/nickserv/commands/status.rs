//! STATUS command handler for NickServ.

use super::NickServResult;
use crate::proto::irc_eq;
use crate::services::base::ServiceBase;
use crate::services::guard::NickGuard;
use crate::services::protection;
use crate::state::Session;

/// Handle STATUS command.
pub async fn handle_status(guard: &NickGuard, sender: &Session, nick: &str) -> NickServResult {
    let uid = sender.uid.as_str();
    let owner = protection::nick_owner(guard.store(), nick).await;
    let ownership = match &owner {
        Some(owner) => format!("registered to \x02{}\x02", owner.account),
        None => "not registered".to_string(),
    };

    let Some(target) = guard.sessions().by_nick(nick) else {
        return guard.error_reply(uid, &format!("\x02{}\x02 is offline ({}).", nick, ownership));
    };

    let mut effects = vec![guard.reply_effect(
        uid,
        &format!("\x02{}\x02 is online ({}).", target.nick, ownership),
    )];

    if guard.dummies().contains(nick) {
        effects.push(guard.reply_effect(uid, "It is held by a services placeholder."));
        return effects;
    }

    let identity = match (&target.account, &owner) {
        (Some(account), Some(owner)) if irc_eq(account, &owner.account) => {
            format!("Identified as \x02{}\x02, the owner.", account)
        }
        (Some(account), Some(_)) => {
            if protection::account_owns(guard.store(), account, nick, guard.unix_now()).await {
                format!("Identified as \x02{}\x02, the owner.", account)
            } else {
                format!("Identified as \x02{}\x02, which does not own this nickname.", account)
            }
        }
        (Some(account), None) => format!("Identified as \x02{}\x02.", account),
        (None, _) => "Not identified.".to_string(),
    };
    effects.push(guard.reply_effect(uid, &identity));

    let grace = guard.config().grace();
    if let Some(remaining) = guard.tracker().remaining(&target.uid, guard.now(), grace) {
        effects.push(guard.reply_effect(
            uid,
            &format!(
                "Enforcement pending: disconnect in {} seconds unless identified.",
                remaining.as_secs()
            ),
        ));
    }
    effects
}
