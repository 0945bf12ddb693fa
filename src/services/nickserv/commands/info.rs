//! INFO command handler for NickServ.

use super::NickServResult;
use crate::services::base::ServiceBase;
use crate::services::guard::NickGuard;
use crate::services::protection::{self, OwnerKind};
use crate::state::Session;
use tracing::debug;

fn format_time(ts: i64) -> String {
    chrono::DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "Unknown".to_string())
}

/// Handle INFO command.
pub async fn handle_info(guard: &NickGuard, sender: &Session, nick: &str) -> NickServResult {
    let uid = sender.uid.as_str();
    let Some(owner) = protection::nick_owner(guard.store(), nick).await else {
        return guard.error_reply(uid, &format!("\x02{}\x02 is not registered.", nick));
    };

    let account = match guard.store().find_account(&owner.account).await {
        Ok(Some(account)) => account,
        Ok(None) => {
            return guard.error_reply(uid, &format!("\x02{}\x02 is not registered.", nick));
        }
        Err(e) => {
            debug!(nick = %nick, error = ?e, "INFO lookup failed");
            return guard.error_reply(uid, "Failed to retrieve account information.");
        }
    };

    let mut effects = vec![guard.reply_effect(uid, &format!("Information on \x02{}\x02:", nick))];
    if owner.kind == OwnerKind::Reservation {
        effects.push(guard.reply_effect(
            uid,
            &format!("  Reserved by: {}", account.name),
        ));
    } else {
        effects.push(guard.reply_effect(uid, &format!("  Account:     {}", account.name)));
    }
    effects.push(guard.reply_effect(
        uid,
        &format!("  Registered:  {}", format_time(account.registered_at)),
    ));
    effects.push(guard.reply_effect(
        uid,
        &format!("  Last seen:   {}", format_time(account.last_seen_at)),
    ));
    if account.noprotect {
        effects.push(guard.reply_effect(uid, "  Options:     NOPROTECT"));
    }

    match guard.store().list_reservations(&account.name).await {
        Ok(reservations) if !reservations.is_empty() => {
            let nicks: Vec<&str> = reservations.iter().map(|r| r.nickname.as_str()).collect();
            effects.push(guard.reply_effect(
                uid,
                &format!("  Reserved:    {}", nicks.join(", ")),
            ));
        }
        Ok(_) => {}
        Err(e) => debug!(account = %account.name, error = ?e, "Reservation listing failed"),
    }

    effects
}
