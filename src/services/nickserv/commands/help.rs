//! HELP, SHOWCOMMANDS and VERSION for NickServ.

use super::NickServResult;
use crate::services::base::ServiceBase;
use crate::services::guard::NickGuard;
use crate::services::reservations::MAX_RESERVATIONS;
use crate::state::Session;

/// (verb, usage, one-line summary)
const COMMANDS: &[(&str, &str, &str)] = &[
    ("GHOST", "GHOST <nick>", "Disconnect a session using your nick"),
    ("RELEASE", "RELEASE <nick>", "Remove a placeholder holding your nick"),
    ("RECOVER", "RECOVER <nick>", "Take your nick back (alias: REGAIN)"),
    ("RESERVE", "RESERVE <nick>", "Protect an extra nick for your account"),
    ("UNRESERVE", "UNRESERVE <nick>", "Give up a reserved nick"),
    ("LISTRESERVE", "LISTRESERVE", "List your reserved nicks"),
    ("STATUS", "STATUS <nick>", "Show who is using a nick"),
    ("INFO", "INFO <nick>", "Show registration details for a nick"),
    ("SHOWCOMMANDS", "SHOWCOMMANDS", "List available commands"),
    ("VERSION", "VERSION", "Show the services version"),
    ("HELP", "HELP [command]", "Show help, optionally for one command"),
];

fn details(verb: &str) -> &'static [&'static str] {
    match verb {
        "GHOST" => &[
            "Disconnects another session that is using one of your nicknames.",
            "You cannot ghost your own session, or a session identified to your account; use RECOVER for that.",
        ],
        "RELEASE" => &[
            "Removes the placeholder services put on one of your nicknames after repeated abuse.",
        ],
        "RECOVER" | "REGAIN" => &[
            "Takes one of your nicknames back and switches you to it.",
            "Whoever holds it is disconnected, or its placeholder removed, first.",
        ],
        "RESERVE" => &[
            "Protects an additional nickname on behalf of your account.",
            "Sessions using it must identify to your account, just like your account name.",
        ],
        "UNRESERVE" => &["Removes one of your reservations."],
        "LISTRESERVE" => &["Lists the nicknames reserved by your account."],
        "STATUS" => &[
            "Shows whether a nickname is in use, which account its user is identified to,",
            "whether that account owns it, and any pending enforcement.",
        ],
        "INFO" => &["Shows registration details and reservations for a nickname's owner."],
        _ => &[],
    }
}

/// Handle HELP [command].
pub fn handle_help(guard: &NickGuard, sender: &Session, topic: Option<&str>) -> NickServResult {
    let uid = sender.uid.as_str();
    let Some(topic) = topic else {
        let mut effects = vec![
            guard.reply_effect(
                uid,
                &format!(
                    "\x02{}\x02 protects registered nicknames. Sessions using a protected nickname must identify within {} seconds.",
                    guard.service_name(),
                    guard.config().grace_period
                ),
            ),
            guard.reply_effect(uid, "Commands:"),
        ];
        effects.extend(command_lines(guard, uid));
        effects.push(guard.reply_effect(
            uid,
            &format!(
                "For more on a command, type \x02/msg {} HELP <command>\x02.",
                guard.service_name()
            ),
        ));
        return effects;
    };

    let verb = topic.to_ascii_uppercase();
    let Some((_, usage, summary)) = COMMANDS
        .iter()
        .find(|(name, ..)| *name == verb || (verb == "REGAIN" && *name == "RECOVER"))
    else {
        return guard.error_reply(uid, &format!("No help available for \x02{}\x02.", topic));
    };

    let mut effects = vec![
        guard.reply_effect(uid, &format!("Help for \x02{}\x02:", verb)),
        guard.reply_effect(uid, &format!("Syntax: {}", usage)),
        guard.reply_effect(uid, summary),
    ];
    for line in details(&verb) {
        effects.push(guard.reply_effect(uid, line));
    }
    if verb == "RESERVE" {
        effects.push(guard.reply_effect(
            uid,
            &format!("Each account may reserve up to {} nicknames.", MAX_RESERVATIONS),
        ));
    }
    effects
}

/// Handle SHOWCOMMANDS.
pub fn handle_showcommands(guard: &NickGuard, sender: &Session) -> NickServResult {
    command_lines(guard, &sender.uid)
}

/// Handle VERSION.
pub fn handle_version(guard: &NickGuard, sender: &Session) -> NickServResult {
    let version = format!(
        "{} {} - nickname protection services",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );
    vec![guard.reply_effect(&sender.uid, &version)]
}

fn command_lines(guard: &NickGuard, uid: &str) -> NickServResult {
    COMMANDS
        .iter()
        .map(|(_, usage, summary)| {
            guard.reply_effect(uid, &format!("  \x02{:<18}\x02 {}", usage, summary))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{connect, live_guard, notices};
    use super::*;

    #[tokio::test]
    async fn help_lists_every_command() {
        let (guard, _db, _clock) = live_guard().await;
        let me = connect(&guard, "001AAAAAA", "carol", None).await;
        let effects = handle_help(&guard, &me, None);
        let text = notices(&effects).join("\n");
        for (verb, ..) in COMMANDS {
            assert!(text.contains(verb), "missing {}", verb);
        }
    }

    #[tokio::test]
    async fn help_for_alias_and_unknown_topic() {
        let (guard, _db, _clock) = live_guard().await;
        let me = connect(&guard, "001AAAAAA", "carol", None).await;

        let effects = handle_help(&guard, &me, Some("regain"));
        assert!(notices(&effects)[1].contains("RECOVER <nick>"));

        let effects = handle_help(&guard, &me, Some("frobnicate"));
        assert_eq!(notices(&effects), vec!["No help available for \x02frobnicate\x02."]);
    }

    #[tokio::test]
    async fn version_names_the_package() {
        let (guard, _db, _clock) = live_guard().await;
        let me = connect(&guard, "001AAAAAA", "carol", None).await;
        let effects = handle_version(&guard, &me);
        assert!(notices(&effects)[0].starts_with("slirc-nickguard "));
    }
}
