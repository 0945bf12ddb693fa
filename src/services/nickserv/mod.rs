//! NickServ - nickname ownership and reclaim commands.
//!
//! Handles:
//! - GHOST <nick> - Disconnect a session using your nick
//! - RELEASE <nick> - Remove a placeholder holding your nick
//! - RECOVER|REGAIN <nick> - Take your nick back, whoever holds it
//! - RESERVE / UNRESERVE / LISTRESERVE - Manage extra protected nicks
//! - STATUS <nick> / INFO <nick> - Inspect a nickname
//! - HELP / SHOWCOMMANDS / VERSION

mod commands;

pub use commands::{NickServCommand, NickServResult, ParseError};

use super::base::ServiceBase;
use super::guard::NickGuard;
use crate::state::Session;
use tracing::debug;

/// Handle a PRIVMSG to NickServ from `sender`.
pub async fn dispatch(guard: &NickGuard, sender: &Session, text: &str) -> NickServResult {
    let command = match NickServCommand::parse(text) {
        Ok(command) => command,
        Err(ParseError::Syntax(syntax)) => {
            return guard.error_reply(&sender.uid, &format!("Syntax: {}", syntax));
        }
        Err(ParseError::Unknown(verb)) => return guard.unknown_command(&sender.uid, &verb),
    };
    debug!(uid = %sender.uid, nick = %sender.nick, command = ?command, "NickServ command");

    match command {
        NickServCommand::Help(topic) => commands::help::handle_help(guard, sender, topic),
        NickServCommand::ShowCommands => commands::help::handle_showcommands(guard, sender),
        NickServCommand::Version => commands::help::handle_version(guard, sender),
        NickServCommand::Info(nick) => commands::info::handle_info(guard, sender, nick).await,
        NickServCommand::Status(nick) => commands::status::handle_status(guard, sender, nick).await,
        NickServCommand::Reserve(nick) => {
            commands::reserve::handle_reserve(guard, sender, nick).await
        }
        NickServCommand::Unreserve(nick) => {
            commands::reserve::handle_unreserve(guard, sender, nick).await
        }
        NickServCommand::ListReserve => commands::reserve::handle_listreserve(guard, sender).await,
        NickServCommand::Ghost(nick) => commands::ghost::handle_ghost(guard, sender, nick).await,
        NickServCommand::Release(nick) => {
            commands::release::handle_release(guard, sender, nick).await
        }
        NickServCommand::Recover(nick) => {
            commands::recover::handle_recover(guard, sender, nick).await
        }
    }
}
