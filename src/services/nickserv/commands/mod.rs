//! NickServ command parsing and shared checks.

pub mod ghost;
pub mod help;
pub mod info;
pub mod recover;
pub mod release;
pub mod reserve;
pub mod status;

use crate::services::ServiceEffect;
use crate::services::base::ServiceBase;
use crate::services::guard::NickGuard;
use crate::services::protection;
use crate::state::Session;

/// Result of a NickServ command - a list of effects to apply.
pub type NickServResult = Vec<ServiceEffect>;

/// A parsed NickServ command. Arguments borrow from the message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NickServCommand<'a> {
    Help(Option<&'a str>),
    ShowCommands,
    Version,
    Info(&'a str),
    Reserve(&'a str),
    Unreserve(&'a str),
    ListReserve,
    Ghost(&'a str),
    Release(&'a str),
    Recover(&'a str),
    Status(&'a str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Known verb, missing argument. Carries the usage line.
    Syntax(&'static str),
    Unknown(String),
}

impl<'a> NickServCommand<'a> {
    /// Parse `VERB [arg]`. Empty input is a request for help.
    pub fn parse(text: &'a str) -> Result<Self, ParseError> {
        let mut parts = text.split_whitespace();
        let Some(verb) = parts.next() else {
            return Ok(Self::Help(None));
        };
        let arg = parts.next();
        let need = |syntax: &'static str| arg.ok_or(ParseError::Syntax(syntax));

        Ok(match verb.to_ascii_uppercase().as_str() {
            "HELP" => Self::Help(arg),
            "SHOWCOMMANDS" => Self::ShowCommands,
            "VERSION" => Self::Version,
            "LISTRESERVE" => Self::ListReserve,
            "INFO" => Self::Info(need("INFO <nick>")?),
            "RESERVE" => Self::Reserve(need("RESERVE <nick>")?),
            "UNRESERVE" => Self::Unreserve(need("UNRESERVE <nick>")?),
            "GHOST" => Self::Ghost(need("GHOST <nick>")?),
            "RELEASE" => Self::Release(need("RELEASE <nick>")?),
            "RECOVER" | "REGAIN" => Self::Recover(need("RECOVER <nick>")?),
            "STATUS" => Self::Status(need("STATUS <nick>")?),
            _ => return Err(ParseError::Unknown(verb.to_string())),
        })
    }
}

/// The sender's account, or the reply telling them to identify first.
fn require_account(guard: &NickGuard, sender: &Session) -> Result<String, NickServResult> {
    sender.account.clone().ok_or_else(|| {
        guard.error_reply(
            &sender.uid,
            &format!(
                "You must be identified to use this command. Identify via \x02{}\x02.",
                guard.config().auth_service
            ),
        )
    })
}

/// Refuse unless `account` owns `nick`.
async fn require_owner(
    guard: &NickGuard,
    sender: &Session,
    account: &str,
    nick: &str,
) -> Result<(), NickServResult> {
    if protection::account_owns(guard.store(), account, nick, guard.unix_now()).await {
        Ok(())
    } else {
        Err(guard.error_reply(
            &sender.uid,
            &format!("Access denied: \x02{}\x02 does not belong to your account.", nick),
        ))
    }
}

/// Identified sender who owns `nick`, or the refusal to send back.
async fn require_owned(
    guard: &NickGuard,
    sender: &Session,
    nick: &str,
) -> Result<String, NickServResult> {
    let account = require_account(guard, sender)?;
    require_owner(guard, sender, &account, nick).await?;
    Ok(account)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_verbs_case_insensitively() {
        assert_eq!(
            NickServCommand::parse("ghost Alice"),
            Ok(NickServCommand::Ghost("Alice"))
        );
        assert_eq!(
            NickServCommand::parse("REGAIN alice"),
            Ok(NickServCommand::Recover("alice"))
        );
        assert_eq!(
            NickServCommand::parse("help reserve"),
            Ok(NickServCommand::Help(Some("reserve")))
        );
        assert_eq!(NickServCommand::parse("   "), Ok(NickServCommand::Help(None)));
    }

    #[test]
    fn parse_errors() {
        assert_eq!(
            NickServCommand::parse("RELEASE"),
            Err(ParseError::Syntax("RELEASE <nick>"))
        );
        assert_eq!(
            NickServCommand::parse("IDENTIFY hunter2"),
            Err(ParseError::Unknown("IDENTIFY".into()))
        );
    }
}
