//! TS6 subset spoken to the uplink.
//!
//! Only what the protection engine consumes and produces is understood;
//! every other line is ignored.

use crate::config::Config;
use crate::error::LinkError;
use crate::proto::{Line, irc_eq};
use crate::services::{AccountBinding, LinkEvent, NewSession, ServiceEffect};
use tracing::debug;

/// Result of decoding one inbound line.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Decoded {
    pub event: Option<LinkEvent>,
    /// Line to send straight back (PONG).
    pub reply: Option<String>,
}

impl Decoded {
    fn event(event: LinkEvent) -> Self {
        Self {
            event: Some(event),
            reply: None,
        }
    }
}

/// Stateful translator between protocol lines and engine types.
pub struct Ts6Codec {
    sid: String,
    server_name: String,
    service_uid: String,
    service_nick: String,
    ops_channel: String,
    burst_complete: bool,
}

impl Ts6Codec {
    pub fn new(config: &Config, service_uid: &str) -> Self {
        Self {
            sid: config.server.sid.clone(),
            server_name: config.server.name.clone(),
            service_uid: service_uid.to_string(),
            service_nick: config.protection.nick.clone(),
            ops_channel: config.protection.ops_channel.clone(),
            burst_complete: false,
        }
    }

    /// Registration lines: credentials, our server, the service pseudo-client
    /// and its seat in the operations channel.
    pub fn handshake(&self, config: &Config, now: i64) -> Vec<String> {
        vec![
            format!("PASS {} TS 6 :{}", config.link.password, self.sid),
            "CAPAB :QS EX IE KLN UNKLN ENCAP SERVICES EUID RSFNC".to_string(),
            format!("SERVER {} 1 :{}", self.server_name, config.server.description),
            format!("SVINFO 6 6 0 :{}", now),
            format!(
                ":{} UID {} 1 {} +Sio {} {} 0 {} :{}",
                self.sid,
                self.service_nick,
                now,
                self.service_nick,
                self.server_name,
                self.service_uid,
                config.server.description
            ),
            format!(
                ":{} SJOIN {} {} +nt :@{}",
                self.sid, now, self.ops_channel, self.service_uid
            ),
        ]
    }

    pub fn decode(&mut self, raw: &str) -> Result<Decoded, LinkError> {
        let Some(line) = Line::parse(raw) else {
            return Ok(Decoded::default());
        };

        let decoded = match line.command {
            "PING" => self.decode_ping(&line),
            "EOB" => {
                self.burst_complete = true;
                Decoded::event(LinkEvent::EndOfBurst)
            }
            "ERROR" => {
                return Err(LinkError::Remote(line.arg(0).unwrap_or_default().to_string()));
            }
            "UID" => decode_uid(&line, false),
            "EUID" => decode_uid(&line, true),
            "NICK" => decode_nick(&line),
            "QUIT" => match line.source {
                Some(uid) if is_uid(uid) => Decoded::event(LinkEvent::Disconnected {
                    uid: uid.to_string(),
                }),
                _ => Decoded::default(),
            },
            "KILL" => match line.arg(0) {
                Some(uid) => Decoded::event(LinkEvent::Disconnected {
                    uid: uid.to_string(),
                }),
                None => Decoded::default(),
            },
            "ENCAP" => decode_encap(&line),
            "PRIVMSG" => self.decode_privmsg(&line),
            _ => Decoded::default(),
        };

        if decoded == Decoded::default() && !is_uninteresting(line.command) {
            debug!(line = %raw, "Ignoring line");
        }
        Ok(decoded)
    }

    /// The uplink's first PING marks the end of its burst.
    fn decode_ping(&mut self, line: &Line<'_>) -> Decoded {
        let origin = line.arg(0).unwrap_or(self.server_name.as_str());
        let reply = Some(format!(":{} PONG {} :{}", self.sid, self.server_name, origin));
        let event = if self.burst_complete {
            None
        } else {
            self.burst_complete = true;
            Some(LinkEvent::EndOfBurst)
        };
        Decoded { event, reply }
    }

    fn decode_privmsg(&self, line: &Line<'_>) -> Decoded {
        let (Some(from), Some(target), Some(text)) = (line.source, line.arg(0), line.arg(1)) else {
            return Decoded::default();
        };
        if !is_uid(from) || !self.is_service_target(target) {
            return Decoded::default();
        }
        Decoded::event(LinkEvent::ServiceMessage {
            from_uid: from.to_string(),
            text: text.to_string(),
        })
    }

    /// `NickServ`, its UID, or `NickServ@server`.
    fn is_service_target(&self, target: &str) -> bool {
        let nick = target.split_once('@').map_or(target, |(nick, _)| nick);
        target == self.service_uid || irc_eq(nick, &self.service_nick)
    }

    pub fn encode(&self, effect: &ServiceEffect) -> String {
        match effect {
            ServiceEffect::Notice { target_uid, text } => {
                format!(":{} NOTICE {} :{}", self.service_uid, target_uid, text)
            }
            ServiceEffect::Kill { target_uid, reason } => format!(
                ":{} KILL {} :{}!{} ({})",
                self.service_uid, target_uid, self.server_name, self.service_nick, reason
            ),
            ServiceEffect::IntroducePlaceholder {
                uid,
                nick,
                ident,
                host,
                gecos,
                ts,
            } => format!(
                ":{} UID {} 1 {} +iS {} {} 0 {} :{}",
                self.sid, nick, ts, ident, host, uid, gecos
            ),
            ServiceEffect::RemovePlaceholder { uid, reason } => {
                format!(":{} QUIT :{}", uid, reason)
            }
            ServiceEffect::ForceNick {
                target_uid,
                new_nick,
                new_ts,
                old_ts,
            } => format!(
                ":{} ENCAP * RSFNC {} {} {} {}",
                self.sid, target_uid, new_nick, new_ts, old_ts
            ),
            ServiceEffect::Announce { text } => {
                format!(":{} PRIVMSG {} :{}", self.service_uid, self.ops_channel, text)
            }
        }
    }
}

/// Handshake and burst noise that is expected and not worth logging.
fn is_uninteresting(command: &str) -> bool {
    matches!(
        command,
        "PASS" | "CAPAB" | "SERVER" | "SID" | "SVINFO" | "SJOIN" | "TB" | "BMASK" | "PONG"
    )
}

/// TS6 UIDs are nine characters, starting with a digit.
fn is_uid(s: &str) -> bool {
    s.len() == 9 && s.starts_with(|c: char| c.is_ascii_digit())
}

/// `UID nick hops ts umodes ident host ip uid :gecos`, and for EUID
/// `... uid realhost account :gecos`.
fn decode_uid(line: &Line<'_>, extended: bool) -> Decoded {
    let needed = if extended { 11 } else { 9 };
    if line.params.len() < needed {
        return Decoded::default();
    }
    let p = &line.params;
    let Ok(ts) = p[2].parse::<i64>() else {
        return Decoded::default();
    };
    if !is_uid(p[7]) {
        return Decoded::default();
    }

    let login = (extended && p[9] != "*").then(|| AccountBinding {
        account: p[9].to_string(),
        timestamp: ts,
        account_id: None,
    });

    Decoded::event(LinkEvent::SessionEstablished(NewSession {
        uid: p[7].to_string(),
        nick: p[0].to_string(),
        ident: p[4].to_string(),
        host: p[5].to_string(),
        is_oper: p[3].contains('o'),
        is_service: p[3].contains('S'),
        ts,
        login,
    }))
}

/// `:uid NICK newnick ts`
fn decode_nick(line: &Line<'_>) -> Decoded {
    let (Some(uid), Some(nick)) = (line.source, line.arg(0)) else {
        return Decoded::default();
    };
    if !is_uid(uid) {
        return Decoded::default();
    }
    let ts = line.arg(1).and_then(|t| t.parse().ok()).unwrap_or_default();
    Decoded::event(LinkEvent::Rename {
        uid: uid.to_string(),
        nick: nick.to_string(),
        ts,
    })
}

/// `ENCAP * SU uid [account]` from services-aware servers, or
/// `:uid ENCAP * LOGIN account`.
fn decode_encap(line: &Line<'_>) -> Decoded {
    match line.arg(1) {
        Some("SU") => match line.arg(2) {
            Some(uid) if is_uid(uid) => Decoded::event(LinkEvent::Authenticated {
                uid: uid.to_string(),
                account: line.arg(3).filter(|a| !a.is_empty()).map(str::to_string),
            }),
            _ => Decoded::default(),
        },
        Some("LOGIN") => match (line.source, line.arg(2)) {
            (Some(uid), Some(account)) if is_uid(uid) && !account.is_empty() => {
                Decoded::event(LinkEvent::Authenticated {
                    uid: uid.to_string(),
                    account: Some(account.to_string()),
                })
            }
            _ => Decoded::default(),
        },
        _ => Decoded::default(),
    }
}
