//! Reply helpers shared by the service's command handlers.

use super::ServiceEffect;

/// Result type for service commands - a list of effects to apply.
pub type ServiceResult = Vec<ServiceEffect>;

/// Common reply construction for a services pseudo-client.
pub trait ServiceBase {
    /// Nickname the service answers to (e.g., "NickServ").
    fn service_name(&self) -> &str;

    /// Create a single reply effect (NOTICE to user).
    fn reply_effect(&self, target_uid: &str, text: &str) -> ServiceEffect {
        ServiceEffect::Notice {
            target_uid: target_uid.to_string(),
            text: text.to_string(),
        }
    }

    /// Create multiple reply effects.
    fn reply_effects(&self, target_uid: &str, texts: Vec<&str>) -> ServiceResult {
        texts
            .into_iter()
            .map(|t| self.reply_effect(target_uid, t))
            .collect()
    }

    /// Create an error reply (single message).
    fn error_reply(&self, uid: &str, text: &str) -> ServiceResult {
        vec![self.reply_effect(uid, text)]
    }

    /// Create an unknown command reply.
    fn unknown_command(&self, uid: &str, cmd: &str) -> ServiceResult {
        self.error_reply(
            uid,
            &format!(
                "Unknown command: \x02{}\x02. Use \x02/msg {} HELP\x02 for a list of commands.",
                cmd,
                self.service_name()
            ),
        )
    }
}
