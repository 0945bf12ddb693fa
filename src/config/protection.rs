//! Nickname protection configuration.
//!
//! Option names follow the long-standing services naming (`grace_period`,
//! `gline_*`) so existing deployments can carry their values over.

use serde::Deserialize;
use std::time::Duration;

/// Nickname protection and abuse escalation settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ProtectionConfig {
    /// Nickname of the service pseudo-client (default: "NickServ").
    #[serde(default = "default_service_nick")]
    pub nick: String,
    /// Where users are told to authenticate, shown in warnings (default: "NickServ").
    #[serde(default = "default_service_nick")]
    pub auth_service: String,
    /// Seconds an unauthenticated session may hold a protected nick (default: 60).
    #[serde(default = "default_grace_period")]
    pub grace_period: u64,
    /// Milliseconds between enforcement sweeps (default: 10000).
    #[serde(default = "default_check_interval")]
    pub check_interval: u64,
    /// Escalate repeated abuse to placeholder occupation (default: true).
    #[serde(default = "default_true")]
    pub gline_enabled: bool,
    /// Failed attempts per `ident@host` before escalating (default: 3).
    #[serde(default = "default_gline_attempts")]
    pub gline_attempts: u32,
    /// Seconds a placeholder holds the nick and the host stays blocked (default: 600).
    #[serde(default = "default_gline_duration")]
    pub gline_duration: u64,
    /// Backoff between occupation retries, in milliseconds (default: 1000, 2000, 3000).
    #[serde(default = "default_retry_backoff")]
    pub retry_backoff: Vec<u64>,
    /// Occupation retries before the final forced attempt (default: 3).
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Milliseconds between deferred-queue polls (default: 250).
    #[serde(default = "default_retry_poll_interval")]
    pub retry_poll_interval: u64,
    /// Milliseconds RECOVER waits for a kill to propagate before renaming (default: 1500).
    #[serde(default = "default_recover_delay")]
    pub recover_delay: u64,
    /// Channel receiving escalation announcements (default: "#services").
    #[serde(default = "default_ops_channel")]
    pub ops_channel: String,
    /// Ident of placeholder sessions.
    #[serde(default = "default_placeholder_ident")]
    pub placeholder_ident: String,
    /// Host of placeholder sessions.
    #[serde(default = "default_placeholder_host")]
    pub placeholder_host: String,
    /// Realname of placeholder sessions.
    #[serde(default = "default_placeholder_gecos")]
    pub placeholder_gecos: String,
}

impl Default for ProtectionConfig {
    fn default() -> Self {
        Self {
            nick: default_service_nick(),
            auth_service: default_service_nick(),
            grace_period: default_grace_period(),
            check_interval: default_check_interval(),
            gline_enabled: true,
            gline_attempts: default_gline_attempts(),
            gline_duration: default_gline_duration(),
            retry_backoff: default_retry_backoff(),
            max_retries: default_max_retries(),
            retry_poll_interval: default_retry_poll_interval(),
            recover_delay: default_recover_delay(),
            ops_channel: default_ops_channel(),
            placeholder_ident: default_placeholder_ident(),
            placeholder_host: default_placeholder_host(),
            placeholder_gecos: default_placeholder_gecos(),
        }
    }
}

impl ProtectionConfig {
    pub fn grace(&self) -> Duration {
        Duration::from_secs(self.grace_period)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.check_interval)
    }

    pub fn block_duration(&self) -> Duration {
        Duration::from_secs(self.gline_duration)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.retry_poll_interval)
    }

    pub fn recover_wait(&self) -> Duration {
        Duration::from_millis(self.recover_delay)
    }

    /// Delay before occupation attempt `attempt` runs.
    ///
    /// Attempts past the end of the list reuse the last entry.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let idx = (attempt as usize).min(self.retry_backoff.len().saturating_sub(1));
        Duration::from_millis(self.retry_backoff.get(idx).copied().unwrap_or(1000))
    }
}

fn default_true() -> bool {
    true
}

fn default_service_nick() -> String {
    "NickServ".to_string()
}

fn default_grace_period() -> u64 {
    60
}

fn default_check_interval() -> u64 {
    10_000
}

fn default_gline_attempts() -> u32 {
    3
}

fn default_gline_duration() -> u64 {
    600
}

fn default_retry_backoff() -> Vec<u64> {
    vec![1000, 2000, 3000]
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_poll_interval() -> u64 {
    250
}

fn default_recover_delay() -> u64 {
    1500
}

fn default_ops_channel() -> String {
    "#services".to_string()
}

fn default_placeholder_ident() -> String {
    "enforcer".to_string()
}

fn default_placeholder_host() -> String {
    "services.int".to_string()
}

fn default_placeholder_gecos() -> String {
    "Reserved nickname placeholder".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = ProtectionConfig::default();
        assert_eq!(config.grace(), Duration::from_secs(60));
        assert_eq!(config.sweep_interval(), Duration::from_secs(10));
        assert!(config.gline_enabled);
        assert_eq!(config.gline_attempts, 3);
        assert_eq!(config.block_duration(), Duration::from_secs(600));
        assert_eq!(config.max_retries, 3);
    }

    #[test]
    fn backoff_increases_then_saturates() {
        let config = ProtectionConfig::default();
        assert_eq!(config.backoff(0), Duration::from_secs(1));
        assert_eq!(config.backoff(1), Duration::from_secs(2));
        assert_eq!(config.backoff(2), Duration::from_secs(3));
        assert_eq!(config.backoff(7), Duration::from_secs(3));
    }

    #[test]
    fn backoff_with_empty_list_falls_back_to_one_second() {
        let config = ProtectionConfig {
            retry_backoff: Vec::new(),
            ..ProtectionConfig::default()
        };
        assert_eq!(config.backoff(0), Duration::from_secs(1));
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config: ProtectionConfig =
            toml::from_str("grace_period = 30\ngline_enabled = false\n").unwrap();
        assert_eq!(config.grace_period, 30);
        assert!(!config.gline_enabled);
        assert_eq!(config.check_interval, 10_000);
        assert_eq!(config.nick, "NickServ");
    }
}
