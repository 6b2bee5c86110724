//! Client configuration

use std::time::Duration;

use crate::{ClientError, ClientResult};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const LIVE_PATH: &str = "/api/ws/orders/live";

/// Live order client configuration
#[derive(Debug, Clone)]
pub struct LiveClientConfig {
    /// Server base URL (e.g., "http://localhost:8000")
    pub base_url: String,

    /// Delay before the first reconnect attempt, doubled on each failure
    pub reconnect_delay: Duration,

    /// Upper bound for the reconnect delay
    pub max_reconnect_delay: Duration,

    /// Consecutive reconnect attempts before giving up (0 = unlimited)
    pub max_reconnect_attempts: u32,

    /// Interval of the client `ping` keepalive
    pub ping_interval: Duration,

    /// Timeout for REST requests
    pub request_timeout: Duration,
}

impl LiveClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            reconnect_delay: Duration::from_secs(5),
            max_reconnect_delay: Duration::from_secs(60),
            max_reconnect_attempts: 5,
            ping_interval: Duration::from_secs(30),
            request_timeout: Duration::from_secs(30),
        }
    }

    /// Read `QR_API_URL` and the `WS_RECONNECT_*` knobs, keeping defaults for unset values
    pub fn from_env() -> Self {
        let base_url = std::env::var("QR_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());
        let mut config = Self::new(base_url);

        if let Some(secs) = env_u64("WS_RECONNECT_BASE_SECS") {
            config.reconnect_delay = Duration::from_secs(secs);
        }
        if let Some(secs) = env_u64("WS_RECONNECT_MAX_SECS") {
            config.max_reconnect_delay = Duration::from_secs(secs);
        }
        if let Some(attempts) = env_u64("WS_RECONNECT_MAX_ATTEMPTS") {
            config.max_reconnect_attempts = u32::try_from(attempts).unwrap_or(u32::MAX);
        }
        config
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    pub fn with_max_reconnect_delay(mut self, delay: Duration) -> Self {
        self.max_reconnect_delay = delay;
        self
    }

    pub fn with_max_reconnect_attempts(mut self, attempts: u32) -> Self {
        self.max_reconnect_attempts = attempts;
        self
    }

    pub fn with_ping_interval(mut self, interval: Duration) -> Self {
        self.ping_interval = interval;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Delay before reconnect attempt `attempt` (1-based): `base * 2^(attempt-1)`, capped
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = 1u32
            .checked_shl(attempt.saturating_sub(1))
            .unwrap_or(u32::MAX);
        self.reconnect_delay
            .saturating_mul(factor)
            .min(self.max_reconnect_delay)
    }

    /// Whether `attempts` consecutive failures exhaust the retry budget
    pub fn attempts_exhausted(&self, attempts: u32) -> bool {
        self.max_reconnect_attempts != 0 && attempts >= self.max_reconnect_attempts
    }

    /// `ws(s)://host/api/ws/orders/live?token=...`
    pub fn live_url(&self, token: &str) -> ClientResult<String> {
        let base = self.base_url.trim_end_matches('/');
        let ws_base = if let Some(rest) = base.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = base.strip_prefix("http://") {
            format!("ws://{rest}")
        } else if base.starts_with("ws://") || base.starts_with("wss://") {
            base.to_string()
        } else {
            return Err(ClientError::InvalidUrl(self.base_url.clone()));
        };
        Ok(format!("{ws_base}{LIVE_PATH}?token={token}"))
    }
}

impl Default for LiveClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

fn env_u64(name: &str) -> Option<u64> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_then_caps() {
        let config = LiveClientConfig::default();
        assert_eq!(config.backoff_delay(1), Duration::from_secs(5));
        assert_eq!(config.backoff_delay(2), Duration::from_secs(10));
        assert_eq!(config.backoff_delay(3), Duration::from_secs(20));
        assert_eq!(config.backoff_delay(4), Duration::from_secs(40));
        assert_eq!(config.backoff_delay(5), Duration::from_secs(60));
        assert_eq!(config.backoff_delay(40), Duration::from_secs(60));
        // attempt 0 is treated as the first
        assert_eq!(config.backoff_delay(0), Duration::from_secs(5));
    }

    #[test]
    fn test_attempt_budget() {
        let config = LiveClientConfig::default();
        assert!(!config.attempts_exhausted(4));
        assert!(config.attempts_exhausted(5));

        let unlimited = config.with_max_reconnect_attempts(0);
        assert!(!unlimited.attempts_exhausted(1_000));
    }

    #[test]
    fn test_live_url() {
        let url = LiveClientConfig::new("https://api.example.com/")
            .live_url("abc.def")
            .unwrap();
        assert_eq!(url, "wss://api.example.com/api/ws/orders/live?token=abc.def");

        let url = LiveClientConfig::new("http://127.0.0.1:8000")
            .live_url("t")
            .unwrap();
        assert_eq!(url, "ws://127.0.0.1:8000/api/ws/orders/live?token=t");

        assert!(matches!(
            LiveClientConfig::new("ftp://nope").live_url("t"),
            Err(ClientError::InvalidUrl(_))
        ));
    }
}
