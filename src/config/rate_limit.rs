//! Rate limit configuration

use serde::Deserialize;
use std::net::IpAddr;

use super::error::ValidationError;

/// Fixed-window limits applied to every `/api/payments` request.
///
/// Each client IP gets `requests_per_window` requests per `window_secs`.
/// The global ceiling caps the sum of all clients per minute.
///
/// The client IP is the connecting socket address. `X-Forwarded-For` is
/// consulted only when that socket belongs to one of `trusted_proxies`
/// (comma-separated IPs, e.g. the load balancer).
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default = "default_requests_per_window")]
    pub requests_per_window: u32,

    #[serde(default = "default_window_secs")]
    pub window_secs: u32,

    #[serde(default = "default_global_requests_per_minute")]
    pub global_requests_per_minute: u32,

    pub trusted_proxies: Option<String>,
}

impl RateLimitConfig {
    /// Parsed `trusted_proxies`; empty when unset.
    pub fn trusted_proxy_list(&self) -> Result<Vec<IpAddr>, ValidationError> {
        let Some(raw) = self.trusted_proxies.as_deref() else {
            return Ok(Vec::new());
        };
        raw.split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| {
                entry
                    .parse()
                    .map_err(|_| ValidationError::InvalidTrustedProxy(entry.to_string()))
            })
            .collect()
    }

    /// Validate rate limit configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.enabled {
            return Ok(());
        }
        if self.requests_per_window == 0
            || self.window_secs == 0
            || self.global_requests_per_minute == 0
        {
            return Err(ValidationError::InvalidRateLimit);
        }
        self.trusted_proxy_list()?;
        Ok(())
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            requests_per_window: default_requests_per_window(),
            window_secs: default_window_secs(),
            global_requests_per_minute: default_global_requests_per_minute(),
            trusted_proxies: None,
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_requests_per_window() -> u32 {
    100
}

fn default_window_secs() -> u32 {
    15 * 60
}

fn default_global_requests_per_minute() -> u32 {
    10_000
}
