//! Rate limiting configuration module

use chrono::Duration;
use serde::{Deserialize, Serialize};

use super::{env_parse, env_string};

/// Longest accepted rate limit window in seconds (one week)
pub const MAX_WINDOW_SECONDS: u64 = 7 * 86_400;

/// Which request attribute identifies a requester for throttling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequesterKeySource {
    /// The normalized email address being issued to
    Identifier,
    /// The client network address
    SourceAddress,
}

impl Default for RequesterKeySource {
    fn default() -> Self {
        RequesterKeySource::Identifier
    }
}

impl std::str::FromStr for RequesterKeySource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "identifier" | "email" => Ok(RequesterKeySource::Identifier),
            "source_address" | "ip" => Ok(RequesterKeySource::SourceAddress),
            _ => Err(format!("Invalid rate limit key source: {}", s)),
        }
    }
}

/// Issuance rate limiting configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    /// Enable rate limiting
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Max admitted issuances per requester per window
    #[serde(default = "default_quota")]
    pub quota: u32,

    /// Window duration in seconds
    #[serde(default = "default_window_seconds")]
    pub window_seconds: u64,

    /// How the requester key is derived
    #[serde(default)]
    pub key_source: RequesterKeySource,

    /// Take the source address from `X-Forwarded-For` / `X-Real-IP`
    ///
    /// Only enable behind a proxy that overwrites these headers; otherwise
    /// clients can pick their own bucket.
    #[serde(default)]
    pub trust_forwarded_headers: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            quota: default_quota(),
            window_seconds: default_window_seconds(),
            key_source: RequesterKeySource::default(),
            trust_forwarded_headers: false,
        }
    }
}

impl RateLimitConfig {
    /// Create a config with the given quota and window
    pub fn new(quota: u32, window_seconds: u64) -> Self {
        Self {
            quota,
            window_seconds,
            ..Default::default()
        }
    }

    /// Window as a duration, clamped to [`MAX_WINDOW_SECONDS`]
    pub fn window(&self) -> Duration {
        let seconds = i64::try_from(self.window_seconds.min(MAX_WINDOW_SECONDS)).unwrap_or(0);
        Duration::seconds(seconds)
    }

    /// Override from `RATE_LIMIT_*` variables
    pub fn merge_env(self) -> Self {
        Self {
            enabled: env_parse("RATE_LIMIT_ENABLED").unwrap_or(self.enabled),
            quota: env_parse("RATE_LIMIT_QUOTA").unwrap_or(self.quota),
            window_seconds: env_parse("RATE_LIMIT_WINDOW_SECONDS").unwrap_or(self.window_seconds),
            key_source: env_string("RATE_LIMIT_KEY")
                .and_then(|v| v.parse().ok())
                .unwrap_or(self.key_source),
            trust_forwarded_headers: env_parse("RATE_LIMIT_TRUST_FORWARDED")
                .unwrap_or(self.trust_forwarded_headers),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_quota() -> u32 {
    6
}

fn default_window_seconds() -> u64 {
    3600  // 1 hour
}
