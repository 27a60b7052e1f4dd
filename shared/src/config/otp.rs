//! One-time passcode configuration module

use chrono::Duration;
use serde::{Deserialize, Serialize};

use super::env_parse;

/// Default number of digits in a code
pub const DEFAULT_CODE_LENGTH: usize = 6;

/// Default code lifetime in seconds (5 minutes)
pub const DEFAULT_TTL_SECONDS: u64 = 300;

/// Shortest code the service will issue
pub const MIN_CODE_LENGTH: usize = 4;

/// Longest code the service will issue (10^10 still fits in a u64 range)
pub const MAX_CODE_LENGTH: usize = 10;

/// Longest accepted code lifetime in seconds (one day)
pub const MAX_TTL_SECONDS: u64 = 86_400;

/// Code generation and lifetime settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OtpConfig {
    /// Number of digits in every issued code
    #[serde(default = "default_length")]
    pub length: usize,

    /// Lifetime of an issued code in seconds
    #[serde(default = "default_ttl_seconds")]
    pub ttl_seconds: u64,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            length: default_length(),
            ttl_seconds: default_ttl_seconds(),
        }
    }
}

impl OtpConfig {
    /// Override from `OTP_LENGTH` / `OTP_TTL_SECONDS`
    pub fn merge_env(self) -> Self {
        Self {
            length: env_parse("OTP_LENGTH").unwrap_or(self.length),
            ttl_seconds: env_parse("OTP_TTL_SECONDS").unwrap_or(self.ttl_seconds),
        }
    }

    /// Lifetime in whole minutes, rounded up (used in message bodies)
    pub fn ttl_minutes(&self) -> u64 {
        (self.ttl_seconds.min(MAX_TTL_SECONDS) + 59) / 60
    }

    /// Lifetime as a duration, clamped to [`MAX_TTL_SECONDS`]
    pub fn ttl(&self) -> Duration {
        let seconds = i64::try_from(self.ttl_seconds.min(MAX_TTL_SECONDS)).unwrap_or(0);
        Duration::seconds(seconds)
    }
}

fn default_length() -> usize {
    DEFAULT_CODE_LENGTH
}

fn default_ttl_seconds() -> u64 {
    DEFAULT_TTL_SECONDS
}
