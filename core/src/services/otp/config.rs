//! Configuration for the OTP service

use chrono::Duration;
use ro_shared::{OtpConfig, RateLimitConfig};

use crate::domain::entities::CODE_LENGTH;

/// Configuration for the OTP service
#[derive(Debug, Clone)]
pub struct OtpServiceConfig {
    /// Digits per code
    pub code_length: usize,
    /// Record lifetime
    pub ttl: Duration,
    /// Whether issuance consults the rate limiter
    pub rate_limit_enabled: bool,
}

impl Default for OtpServiceConfig {
    fn default() -> Self {
        Self {
            code_length: CODE_LENGTH,
            ttl: OtpConfig::default().ttl(),
            rate_limit_enabled: true,
        }
    }
}

impl OtpServiceConfig {
    pub fn from_app_config(otp: &OtpConfig, rate_limit: &RateLimitConfig) -> Self {
        Self {
            code_length: otp.length,
            ttl: otp.ttl(),
            rate_limit_enabled: rate_limit.enabled,
        }
    }

    pub fn with_ttl_seconds(mut self, seconds: i64) -> Self {
        self.ttl = Duration::seconds(seconds);
        self
    }
}
