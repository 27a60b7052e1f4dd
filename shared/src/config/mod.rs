//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `cache` - OTP store backend selection and Redis configuration
//! - `delivery` - Email delivery provider and sender credentials
//! - `environment` - Environment detection and logging configuration
//! - `otp` - Code length and lifetime
//! - `rate_limit` - Issuance throttling
//! - `server` - HTTP server and CORS configuration

pub mod cache;
pub mod delivery;
pub mod environment;
pub mod otp;
pub mod rate_limit;
pub mod server;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// Re-export commonly used types
pub use cache::{CacheConfig, StoreBackend, StoreConfig};
pub use delivery::{DeliveryConfig, DeliveryProvider, GmailCredentials};
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use otp::OtpConfig;
pub use rate_limit::{RateLimitConfig, RequesterKeySource};
pub use server::{CorsConfig, ServerConfig};

/// Configuration problems detected at startup
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Missing required setting: {0}")]
    Missing(String),
}

impl ConfigError {
    fn invalid(field: &str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    #[serde(default)]
    pub environment: Environment,

    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Code length and lifetime
    #[serde(default)]
    pub otp: OtpConfig,

    /// Issuance rate limiting
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// OTP store / rate limiter backing selection
    #[serde(default)]
    pub store: StoreConfig,

    /// Redis configuration (used by the external backend)
    #[serde(default)]
    pub cache: CacheConfig,

    /// Email delivery configuration
    #[serde(default)]
    pub delivery: DeliveryConfig,

    /// CORS configuration
    #[serde(default)]
    pub cors: CorsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let env = Environment::default();
        Self {
            environment: env,
            server: ServerConfig::default(),
            otp: OtpConfig::default(),
            rate_limit: RateLimitConfig::default(),
            store: StoreConfig::default(),
            cache: CacheConfig::default(),
            delivery: DeliveryConfig::default(),
            cors: CorsConfig::default(),
            logging: LoggingConfig::for_environment(env),
        }
    }
}

impl AppConfig {
    /// Create configuration for development environment
    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            logging: LoggingConfig::for_environment(Environment::Development),
            ..Default::default()
        }
    }

    /// Create configuration for production environment
    ///
    /// Production defaults to the shared Redis backing so that the rate limit
    /// holds across instances.
    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            store: StoreConfig {
                backend: StoreBackend::External,
                ..Default::default()
            },
            delivery: DeliveryConfig {
                provider: DeliveryProvider::Gmail,
                ..Default::default()
            },
            logging: LoggingConfig::for_environment(Environment::Production),
            ..Default::default()
        }
    }

    /// Load configuration from environment variables
    ///
    /// Starts from the preset for the detected environment and overrides each
    /// section from its own variables.
    pub fn from_env() -> Self {
        let environment = Environment::from_env();
        let mut config = match environment {
            Environment::Production => Self::production(),
            Environment::Development => Self::development(),
            Environment::Staging => {
                let mut config = Self::development();
                config.environment = Environment::Staging;
                config.logging = LoggingConfig::for_environment(Environment::Staging);
                config
            }
        };

        config.server = config.server.merge_env();
        config.otp = config.otp.merge_env();
        config.rate_limit = config.rate_limit.merge_env();
        config.store = config.store.merge_env();
        config.cache = config.cache.merge_env();
        config.delivery = config.delivery.merge_env();
        config.cors = config.cors.merge_env();
        config.logging = config.logging.merge_env();
        config
    }

    /// Reject values that would make the service misbehave
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(otp::MIN_CODE_LENGTH..=otp::MAX_CODE_LENGTH).contains(&self.otp.length) {
            return Err(ConfigError::invalid(
                "otp.length",
                format!(
                    "must be between {} and {}",
                    otp::MIN_CODE_LENGTH,
                    otp::MAX_CODE_LENGTH
                ),
            ));
        }
        if self.otp.ttl_seconds == 0 {
            return Err(ConfigError::invalid("otp.ttl_seconds", "must be positive"));
        }
        if self.otp.ttl_seconds > otp::MAX_TTL_SECONDS {
            return Err(ConfigError::invalid(
                "otp.ttl_seconds",
                format!("must be at most {}", otp::MAX_TTL_SECONDS),
            ));
        }
        if self.rate_limit.quota == 0 {
            return Err(ConfigError::invalid("rate_limit.quota", "must be positive"));
        }
        if self.rate_limit.window_seconds == 0 {
            return Err(ConfigError::invalid(
                "rate_limit.window_seconds",
                "must be positive",
            ));
        }
        if self.rate_limit.window_seconds > rate_limit::MAX_WINDOW_SECONDS {
            return Err(ConfigError::invalid(
                "rate_limit.window_seconds",
                format!("must be at most {}", rate_limit::MAX_WINDOW_SECONDS),
            ));
        }
        if self.store.backend == StoreBackend::Local && self.store.max_entries == 0 {
            return Err(ConfigError::invalid("store.max_entries", "must be positive"));
        }
        if self.delivery.provider == DeliveryProvider::Gmail {
            self.delivery.require_gmail()?;
        }
        Ok(())
    }
}

/// Read and parse an environment variable, ignoring unparsable values
pub(crate) fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// Read a non-empty environment variable
pub(crate) fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
