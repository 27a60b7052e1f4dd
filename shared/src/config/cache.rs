//! Store backend and Redis cache configuration module

use serde::{Deserialize, Serialize};

use super::{env_parse, env_string};

/// Backing used by the OTP store and the rate limiter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process-local bounded maps (single instance)
    Local,
    /// Shared Redis with native key expiry (multi instance)
    External,
}

impl Default for StoreBackend {
    fn default() -> Self {
        StoreBackend::Local
    }
}

impl std::fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreBackend::Local => write!(f, "local"),
            StoreBackend::External => write!(f, "external"),
        }
    }
}

impl std::str::FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" | "memory" => Ok(StoreBackend::Local),
            "external" | "redis" => Ok(StoreBackend::External),
            _ => Err(format!("Invalid store backend: {}", s)),
        }
    }
}

/// Store selection and local-backing limits
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    /// Selected backend
    #[serde(default)]
    pub backend: StoreBackend,

    /// Maximum live records held by the local OTP store
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    /// Local limiter table size that triggers a sweep of elapsed windows
    #[serde(default = "default_sweep_threshold")]
    pub limiter_sweep_threshold: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            max_entries: default_max_entries(),
            limiter_sweep_threshold: default_sweep_threshold(),
        }
    }
}

impl StoreConfig {
    /// Override from `STORE_BACKEND` / `LOCAL_STORE_MAX_ENTRIES`
    pub fn merge_env(self) -> Self {
        Self {
            backend: env_string("STORE_BACKEND")
                .and_then(|v| v.parse().ok())
                .unwrap_or(self.backend),
            max_entries: env_parse("LOCAL_STORE_MAX_ENTRIES").unwrap_or(self.max_entries),
            limiter_sweep_threshold: self.limiter_sweep_threshold,
        }
    }
}

/// Redis cache configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Redis connection URL
    #[serde(default = "default_url")]
    pub url: String,

    /// Connection timeout in seconds
    #[serde(default = "default_connection_timeout")]
    pub connection_timeout: u64,

    /// Upper bound for a single Redis operation in milliseconds
    #[serde(default = "default_operation_timeout_ms")]
    pub operation_timeout_ms: u64,

    /// Retries for I/O-class failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay between retries in milliseconds
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Prefix prepended to every key
    #[serde(default)]
    pub key_prefix: Option<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            connection_timeout: default_connection_timeout(),
            operation_timeout_ms: default_operation_timeout_ms(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            key_prefix: None,
        }
    }
}

impl CacheConfig {
    /// Create a new cache configuration with URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Override from `REDIS_*` variables
    pub fn merge_env(self) -> Self {
        Self {
            url: env_string("REDIS_URL").unwrap_or(self.url),
            operation_timeout_ms: env_parse("REDIS_OPERATION_TIMEOUT_MS")
                .unwrap_or(self.operation_timeout_ms),
            key_prefix: env_string("REDIS_KEY_PREFIX").or(self.key_prefix),
            ..self
        }
    }

    /// Set the key prefix for all cache keys
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }

    /// Generate a cache key with prefix
    pub fn make_key(&self, key: &str) -> String {
        match &self.key_prefix {
            Some(prefix) => format!("{}:{}", prefix, key),
            None => key.to_string(),
        }
    }
}

fn default_url() -> String {
    String::from("redis://localhost:6379")
}

fn default_connection_timeout() -> u64 {
    5
}

fn default_operation_timeout_ms() -> u64 {
    2000
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    100
}

fn default_max_entries() -> usize {
    100_000
}

fn default_sweep_threshold() -> usize {
    10_000
}
