//! # Infrastructure Layer
//!
//! Concrete implementations of the collaborator traits declared in
//! `ro_core`:
//!
//! - **Cache**: process-local bounded OTP store, Redis client and Redis OTP store
//! - **Rate limit**: local fixed-window limiter and Redis sliding-window limiter
//! - **Delivery**: Gmail API email sender and a logging sender for development
//!
//! [`create_backends`] picks the store and limiter pair from
//! `StoreBackend`, so callers never branch on the backend themselves.

use std::sync::Arc;

use ro_core::{Clock, DomainError, OtpStore, RateLimiter};
use ro_shared::{AppConfig, StoreBackend};

/// Cache module - local and Redis OTP stores
pub mod cache;

/// Email delivery module
pub mod delivery;

/// Rate limit module - local and Redis issuance throttles
pub mod rate_limit;

use cache::{MemoryOtpStore, RedisClient, RedisOtpStore};
use rate_limit::{MemoryRateLimiter, RedisRateLimiter};

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// A Redis operation did not finish within its deadline
    #[error("Cache operation timed out after {0}ms")]
    Timeout(u64),

    /// HTTP request error for external services
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Stored value could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Delivery provider rejected the request
    #[error("Delivery error: {0}")]
    Delivery(String),
}

impl From<InfrastructureError> for DomainError {
    fn from(error: InfrastructureError) -> Self {
        match error {
            InfrastructureError::Cache(_) | InfrastructureError::Timeout(_) => {
                DomainError::ServiceUnavailable {
                    message: error.to_string(),
                }
            }
            InfrastructureError::Http(_) | InfrastructureError::Delivery(_) => {
                DomainError::DeliveryFailed {
                    message: error.to_string(),
                }
            }
            InfrastructureError::Serialization(_) | InfrastructureError::Config(_) => {
                DomainError::Internal {
                    message: error.to_string(),
                }
            }
        }
    }
}

/// Store and limiter sharing one backing
#[derive(Clone)]
pub struct Backends {
    pub store: Arc<dyn OtpStore>,
    pub limiter: Arc<dyn RateLimiter>,
}

/// Build the OTP store and rate limiter selected by `config.store.backend`
///
/// The external backing connects to Redis up front and fails if it cannot.
pub async fn create_backends(
    config: &AppConfig,
    clock: Arc<dyn Clock>,
) -> Result<Backends, InfrastructureError> {
    match config.store.backend {
        StoreBackend::Local => {
            tracing::info!(
                max_entries = config.store.max_entries,
                "Using process-local OTP store and rate limiter"
            );
            Ok(Backends {
                store: Arc::new(MemoryOtpStore::new(clock.clone(), config.store.max_entries)),
                limiter: Arc::new(MemoryRateLimiter::new(
                    clock,
                    &config.rate_limit,
                    config.store.limiter_sweep_threshold,
                )),
            })
        }
        StoreBackend::External => {
            let client = Arc::new(RedisClient::new(config.cache.clone()).await?);
            tracing::info!("Using Redis OTP store and rate limiter");
            Ok(Backends {
                store: Arc::new(RedisOtpStore::new(client.clone(), clock.clone())),
                limiter: Arc::new(RedisRateLimiter::new(client, clock, &config.rate_limit)),
            })
        }
    }
}
