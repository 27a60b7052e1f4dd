//! Collaborator traits for storage, throttling and delivery

use async_trait::async_trait;
use chrono::Duration;

use crate::domain::entities::{OtpRecord, RateLimitDecision};
use crate::errors::DomainResult;

/// Keyed, time-bounded storage of live codes
///
/// All operations on one key are linearizable. Backing-store outages surface
/// as `DomainError::ServiceUnavailable`.
#[async_trait]
pub trait OtpStore: Send + Sync {
    /// Store or replace the record for `key`, expiring `ttl` from now
    async fn put(&self, key: &str, code: &str, ttl: Duration) -> DomainResult<OtpRecord>;

    /// Live record for `key`; expired records are never returned
    async fn get(&self, key: &str) -> DomainResult<Option<OtpRecord>>;

    /// Remove the record for `key`, a no-op when absent
    async fn delete(&self, key: &str) -> DomainResult<()>;

    /// Atomically remove the record only if it still holds `code`
    ///
    /// Returns `false` when the record is gone, expired or was replaced in
    /// the meantime. Exactly one of several concurrent callers wins.
    async fn delete_if_matches(&self, key: &str, code: &str) -> DomainResult<bool>;

    /// Backend name for health reporting
    fn backend_name(&self) -> &'static str;

    /// Confirm the backing store answers; local stores always do
    async fn health_check(&self) -> DomainResult<()> {
        Ok(())
    }
}

/// Per-requester issuance throttle
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Count one issuance for `requester_key` if the quota allows it
    async fn consume(&self, requester_key: &str) -> DomainResult<RateLimitDecision>;
}

/// Out-of-band delivery of a code
#[async_trait]
pub trait DeliveryService: Send + Sync {
    /// Send `code` to `destination`, returning a provider receipt
    async fn deliver(&self, destination: &str, code: &str) -> Result<String, String>;
}
