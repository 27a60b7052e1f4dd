//! Main OTP service implementation

use std::sync::Arc;

use ro_shared::utils::normalize_email;

use crate::domain::entities::RateLimitDecision;
use crate::domain::value_objects::EmailIdentifier;
use crate::errors::{DomainError, DomainResult};
use crate::services::clock::{Clock, SystemClock};
use crate::services::random::SecureRandom;

use super::config::OtpServiceConfig;
use super::generator::CodeGenerator;
use super::traits::{DeliveryService, OtpStore, RateLimiter};
use super::types::{IssueOutcome, VerifyOutcome};

/// OTP lifecycle service
///
/// Holds no state of its own: records live in the [`OtpStore`] and windows
/// in the [`RateLimiter`]. Cheap to share behind an `Arc`.
pub struct OtpService {
    /// Storage for live codes
    store: Arc<dyn OtpStore>,
    /// Issuance throttle
    limiter: Arc<dyn RateLimiter>,
    /// Out-of-band sender
    delivery: Arc<dyn DeliveryService>,
    generator: CodeGenerator,
    clock: Arc<dyn Clock>,
    config: OtpServiceConfig,
}

impl OtpService {
    /// Create a new OTP service
    ///
    /// # Arguments
    ///
    /// * `store` - OTP store implementation
    /// * `limiter` - Rate limiter implementation
    /// * `delivery` - Delivery implementation
    /// * `random` - Secure random source for code generation
    /// * `config` - Service configuration
    pub fn new(
        store: Arc<dyn OtpStore>,
        limiter: Arc<dyn RateLimiter>,
        delivery: Arc<dyn DeliveryService>,
        random: Arc<dyn SecureRandom>,
        config: OtpServiceConfig,
    ) -> Self {
        Self {
            store,
            limiter,
            delivery,
            generator: CodeGenerator::new(config.code_length, random),
            clock: Arc::new(SystemClock),
            config,
        }
    }

    /// Replace the clock used for verification timestamps
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &OtpServiceConfig {
        &self.config
    }

    /// Name of the configured store backend
    pub fn store_backend(&self) -> &'static str {
        self.store.backend_name()
    }

    /// Round-trip to the store backend
    pub async fn check_store(&self) -> DomainResult<()> {
        self.store.health_check().await
    }

    /// Issue a code for `identifier` and deliver it
    ///
    /// `requester_key` selects the rate-limit bucket; it defaults to the
    /// normalized identifier.
    ///
    /// # Returns
    ///
    /// * `Ok(IssueOutcome)` - The code was stored and handed to delivery
    /// * `Err(DomainError::ValidationErr)` - The identifier is malformed
    /// * `Err(DomainError::RateLimited)` - Quota exhausted, nothing stored
    /// * `Err(DomainError::DeliveryFailed)` - Stored but not delivered; the
    ///   record stays valid until it expires or is replaced
    pub async fn issue_otp(
        &self,
        identifier: &str,
        requester_key: Option<&str>,
    ) -> DomainResult<IssueOutcome> {
        let identifier = EmailIdentifier::parse(identifier).map_err(|e| {
            tracing::debug!(event = "invalid_identifier", "Rejected malformed identifier");
            DomainError::from(e)
        })?;
        let masked = identifier.masked();

        if self.config.rate_limit_enabled {
            let bucket = requester_key.unwrap_or(identifier.as_str());
            if let RateLimitDecision::Rejected { retry_after_seconds } =
                self.limiter.consume(bucket).await?
            {
                tracing::warn!(
                    identifier = %masked,
                    retry_after = retry_after_seconds,
                    event = "rate_limit_exceeded",
                    "OTP issuance rate limit exceeded"
                );
                return Err(DomainError::RateLimited { retry_after_seconds });
            }
        }

        let code = self.generator.generate().map_err(|e| {
            tracing::error!(error = %e, event = "otp_generation_failed", "Failed to generate code");
            e
        })?;

        let record = self
            .store
            .put(identifier.as_str(), &code, self.config.ttl)
            .await
            .map_err(|e| {
                tracing::error!(
                    identifier = %masked,
                    error = %e,
                    event = "otp_storage_failed",
                    "Failed to store verification code"
                );
                e
            })?;

        tracing::info!(
            identifier = %masked,
            expires_at = %record.expires_at,
            event = "otp_issued",
            "Issued new verification code"
        );

        let receipt = self
            .delivery
            .deliver(identifier.as_str(), &code)
            .await
            .map_err(|message| {
                tracing::error!(
                    identifier = %masked,
                    error = %message,
                    event = "otp_delivery_failed",
                    "Failed to deliver verification code"
                );
                DomainError::DeliveryFailed { message }
            })?;

        tracing::debug!(identifier = %masked, receipt = %receipt, event = "otp_delivered");

        Ok(IssueOutcome {
            identifier: identifier.as_str().to_string(),
            expires_at: record.expires_at,
            receipt,
        })
    }

    /// Verify `code` for `identifier`, consuming it on success
    ///
    /// A wrong code leaves the record in place. A second verification of an
    /// already consumed code fails with `NotFoundOrExpired`.
    pub async fn verify_otp(&self, identifier: &str, code: &str) -> DomainResult<VerifyOutcome> {
        let code = code.trim();
        let mut missing = Vec::new();
        if identifier.trim().is_empty() {
            missing.push("email");
        }
        if code.is_empty() {
            missing.push("otp");
        }
        if !missing.is_empty() {
            return Err(DomainError::missing_fields(missing));
        }

        // No shape check here: a malformed identifier simply has no record.
        let key = normalize_email(identifier);
        let masked = ro_shared::utils::mask_email(&key);

        let record = match self.store.get(&key).await? {
            Some(record) => record,
            None => {
                tracing::debug!(identifier = %masked, event = "otp_not_found");
                return Err(DomainError::NotFoundOrExpired);
            }
        };

        if !record.matches(code) {
            tracing::warn!(
                identifier = %masked,
                event = "otp_verification_failed",
                "Verification code mismatch"
            );
            return Err(DomainError::InvalidCode);
        }

        // Another request may have consumed or replaced the record since the
        // read above; only the caller that deletes it succeeds.
        if !self.store.delete_if_matches(&key, code).await? {
            tracing::warn!(identifier = %masked, event = "otp_consumed_concurrently");
            return Err(DomainError::NotFoundOrExpired);
        }

        tracing::info!(
            identifier = %masked,
            event = "otp_verified",
            "Verification code successfully verified"
        );

        Ok(VerifyOutcome {
            identifier: key,
            verified_at: self.clock.now(),
        })
    }

    /// Invalidate any active code for `identifier`
    pub async fn revoke(&self, identifier: &str) -> DomainResult<()> {
        let key = normalize_email(identifier);
        tracing::info!(
            identifier = %ro_shared::utils::mask_email(&key),
            event = "otp_revoked",
            "Revoking verification code"
        );
        self.store.delete(&key).await
    }
}
