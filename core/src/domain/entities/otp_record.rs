//! One-time passcode record entity.

use chrono::{DateTime, Duration, Utc};
use constant_time_eq::constant_time_eq;
use serde::{Deserialize, Serialize};

/// Default number of digits in a code
pub const CODE_LENGTH: usize = ro_shared::config::otp::DEFAULT_CODE_LENGTH;

/// Default lifetime of a code in seconds (5 minutes)
pub const DEFAULT_TTL_SECONDS: u64 = ro_shared::config::otp::DEFAULT_TTL_SECONDS;

/// A live code bound to one normalized identifier
///
/// At most one record exists per `identifier_key`; storing a new one replaces
/// the previous record.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpRecord {
    /// Normalized identifier (lower-cased email), also the store key
    pub identifier_key: String,

    /// Fixed-width numeric code
    pub code: String,

    /// When the code was issued
    pub issued_at: DateTime<Utc>,

    /// `issued_at + ttl`
    pub expires_at: DateTime<Utc>,
}

impl OtpRecord {
    /// Create a record issued at `issued_at` that lives for `ttl`
    pub fn new(
        identifier_key: impl Into<String>,
        code: impl Into<String>,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            identifier_key: identifier_key.into(),
            code: code.into(),
            issued_at,
            expires_at: issued_at + ttl,
        }
    }

    /// A record is usable up to and including `expires_at`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Time left before expiry, zero once expired
    pub fn remaining_ttl(&self, now: DateTime<Utc>) -> Duration {
        let remaining = self.expires_at - now;
        if remaining < Duration::zero() {
            Duration::zero()
        } else {
            remaining
        }
    }

    /// Compare a candidate code in constant time
    pub fn matches(&self, candidate: &str) -> bool {
        self.code.len() == candidate.len()
            && constant_time_eq(self.code.as_bytes(), candidate.as_bytes())
    }
}

// The code stays out of debug output so records can be logged safely.
impl std::fmt::Debug for OtpRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OtpRecord")
            .field("identifier_key", &self.identifier_key)
            .field("code", &"******")
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
