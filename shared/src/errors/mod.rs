//! Shared error response structure

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Error body returned by every endpoint
///
/// `ok` is always false so clients can branch on the same field for success
/// and failure responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub ok: bool,

    /// Stable machine-readable error code
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Seconds until the request may be retried (throttling only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,

    /// Timestamp when the error occurred
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: error.into(),
            message: message.into(),
            retry_after: None,
            timestamp: Utc::now(),
        }
    }

    /// Attach a retry hint
    pub fn with_retry_after(mut self, seconds: u64) -> Self {
        self.retry_after = Some(seconds);
        self
    }
}

/// Stable error codes used across the application
pub mod error_codes {
    pub const INVALID_EMAIL: &str = "invalid_email";
    pub const MISSING_FIELDS: &str = "missing_fields";
    pub const RATE_LIMITED: &str = "rate_limited";
    pub const EMAIL_FAILED: &str = "email_failed";
    pub const OTP_NOT_FOUND_OR_EXPIRED: &str = "otp_not_found_or_expired";
    pub const INVALID_OTP: &str = "invalid_otp";
    pub const SERVICE_UNAVAILABLE: &str = "service_unavailable";
    pub const INTERNAL_ERROR: &str = "internal_error";
    pub const BAD_REQUEST: &str = "bad_request";
    pub const NOT_FOUND: &str = "not_found";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_serialization() {
        let response = ErrorResponse::new(error_codes::RATE_LIMITED, "Too many requests")
            .with_retry_after(42);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["ok"], false);
        assert_eq!(json["error"], "rate_limited");
        assert_eq!(json["retry_after"], 42);
    }

    #[test]
    fn test_retry_after_omitted_when_absent() {
        let response = ErrorResponse::new(error_codes::INVALID_OTP, "Invalid code");
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("retry_after").is_none());
    }
}
