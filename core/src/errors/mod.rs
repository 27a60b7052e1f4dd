//! Domain-specific error types and error handling.
//!
//! Every failure of the OTP lifecycle maps to exactly one [`DomainError`]
//! variant, one stable machine code and one [`ErrorCategory`].

use ro_shared::error_codes;
use thiserror::Error;


/// Input validation errors
///
/// Always recoverable: the caller corrects the input and retries.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid email address")]
    InvalidIdentifier,

    #[error("Missing required fields: {}", fields.join(", "))]
    MissingFields { fields: Vec<String> },
}

/// Broad class of a failure, used by callers to decide how to react
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Malformed input, fix and resend
    Validation,
    /// Throttled, retry after the advertised delay
    Throttle,
    /// No usable code, request a new one
    State,
    /// A collaborator failed, the same operation may succeed on retry
    Dependency,
    /// Unexpected or fatal condition
    Internal,
}

/// Core domain errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error(transparent)]
    ValidationErr(#[from] ValidationError),

    #[error("Too many requests. Please try again in {retry_after_seconds} seconds")]
    RateLimited { retry_after_seconds: u64 },

    #[error("No active verification code, or it has expired")]
    NotFoundOrExpired,

    #[error("Invalid verification code")]
    InvalidCode,

    #[error("Failed to deliver verification code: {message}")]
    DeliveryFailed { message: String },

    #[error("Backing service unavailable: {message}")]
    ServiceUnavailable { message: String },

    #[error("Secure random source unavailable: {message}")]
    RandomSourceUnavailable { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    /// Shorthand for an invalid identifier
    pub fn invalid_identifier() -> Self {
        DomainError::ValidationErr(ValidationError::InvalidIdentifier)
    }

    /// Shorthand for missing request fields
    pub fn missing_fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        DomainError::ValidationErr(ValidationError::MissingFields {
            fields: fields.into_iter().map(Into::into).collect(),
        })
    }

    /// Stable machine-readable code for this error
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::ValidationErr(ValidationError::InvalidIdentifier) => {
                error_codes::INVALID_EMAIL
            }
            DomainError::ValidationErr(ValidationError::MissingFields { .. }) => {
                error_codes::MISSING_FIELDS
            }
            DomainError::RateLimited { .. } => error_codes::RATE_LIMITED,
            DomainError::NotFoundOrExpired => error_codes::OTP_NOT_FOUND_OR_EXPIRED,
            DomainError::InvalidCode => error_codes::INVALID_OTP,
            DomainError::DeliveryFailed { .. } => error_codes::EMAIL_FAILED,
            DomainError::ServiceUnavailable { .. } => error_codes::SERVICE_UNAVAILABLE,
            DomainError::RandomSourceUnavailable { .. } | DomainError::Internal { .. } => {
                error_codes::INTERNAL_ERROR
            }
        }
    }

    /// Taxonomy class of this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            DomainError::ValidationErr(_) => ErrorCategory::Validation,
            DomainError::RateLimited { .. } => ErrorCategory::Throttle,
            DomainError::NotFoundOrExpired | DomainError::InvalidCode => ErrorCategory::State,
            DomainError::DeliveryFailed { .. } | DomainError::ServiceUnavailable { .. } => {
                ErrorCategory::Dependency
            }
            DomainError::RandomSourceUnavailable { .. } | DomainError::Internal { .. } => {
                ErrorCategory::Internal
            }
        }
    }

    /// Whether repeating the same request later may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Throttle | ErrorCategory::Dependency
        )
    }

    /// Seconds to wait before retrying, for throttled requests
    pub fn retry_after(&self) -> Option<u64> {
        match self {
            DomainError::RateLimited { retry_after_seconds } => Some(*retry_after_seconds),
            _ => None,
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
