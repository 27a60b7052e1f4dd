//! Mapping of domain errors onto HTTP responses
//!
//! | Category    | Status |
//! |-------------|--------|
//! | Validation  | 400    |
//! | Throttle    | 429 + `Retry-After` |
//! | State       | 400    |
//! | Delivery    | 502    |
//! | Backing     | 503    |
//! | Internal    | 500    |

use actix_web::{
    http::{header, StatusCode},
    HttpResponse, ResponseError,
};

use ro_core::DomainError;
use ro_shared::ErrorResponse;

/// Error returned by route handlers
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(error: DomainError) -> Self {
        ApiError(error)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl ApiError {
    /// Message shown to clients
    ///
    /// Dependency and internal failures get a fixed text so backend details
    /// never leave the process.
    fn public_message(&self) -> String {
        match &self.0 {
            DomainError::DeliveryFailed { .. } => {
                "Failed to send verification email. Please try again later".to_string()
            }
            DomainError::ServiceUnavailable { .. } => {
                "Service temporarily unavailable. Please try again later".to_string()
            }
            DomainError::RandomSourceUnavailable { .. } | DomainError::Internal { .. } => {
                "An internal error occurred".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match &self.0 {
            DomainError::ValidationErr(_) => StatusCode::BAD_REQUEST,
            DomainError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            DomainError::NotFoundOrExpired | DomainError::InvalidCode => StatusCode::BAD_REQUEST,
            DomainError::DeliveryFailed { .. } => StatusCode::BAD_GATEWAY,
            DomainError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            DomainError::RandomSourceUnavailable { .. } | DomainError::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self.0, code = self.0.code(), "Request failed");
        } else {
            tracing::debug!(error = %self.0, code = self.0.code(), "Request rejected");
        }

        let mut body = ErrorResponse::new(self.0.code(), self.public_message());
        let mut response = HttpResponse::build(status);

        if let Some(seconds) = self.0.retry_after() {
            body = body.with_retry_after(seconds);
            response.insert_header((header::RETRY_AFTER, seconds.to_string()));
        }

        response.json(body)
    }
}
