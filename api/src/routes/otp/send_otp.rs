use actix_web::{web, HttpRequest, HttpResponse};
use validator::Validate;

use ro_core::DomainError;
use ro_shared::{ApiResponse, RequesterKeySource};

use super::extract_client_ip;
use crate::app::AppState;
use crate::dto::SendOtpRequest;
use crate::handlers::ApiError;

/// Handler for POST /send-otp
///
/// # Request Body
///
/// ```json
/// { "email": "user@example.com" }
/// ```
///
/// # Response
///
/// `200 {"ok": true, "message": "otp_sent"}`, or an error body with one of
/// `invalid_email` (400), `rate_limited` (429), `email_failed` (502),
/// `service_unavailable` (503).
pub async fn send_otp(
    req: HttpRequest,
    state: web::Data<AppState>,
    request: web::Json<SendOtpRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = request.into_inner();
    if request.validate().is_err() {
        return Err(DomainError::invalid_identifier().into());
    }

    let requester = match state.key_source {
        RequesterKeySource::Identifier => None,
        RequesterKeySource::SourceAddress => {
            Some(extract_client_ip(&req, state.trust_forwarded_headers))
        }
    };

    let outcome = state
        .otp_service
        .issue_otp(request.email(), requester.as_deref())
        .await?;

    tracing::debug!(
        expires_at = %outcome.expires_at,
        receipt = %outcome.receipt,
        "send-otp completed"
    );

    Ok(HttpResponse::Ok().json(ApiResponse::message("otp_sent")))
}
