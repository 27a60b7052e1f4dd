use actix_web::{web, HttpResponse};

use ro_shared::ApiResponse;

use crate::app::AppState;
use crate::dto::VerifyOtpRequest;
use crate::handlers::ApiError;

/// Handler for POST /verify-otp
///
/// # Request Body
///
/// ```json
/// { "email": "user@example.com", "otp": "012345" }
/// ```
///
/// `otp` may also be a JSON number.
///
/// # Response
///
/// `200 {"ok": true, "message": "otp_verified"}`, or an error body with one
/// of `missing_fields`, `invalid_otp`, `otp_not_found_or_expired` (all 400).
pub async fn verify_otp(
    state: web::Data<AppState>,
    request: web::Json<VerifyOtpRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = request.into_inner();
    let email = request.email.unwrap_or_default();
    let code = request
        .otp
        .map(|otp| otp.to_code(state.code_length))
        .unwrap_or_default();

    state.otp_service.verify_otp(&email, &code).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::message("otp_verified")))
}
