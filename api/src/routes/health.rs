use actix_web::{web, HttpResponse};

use crate::app::AppState;
use crate::dto::HealthResponse;

/// Handler for GET /_health
///
/// Pings the store backend; `503` with `ok: false` when it does not answer.
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    let store = state.otp_service.store_backend().to_string();

    match state.otp_service.check_store().await {
        Ok(()) => HttpResponse::Ok().json(HealthResponse { ok: true, store }),
        Err(e) => {
            tracing::warn!(error = %e, store = %store, "Store health check failed");
            HttpResponse::ServiceUnavailable().json(HealthResponse { ok: false, store })
        }
    }
}
