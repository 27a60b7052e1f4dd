//! CORS middleware configuration for cross-origin requests.
//!
//! Browsers call `/send-otp` and `/verify-otp` directly from sign-in pages,
//! so the allowed origins come from configuration. `*` allows any origin.

use actix_cors::Cors;
use actix_web::http::{header, Method};

use ro_shared::CorsConfig;

/// Creates a CORS middleware instance from `config`.
pub fn create_cors(config: &CorsConfig) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(vec![Method::GET, Method::POST, Method::OPTIONS])
        .allowed_headers(vec![
            header::ACCEPT,
            header::CONTENT_TYPE,
            header::ORIGIN,
            header::HeaderName::from_static("x-requested-with"),
        ])
        .expose_headers(vec![header::RETRY_AFTER])
        .max_age(config.max_age);

    if config.allows_any_origin() {
        cors = cors.allow_any_origin().send_wildcard();
    } else {
        for origin in &config.allowed_origins {
            tracing::debug!(origin = %origin, "Adding allowed origin");
            cors = cors.allowed_origin(origin);
        }
    }

    cors
}
