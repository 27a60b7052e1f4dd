//! Application state and factory
//!
//! This module holds the state shared by all workers and builds the
//! Actix-web application around it.

use std::sync::Arc;

use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    error::InternalError,
    web, App, HttpResponse,
};
use tracing_actix_web::TracingLogger;

use ro_core::OtpService;
use ro_shared::{error_codes, AppConfig, ErrorResponse, RequesterKeySource};

use crate::middleware::create_cors;
use crate::routes;

/// Application state shared by every worker
pub struct AppState {
    pub otp_service: Arc<OtpService>,
    /// Which request attribute selects the rate-limit bucket
    pub key_source: RequesterKeySource,
    /// Whether forwarded-for headers name the source address
    pub trust_forwarded_headers: bool,
    /// Code width, used to left-pad numeric `otp` values
    pub code_length: usize,
}

impl AppState {
    pub fn new(otp_service: Arc<OtpService>, config: &AppConfig) -> Self {
        Self {
            code_length: otp_service.config().code_length,
            otp_service,
            key_source: config.rate_limit.key_source,
            trust_forwarded_headers: config.rate_limit.trust_forwarded_headers,
        }
    }
}

/// Create and configure the application
///
/// `TracingLogger` is registered last so it is the outermost layer and its
/// span also covers requests answered by CORS.
pub fn create_app(
    state: web::Data<AppState>,
    config: &AppConfig,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let json_config = web::JsonConfig::default()
        .limit(config.server.max_payload_size)
        .error_handler(|err, _req| {
            tracing::debug!(error = %err, event = "malformed_request_body");
            let response = HttpResponse::BadRequest()
                .json(ErrorResponse::new(error_codes::BAD_REQUEST, err.to_string()));
            InternalError::from_response(err, response).into()
        });

    App::new()
        .app_data(state)
        .app_data(json_config)
        .wrap(create_cors(&config.cors))
        .wrap(TracingLogger::default())
        .configure(routes::configure)
        .default_service(web::route().to(not_found))
}

/// Default 404 handler
async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse::new(
        error_codes::NOT_FOUND,
        "The requested resource was not found",
    ))
}
