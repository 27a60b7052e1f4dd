//! Route registration

pub mod health;
pub mod otp;

use actix_web::web;

/// Register every endpoint on `cfg`
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/_health", web::get().to(health::health))
        .route("/send-otp", web::post().to(otp::send_otp))
        .route("/verify-otp", web::post().to(otp::verify_otp));
}
