//! HTTP surface for the OTP service
//!
//! Exposes `POST /send-otp`, `POST /verify-otp` and `GET /_health` on top of
//! [`ro_core::OtpService`]. The binary in `main.rs` wires the configured
//! backends together; tests build the same app through [`app::create_app`].

pub mod app;
pub mod config;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;

pub use app::{create_app, AppState};
