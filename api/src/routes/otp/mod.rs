//! OTP route handlers
//!
//! - `POST /send-otp`: issue a code and email it
//! - `POST /verify-otp`: check and consume a code

pub mod send_otp;
pub mod verify_otp;

pub use send_otp::send_otp;
pub use verify_otp::verify_otp;

use actix_web::HttpRequest;

/// Extract client IP address from request
///
/// Uses the peer address of the connection. With `trust_forwarded` set, the
/// first hop of `X-Forwarded-For` and then `X-Real-IP` take precedence.
pub fn extract_client_ip(req: &HttpRequest, trust_forwarded: bool) -> String {
    if trust_forwarded {
        if let Some(ip) = forwarded_client_ip(req) {
            return ip;
        }
    }

    req.peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn forwarded_client_ip(req: &HttpRequest) -> Option<String> {
    if let Some(forwarded_for) = req.headers().get("X-Forwarded-For") {
        if let Ok(forwarded_str) = forwarded_for.to_str() {
            if let Some(ip) = forwarded_str.split(',').next() {
                let ip = ip.trim();
                if !ip.is_empty() {
                    return Some(ip.to_string());
                }
            }
        }
    }

    if let Some(real_ip) = req.headers().get("X-Real-IP") {
        if let Ok(ip_str) = real_ip.to_str() {
            let ip = ip_str.trim();
            if !ip.is_empty() {
                return Some(ip.to_string());
            }
        }
    }

    None
}
