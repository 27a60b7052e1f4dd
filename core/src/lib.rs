//! # Ruve OTP Core
//!
//! The one-time passcode lifecycle engine: code generation, time-bounded
//! storage, rate-limited issuance and single-use verification.
//!
//! Storage, throttling and delivery are collaborator traits
//! ([`OtpStore`], [`RateLimiter`], [`DeliveryService`]) so the same
//! [`OtpService`] runs against process-local maps, a shared Redis, or test
//! doubles.

pub mod domain;
pub mod errors;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use services::*;
