//! OTP lifecycle service
//!
//! Issuance runs validate, admit, generate, store, deliver in that order.
//! Verification reads the stored record, compares in constant time and
//! consumes the record exactly once on success.

mod config;
mod generator;
mod service;
mod traits;
mod types;

#[cfg(test)]
mod tests;

pub use config::OtpServiceConfig;
pub use generator::CodeGenerator;
pub use service::OtpService;
pub use traits::{DeliveryService, OtpStore, RateLimiter};
pub use types::{IssueOutcome, VerifyOutcome};
