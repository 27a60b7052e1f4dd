//! Domain entities representing core business objects.

pub mod otp_record;
pub mod rate_limit_window;


// Re-export commonly used types
pub use otp_record::{OtpRecord, CODE_LENGTH, DEFAULT_TTL_SECONDS};
pub use rate_limit_window::{seconds_until, RateLimitDecision, RateLimitWindow};
