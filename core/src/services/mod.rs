//! Business services containing domain logic and use cases.

pub mod clock;
pub mod otp;
pub mod random;

// Re-export commonly used types
pub use clock::{Clock, ManualClock, SystemClock};
pub use otp::{
    CodeGenerator, DeliveryService, IssueOutcome, OtpService, OtpServiceConfig, OtpStore,
    RateLimiter, VerifyOutcome,
};
pub use random::{OsSecureRandom, SecureRandom, SequenceRandom};
