pub mod otp;

pub use otp::{HealthResponse, OtpValue, SendOtpRequest, VerifyOtpRequest};
