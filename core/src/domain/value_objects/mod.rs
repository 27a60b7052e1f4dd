//! Value objects for the OTP domain.

pub mod email_identifier;

pub use email_identifier::EmailIdentifier;
