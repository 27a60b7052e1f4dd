//! Normalized email identifier value object.

use std::fmt;

use ro_shared::utils::{is_valid_email, mask_email, normalize_email};

use crate::errors::ValidationError;

/// A trimmed, lower-cased email address that passed the shape check
///
/// This is the key for both the OTP store and (by default) the rate limiter,
/// so `User@Example.com` and `user@example.com` share one record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailIdentifier(String);

impl EmailIdentifier {
    /// Normalize and validate a raw address
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let normalized = normalize_email(raw);
        if is_valid_email(&normalized) {
            Ok(Self(normalized))
        } else {
            Err(ValidationError::InvalidIdentifier)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Masked form for logs
    pub fn masked(&self) -> String {
        mask_email(&self.0)
    }
}

impl fmt::Display for EmailIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for EmailIdentifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
