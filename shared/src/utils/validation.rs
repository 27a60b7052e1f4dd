//! Email address shape validation and normalization

use once_cell::sync::Lazy;
use regex::Regex;

/// Longest address accepted (RFC 5321 path limit)
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Local part without whitespace or `@`, domain of dot-separated non-empty labels
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@.]+(\.[^\s@.]+)+$").expect("email pattern is valid")
});

/// Trim and lower-case an address so equivalent spellings share one key
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Basic address-shape check
///
/// Accepts `local@domain.tld`: exactly one `@`, a non-empty local part with no
/// whitespace, and a domain with at least one dot and no empty labels.
pub fn is_valid_email(email: &str) -> bool {
    !email.is_empty() && email.len() <= MAX_EMAIL_LENGTH && EMAIL_REGEX.is_match(email)
}
