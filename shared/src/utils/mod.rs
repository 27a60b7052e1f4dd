//! Common utility functions

pub mod masking;
pub mod validation;

// Re-export commonly used utilities
pub use masking::mask_email;
pub use validation::{is_valid_email, normalize_email};
