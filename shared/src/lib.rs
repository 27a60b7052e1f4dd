//! Shared utilities and common types for the Ruve OTP server
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types
//! - Error response structures
//! - Utility functions (email validation, log masking)
//! - Common response types

pub mod config;
pub mod errors;
pub mod types;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, CacheConfig, ConfigError, CorsConfig, DeliveryConfig, DeliveryProvider,
    Environment, LoggingConfig, OtpConfig, RateLimitConfig, RequesterKeySource, ServerConfig,
    StoreBackend, StoreConfig,
};
pub use errors::{error_codes, ErrorResponse};
pub use types::response::ApiResponse;
pub use utils::{masking, validation};
