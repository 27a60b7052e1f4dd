//! Cache module for OTP record storage
//!
//! Two implementations of `OtpStore`: a bounded in-process map and a Redis
//! store with native key expiry.

pub mod memory_store;
pub mod redis_client;
pub mod redis_otp_store;


pub use memory_store::MemoryOtpStore;
pub use redis_client::RedisClient;
pub use redis_otp_store::RedisOtpStore;

// Re-export commonly used types
pub use ro_shared::CacheConfig;
