//! Issuance rate limiters
//!
//! Both implementations admit at most `quota` issuances per requester per
//! window and reclaim state for inactive requesters.

pub mod memory_limiter;
pub mod redis_limiter;


pub use memory_limiter::MemoryRateLimiter;
pub use redis_limiter::RedisRateLimiter;

/// SHA-256 of a requester key, hex encoded
///
/// Keeps email addresses and client IPs out of Redis key names.
pub fn hash_requester(requester_key: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(requester_key.as_bytes());
    format!("{:x}", hasher.finalize())
}
