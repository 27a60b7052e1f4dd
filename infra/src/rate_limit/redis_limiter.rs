//! Redis-based sliding-window rate limiter

use async_trait::async_trait;
use once_cell::sync::Lazy;
use redis::Script;
use std::sync::Arc;
use tracing::debug;

use ro_core::{Clock, DomainError, DomainResult, RateLimitDecision, RateLimiter};
use ro_shared::RateLimitConfig;

use super::hash_requester;
use crate::cache::RedisClient;

/// Redis key prefix for issuance windows
const RATE_LIMIT_KEY_PREFIX: &str = "rate_limit:otp";

/// Sliding window over a sorted set of admission timestamps
///
/// KEYS[1] window key; ARGV: now_ms, window_ms, quota, member.
/// Returns `{1, remaining}` when admitted, `{0, retry_after_ms}` otherwise.
static SLIDING_WINDOW: Lazy<Script> = Lazy::new(|| {
    Script::new(
        r#"
local now = tonumber(ARGV[1])
local window = tonumber(ARGV[2])
local quota = tonumber(ARGV[3])
redis.call('ZREMRANGEBYSCORE', KEYS[1], '-inf', now - window)
local count = redis.call('ZCARD', KEYS[1])
if count < quota then
    redis.call('ZADD', KEYS[1], now, ARGV[4])
    redis.call('PEXPIRE', KEYS[1], window)
    return {1, quota - count - 1}
end
local oldest = redis.call('ZRANGE', KEYS[1], 0, 0, 'WITHSCORES')
local retry = window
if oldest[2] then
    retry = tonumber(oldest[2]) + window - now
end
return {0, retry}
"#,
    )
});

/// Limiter shared by all instances through Redis
///
/// The whole check-and-record step runs as one script, so concurrent
/// requests cannot both take the last slot. The key expires with the window,
/// which reclaims inactive requesters.
pub struct RedisRateLimiter {
    client: Arc<RedisClient>,
    clock: Arc<dyn Clock>,
    quota: u32,
    window_ms: i64,
}

impl RedisRateLimiter {
    pub fn new(client: Arc<RedisClient>, clock: Arc<dyn Clock>, config: &RateLimitConfig) -> Self {
        Self {
            client,
            clock,
            quota: config.quota,
            window_ms: config.window().num_milliseconds(),
        }
    }

    fn window_key(&self, requester_key: &str) -> String {
        self.client.make_key(&format!(
            "{}:{}",
            RATE_LIMIT_KEY_PREFIX,
            hash_requester(requester_key)
        ))
    }
}

#[async_trait]
impl RateLimiter for RedisRateLimiter {
    async fn consume(&self, requester_key: &str) -> DomainResult<RateLimitDecision> {
        let now_ms = self.clock.now().timestamp_millis();
        let member = format!("{}-{}", now_ms, uuid::Uuid::new_v4());

        let reply: Vec<i64> = self
            .client
            .run_script(
                &SLIDING_WINDOW,
                &[self.window_key(requester_key)],
                &[
                    now_ms.to_string(),
                    self.window_ms.to_string(),
                    self.quota.to_string(),
                    member,
                ],
            )
            .await?;

        let decision = match reply.as_slice() {
            [1, remaining] => RateLimitDecision::Admitted {
                remaining: (*remaining).max(0) as u32,
            },
            [0, retry_ms] => RateLimitDecision::Rejected {
                retry_after_seconds: retry_after_seconds(*retry_ms),
            },
            other => {
                return Err(DomainError::Internal {
                    message: format!("unexpected rate limit reply: {:?}", other),
                })
            }
        };

        debug!(admitted = decision.is_admitted(), "Checked Redis rate limit");
        Ok(decision)
    }
}

/// Milliseconds to whole seconds, rounded up, at least one
pub(crate) fn retry_after_seconds(retry_ms: i64) -> u64 {
    ((retry_ms.max(1) + 999) / 1000) as u64
}
