//! Redis-backed OTP store
//!
//! Records are stored as JSON under `otp:{identifier}` with a native Redis
//! TTL, so expiry is enforced by Redis rather than re-checked here.

use async_trait::async_trait;
use chrono::Duration;
use once_cell::sync::Lazy;
use redis::Script;
use std::sync::Arc;
use tracing::{debug, error};

use ro_core::{Clock, DomainError, DomainResult, OtpRecord, OtpStore};
use ro_shared::utils::mask_email;

use crate::cache::RedisClient;
use crate::InfrastructureError;

/// Redis key prefix for OTP records
const OTP_KEY_PREFIX: &str = "otp";

/// Delete the record only if its code still equals ARGV[1]
static DELETE_IF_MATCHES: Lazy<Script> = Lazy::new(|| {
    Script::new(
        r#"
local value = redis.call('GET', KEYS[1])
if not value then
    return 0
end
local record = cjson.decode(value)
if record.code == ARGV[1] then
    redis.call('DEL', KEYS[1])
    return 1
end
return 0
"#,
    )
});

/// OTP store sharing records across instances through Redis
pub struct RedisOtpStore {
    client: Arc<RedisClient>,
    clock: Arc<dyn Clock>,
}

impl RedisOtpStore {
    pub fn new(client: Arc<RedisClient>, clock: Arc<dyn Clock>) -> Self {
        Self { client, clock }
    }

    fn record_key(&self, identifier: &str) -> String {
        self.client
            .make_key(&format!("{}:{}", OTP_KEY_PREFIX, identifier))
    }
}

#[async_trait]
impl OtpStore for RedisOtpStore {
    async fn put(&self, key: &str, code: &str, ttl: Duration) -> DomainResult<OtpRecord> {
        let record = OtpRecord::new(key, code, self.clock.now(), ttl);
        let value = serde_json::to_string(&record).map_err(InfrastructureError::from)?;
        let expiry = ttl.num_seconds().max(1) as u64;

        self.client
            .set_with_expiry(&self.record_key(key), &value, expiry)
            .await
            .map_err(|e| {
                error!(identifier = %mask_email(key), error = %e, "Failed to store OTP in Redis");
                e
            })?;

        debug!(identifier = %mask_email(key), ttl_seconds = expiry, "Stored OTP in Redis");
        Ok(record)
    }

    async fn get(&self, key: &str) -> DomainResult<Option<OtpRecord>> {
        let value = match self.client.get(&self.record_key(key)).await? {
            Some(value) => value,
            None => return Ok(None),
        };
        let record = serde_json::from_str(&value).map_err(InfrastructureError::from)?;
        Ok(Some(record))
    }

    async fn delete(&self, key: &str) -> DomainResult<()> {
        self.client.delete(&self.record_key(key)).await?;
        Ok(())
    }

    async fn delete_if_matches(&self, key: &str, code: &str) -> DomainResult<bool> {
        let deleted: i64 = self
            .client
            .run_script(
                &DELETE_IF_MATCHES,
                &[self.record_key(key)],
                &[code.to_string()],
            )
            .await?;
        Ok(deleted == 1)
    }

    fn backend_name(&self) -> &'static str {
        "external"
    }

    async fn health_check(&self) -> DomainResult<()> {
        if self.client.health_check().await? {
            Ok(())
        } else {
            Err(DomainError::ServiceUnavailable {
                message: "Redis did not answer PING".to_string(),
            })
        }
    }
}
