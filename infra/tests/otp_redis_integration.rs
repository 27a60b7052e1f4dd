//! Integration tests for the Redis OTP store and the full service on Redis
//!
//! Run with: cargo test -p ro_infra --test otp_redis_integration -- --ignored

use async_trait::async_trait;
use chrono::Duration;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use ro_core::{
    DeliveryService, DomainError, OsSecureRandom, OtpService, OtpServiceConfig, OtpStore,
    SystemClock,
};
use ro_infra::cache::{CacheConfig, RedisClient, RedisOtpStore};
use ro_infra::rate_limit::RedisRateLimiter;
use ro_shared::RateLimitConfig;

#[derive(Default)]
struct RecordingDelivery {
    sent: Mutex<HashMap<String, String>>,
}

#[async_trait]
impl DeliveryService for RecordingDelivery {
    async fn deliver(&self, destination: &str, code: &str) -> Result<String, String> {
        self.sent
            .lock()
            .unwrap()
            .insert(destination.to_string(), code.to_string());
        Ok("recorded".to_string())
    }
}

async fn create_client() -> Arc<RedisClient> {
    let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());
    let config = CacheConfig::new(url).with_prefix(format!("test:{}", uuid::Uuid::new_v4()));
    Arc::new(RedisClient::new(config).await.expect("Failed to create Redis client"))
}

#[tokio::test]
#[ignore] // Requires Redis to be running
async fn test_put_get_replace() {
    let store = RedisOtpStore::new(create_client().await, Arc::new(SystemClock));

    let first = store
        .put("user@example.com", "111111", Duration::seconds(300))
        .await
        .unwrap();
    assert_eq!(store.get("user@example.com").await.unwrap(), Some(first));

    store
        .put("user@example.com", "222222", Duration::seconds(300))
        .await
        .unwrap();
    let current = store.get("user@example.com").await.unwrap().unwrap();
    assert_eq!(current.code, "222222");
    assert_eq!(store.backend_name(), "external");
}

#[tokio::test]
#[ignore] // Requires Redis to be running
async fn test_delete_if_matches_is_single_use() {
    let store = RedisOtpStore::new(create_client().await, Arc::new(SystemClock));
    store
        .put("user@example.com", "123456", Duration::seconds(300))
        .await
        .unwrap();

    assert!(!store.delete_if_matches("user@example.com", "000000").await.unwrap());
    assert!(store.delete_if_matches("user@example.com", "123456").await.unwrap());
    assert!(!store.delete_if_matches("user@example.com", "123456").await.unwrap());
    assert!(store.get("user@example.com").await.unwrap().is_none());

    // Idempotent delete
    store.delete("user@example.com").await.unwrap();
}

#[tokio::test]
#[ignore] // Requires Redis to be running
async fn test_record_expires_natively() {
    let store = RedisOtpStore::new(create_client().await, Arc::new(SystemClock));
    store
        .put("user@example.com", "123456", Duration::seconds(1))
        .await
        .unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(2100)).await;
    assert!(store.get("user@example.com").await.unwrap().is_none());
}

#[tokio::test]
#[ignore] // Requires Redis to be running
async fn test_service_flow_on_redis() {
    let client = create_client().await;
    let clock = Arc::new(SystemClock);
    let delivery = Arc::new(RecordingDelivery::default());

    let service = OtpService::new(
        Arc::new(RedisOtpStore::new(client.clone(), clock.clone())),
        Arc::new(RedisRateLimiter::new(client, clock, &RateLimitConfig::new(2, 3600))),
        delivery.clone(),
        Arc::new(OsSecureRandom),
        OtpServiceConfig::default(),
    );

    service.issue_otp("user@example.com", None).await.unwrap();
    let code = delivery.sent.lock().unwrap()["user@example.com"].clone();

    assert_eq!(
        service.verify_otp("user@example.com", "not-it").await.unwrap_err(),
        DomainError::InvalidCode
    );
    service.verify_otp("user@example.com", &code).await.unwrap();
    assert_eq!(
        service.verify_otp("user@example.com", &code).await.unwrap_err(),
        DomainError::NotFoundOrExpired
    );

    service.issue_otp("user@example.com", None).await.unwrap();
    assert!(matches!(
        service.issue_otp("user@example.com", None).await,
        Err(DomainError::RateLimited { .. })
    ));
}
