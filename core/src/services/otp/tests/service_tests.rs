//! Unit tests for the OTP service

use chrono::{Duration, TimeZone, Utc};
use std::sync::Arc;

use crate::errors::{DomainError, ValidationError};
use crate::services::clock::{Clock, ManualClock};
use crate::services::otp::{OtpService, OtpServiceConfig, OtpStore};
use crate::services::random::{OsSecureRandom, SecureRandom, SequenceRandom};

use super::mocks::{MockDeliveryService, MockOtpStore, MockRateLimiter};

struct Harness {
    service: Arc<OtpService>,
    store: Arc<MockOtpStore>,
    limiter: Arc<MockRateLimiter>,
    delivery: Arc<MockDeliveryService>,
    clock: Arc<ManualClock>,
}

fn harness_with(
    random: Arc<dyn SecureRandom>,
    config: OtpServiceConfig,
    store_fails: bool,
    delivery_fails: bool,
) -> Harness {
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap(),
    ));
    let store = Arc::new(MockOtpStore::new(clock.clone(), store_fails));
    let limiter = Arc::new(MockRateLimiter::new(clock.clone(), 6, 3600));
    let delivery = Arc::new(MockDeliveryService::new(delivery_fails));

    let service = OtpService::new(
        store.clone(),
        limiter.clone(),
        delivery.clone(),
        random,
        config,
    )
    .with_clock(clock.clone());

    Harness {
        service: Arc::new(service),
        store,
        limiter,
        delivery,
        clock,
    }
}

fn harness() -> Harness {
    harness_with(
        Arc::new(OsSecureRandom),
        OtpServiceConfig::default(),
        false,
        false,
    )
}

#[tokio::test]
async fn test_issue_otp_success() {
    let h = harness();

    let outcome = h.service.issue_otp("user@example.com", None).await.unwrap();
    assert_eq!(outcome.identifier, "user@example.com");
    assert_eq!(outcome.expires_at, h.clock.now() + Duration::seconds(300));
    assert!(outcome.receipt.starts_with("mock-msg-"));

    let code = h.delivery.get_sent_code("user@example.com").unwrap();
    assert_eq!(code.len(), 6);
    assert!(code.chars().all(|c| c.is_ascii_digit()));

    let stored = h.store.get("user@example.com").await.unwrap().unwrap();
    assert_eq!(stored.code, code);
}

#[tokio::test]
async fn test_issue_otp_normalizes_identifier() {
    let h = harness();

    h.service.issue_otp("  User@Example.COM ", None).await.unwrap();
    let code = h.delivery.get_sent_code("user@example.com").unwrap();

    assert!(h.store.contains("user@example.com"));
    assert!(h.service.verify_otp("USER@example.com", &code).await.is_ok());
}

#[tokio::test]
async fn test_issue_otp_invalid_identifier() {
    let h = harness();

    for bad in ["", "   ", "not-an-email", "user@localhost", "a b@example.com"] {
        let result = h.service.issue_otp(bad, None).await;
        assert_eq!(
            result.unwrap_err(),
            DomainError::ValidationErr(ValidationError::InvalidIdentifier),
            "Failed for: {:?}",
            bad
        );
    }

    // Validation happens before any collaborator is touched
    assert_eq!(h.limiter.call_count(), 0);
    assert_eq!(h.delivery.attempt_count(), 0);
}

#[tokio::test]
async fn test_verify_succeeds_exactly_once() {
    let h = harness();

    h.service.issue_otp("user@example.com", None).await.unwrap();
    let code = h.delivery.get_sent_code("user@example.com").unwrap();

    let verified = h.service.verify_otp("user@example.com", &code).await.unwrap();
    assert_eq!(verified.identifier, "user@example.com");
    assert_eq!(verified.verified_at, h.clock.now());
    assert!(!h.store.contains("user@example.com"));

    let second = h.service.verify_otp("user@example.com", &code).await;
    assert_eq!(second.unwrap_err(), DomainError::NotFoundOrExpired);
}

#[tokio::test]
async fn test_wrong_code_then_correct_code() {
    let random = Arc::new(SequenceRandom::new([123_456]));
    let h = harness_with(random, OtpServiceConfig::default(), false, false);

    h.service.issue_otp("user@example.com", None).await.unwrap();

    let wrong = h.service.verify_otp("user@example.com", "654321").await;
    assert_eq!(wrong.unwrap_err(), DomainError::InvalidCode);
    assert!(h.store.contains("user@example.com"));

    // Wrong attempts do not lock the record
    for _ in 0..5 {
        assert_eq!(
            h.service.verify_otp("user@example.com", "000000").await.unwrap_err(),
            DomainError::InvalidCode
        );
    }

    assert!(h.service.verify_otp("user@example.com", "123456").await.is_ok());
    assert!(!h.store.contains("user@example.com"));
}

#[tokio::test]
async fn test_reissue_invalidates_previous_code() {
    let random = Arc::new(SequenceRandom::new([111_111, 222_222]));
    let h = harness_with(random, OtpServiceConfig::default(), false, false);

    h.service.issue_otp("user@example.com", None).await.unwrap();
    h.service.issue_otp("user@example.com", None).await.unwrap();
    assert_eq!(
        h.delivery.get_sent_code("user@example.com").as_deref(),
        Some("222222")
    );

    let first = h.service.verify_otp("user@example.com", "111111").await;
    assert!(matches!(
        first.unwrap_err(),
        DomainError::InvalidCode | DomainError::NotFoundOrExpired
    ));

    assert!(h.service.verify_otp("user@example.com", "222222").await.is_ok());
}

#[tokio::test]
async fn test_code_expires_after_ttl() {
    let h = harness();

    h.service.issue_otp("user@example.com", None).await.unwrap();
    let code = h.delivery.get_sent_code("user@example.com").unwrap();

    h.clock.advance(Duration::seconds(301));

    let result = h.service.verify_otp("user@example.com", &code).await;
    assert_eq!(result.unwrap_err(), DomainError::NotFoundOrExpired);
    // Expired record is purged on access
    assert!(!h.store.contains("user@example.com"));
}

#[tokio::test]
async fn test_code_valid_at_exact_expiry() {
    let h = harness();

    h.service.issue_otp("user@example.com", None).await.unwrap();
    let code = h.delivery.get_sent_code("user@example.com").unwrap();

    h.clock.advance(Duration::seconds(300));
    assert!(h.service.verify_otp("user@example.com", &code).await.is_ok());
}

#[tokio::test]
async fn test_custom_ttl() {
    let config = OtpServiceConfig::default().with_ttl_seconds(60);
    let h = harness_with(Arc::new(OsSecureRandom), config, false, false);

    let outcome = h.service.issue_otp("user@example.com", None).await.unwrap();
    assert_eq!(outcome.expires_at, h.clock.now() + Duration::seconds(60));

    let code = h.delivery.get_sent_code("user@example.com").unwrap();
    h.clock.advance(Duration::seconds(61));
    assert_eq!(
        h.service.verify_otp("user@example.com", &code).await.unwrap_err(),
        DomainError::NotFoundOrExpired
    );
}

#[tokio::test]
async fn test_oversized_configured_ttl_stays_positive() {
    let otp = ro_shared::OtpConfig {
        ttl_seconds: u64::MAX,
        ..Default::default()
    };
    let config = OtpServiceConfig::from_app_config(&otp, &ro_shared::RateLimitConfig::default());
    assert_eq!(config.ttl, Duration::days(1));

    let h = harness_with(Arc::new(OsSecureRandom), config, false, false);
    let outcome = h.service.issue_otp("user@example.com", None).await.unwrap();
    assert!(outcome.expires_at > h.clock.now());

    let code = h.delivery.get_sent_code("user@example.com").unwrap();
    assert!(h.service.verify_otp("user@example.com", &code).await.is_ok());
}

#[tokio::test]
async fn test_rate_limit_seventh_request_rejected() {
    let h = harness();

    for _ in 0..6 {
        h.service.issue_otp("user@example.com", None).await.unwrap();
    }

    let seventh = h.service.issue_otp("user@example.com", None).await.unwrap_err();
    match seventh {
        DomainError::RateLimited { retry_after_seconds } => {
            assert!(retry_after_seconds > 0);
            assert!(retry_after_seconds <= 3600);
        }
        other => panic!("Expected RateLimited, got {:?}", other),
    }

    // Rejected issuance attempts no delivery
    assert_eq!(h.delivery.attempt_count(), 6);

    h.clock.advance(Duration::seconds(3600));
    assert!(h.service.issue_otp("user@example.com", None).await.is_ok());
}

#[tokio::test]
async fn test_rate_limit_rejection_keeps_existing_code() {
    let random = Arc::new(SequenceRandom::new([1, 2, 3, 4, 5, 6, 7]));
    let h = harness_with(random, OtpServiceConfig::default(), false, false);

    for _ in 0..6 {
        h.service.issue_otp("user@example.com", None).await.unwrap();
    }
    assert!(h.service.issue_otp("user@example.com", None).await.is_err());

    // The sixth code is still the live one
    assert!(h.service.verify_otp("user@example.com", "000006").await.is_ok());
}

#[tokio::test]
async fn test_rate_limit_by_requester_key() {
    let h = harness();

    for i in 0..6 {
        let email = format!("user{}@example.com", i);
        h.service.issue_otp(&email, Some("203.0.113.7")).await.unwrap();
    }

    let result = h.service.issue_otp("other@example.com", Some("203.0.113.7")).await;
    assert!(matches!(result, Err(DomainError::RateLimited { .. })));

    // A different requester has its own bucket
    assert!(h
        .service
        .issue_otp("other@example.com", Some("198.51.100.2"))
        .await
        .is_ok());
}

#[tokio::test]
async fn test_rate_limit_disabled() {
    let config = OtpServiceConfig {
        rate_limit_enabled: false,
        ..OtpServiceConfig::default()
    };
    let h = harness_with(Arc::new(OsSecureRandom), config, false, false);

    for _ in 0..10 {
        h.service.issue_otp("user@example.com", None).await.unwrap();
    }
    assert_eq!(h.limiter.call_count(), 0);
}

#[tokio::test]
async fn test_delivery_failure_keeps_record() {
    let random = Arc::new(SequenceRandom::new([424_242]));
    let h = harness_with(random, OtpServiceConfig::default(), false, true);

    let result = h.service.issue_otp("user@example.com", None).await;
    match result.unwrap_err() {
        DomainError::DeliveryFailed { message } => {
            assert!(message.contains("Mail provider error"));
        }
        other => panic!("Expected DeliveryFailed, got {:?}", other),
    }

    assert!(h.store.contains("user@example.com"));
    assert!(h.service.verify_otp("user@example.com", "424242").await.is_ok());
}

#[tokio::test]
async fn test_store_failure_skips_delivery() {
    let h = harness_with(
        Arc::new(OsSecureRandom),
        OtpServiceConfig::default(),
        true,
        false,
    );

    let result = h.service.issue_otp("user@example.com", None).await;
    let error = result.unwrap_err();
    assert!(matches!(error, DomainError::ServiceUnavailable { .. }));
    assert!(error.is_retryable());
    assert_eq!(h.delivery.attempt_count(), 0);

    let verify = h.service.verify_otp("user@example.com", "123456").await;
    assert!(matches!(verify, Err(DomainError::ServiceUnavailable { .. })));
}

#[tokio::test]
async fn test_random_failure_is_fatal_for_issuance() {
    let h = harness_with(
        Arc::new(SequenceRandom::new([])),
        OtpServiceConfig::default(),
        false,
        false,
    );

    let result = h.service.issue_otp("user@example.com", None).await;
    assert!(matches!(
        result,
        Err(DomainError::RandomSourceUnavailable { .. })
    ));
    assert!(!h.store.contains("user@example.com"));
    assert_eq!(h.delivery.attempt_count(), 0);
}

#[tokio::test]
async fn test_verify_missing_fields() {
    let h = harness();

    assert_eq!(
        h.service.verify_otp("", "").await.unwrap_err(),
        DomainError::missing_fields(["email", "otp"])
    );
    assert_eq!(
        h.service.verify_otp("user@example.com", "  ").await.unwrap_err(),
        DomainError::missing_fields(["otp"])
    );
    assert_eq!(
        h.service.verify_otp(" ", "123456").await.unwrap_err(),
        DomainError::missing_fields(["email"])
    );
}

#[tokio::test]
async fn test_verify_unknown_identifier() {
    let h = harness();

    let result = h.service.verify_otp("nobody@example.com", "123456").await;
    assert_eq!(result.unwrap_err(), DomainError::NotFoundOrExpired);

    let result = h.service.verify_otp("not-an-email", "123456").await;
    assert_eq!(result.unwrap_err(), DomainError::NotFoundOrExpired);
}

#[tokio::test]
async fn test_revoke() {
    let h = harness();

    h.service.issue_otp("user@example.com", None).await.unwrap();
    let code = h.delivery.get_sent_code("user@example.com").unwrap();

    h.service.revoke("User@Example.com").await.unwrap();
    h.service.revoke("user@example.com").await.unwrap();

    assert_eq!(
        h.service.verify_otp("user@example.com", &code).await.unwrap_err(),
        DomainError::NotFoundOrExpired
    );
}

#[tokio::test]
async fn test_store_backend_name() {
    let h = harness();
    assert_eq!(h.service.store_backend(), "mock");
    assert!(h.service.check_store().await.is_ok());
}

#[tokio::test]
async fn test_check_store_reports_unavailable_store() {
    let h = harness_with(
        Arc::new(OsSecureRandom),
        OtpServiceConfig::default(),
        true,
        false,
    );
    assert!(matches!(
        h.service.check_store().await,
        Err(DomainError::ServiceUnavailable { .. })
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_distinct_identifiers_do_not_interfere() {
    let h = harness();

    let mut handles = Vec::new();
    for i in 0..20 {
        let service = h.service.clone();
        let delivery = h.delivery.clone();
        handles.push(tokio::spawn(async move {
            let email = format!("user{}@example.com", i);
            service.issue_otp(&email, None).await.unwrap();
            let code = delivery.get_sent_code(&email).unwrap();
            service.verify_otp(&email, &code).await
        }));
    }

    for handle in handles {
        assert!(handle.await.unwrap().is_ok());
    }
    assert!(h.store.records.lock().unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_verification_single_winner() {
    let h = harness();

    h.service.issue_otp("user@example.com", None).await.unwrap();
    let code = h.delivery.get_sent_code("user@example.com").unwrap();

    let mut handles = Vec::new();
    for _ in 0..10 {
        let service = h.service.clone();
        let code = code.clone();
        handles.push(tokio::spawn(async move {
            service.verify_otp("user@example.com", &code).await
        }));
    }

    let mut successes = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(e) => assert_eq!(e, DomainError::NotFoundOrExpired),
        }
    }
    assert_eq!(successes, 1);
}
