//! Mock implementations for testing the OTP service

use async_trait::async_trait;
use chrono::Duration;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::domain::entities::{OtpRecord, RateLimitDecision, RateLimitWindow};
use crate::errors::{DomainError, DomainResult};
use crate::services::clock::{Clock, ManualClock};
use crate::services::otp::traits::{DeliveryService, OtpStore, RateLimiter};

// Mock store keeping records in a map and expiring them against the clock
pub struct MockOtpStore {
    pub records: Arc<Mutex<HashMap<String, OtpRecord>>>,
    pub clock: Arc<ManualClock>,
    pub should_fail: bool,
}

impl MockOtpStore {
    pub fn new(clock: Arc<ManualClock>, should_fail: bool) -> Self {
        Self {
            records: Arc::new(Mutex::new(HashMap::new())),
            clock,
            should_fail,
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.records.lock().unwrap().contains_key(key)
    }

    fn check(&self) -> DomainResult<()> {
        if self.should_fail {
            return Err(DomainError::ServiceUnavailable {
                message: "Store unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl OtpStore for MockOtpStore {
    async fn put(&self, key: &str, code: &str, ttl: Duration) -> DomainResult<OtpRecord> {
        self.check()?;
        let record = OtpRecord::new(key, code, self.clock.now(), ttl);
        self.records
            .lock()
            .unwrap()
            .insert(key.to_string(), record.clone());
        Ok(record)
    }

    async fn get(&self, key: &str) -> DomainResult<Option<OtpRecord>> {
        self.check()?;
        let mut records = self.records.lock().unwrap();
        match records.get(key) {
            Some(record) if record.is_expired_at(self.clock.now()) => {
                records.remove(key);
                Ok(None)
            }
            other => Ok(other.cloned()),
        }
    }

    async fn delete(&self, key: &str) -> DomainResult<()> {
        self.check()?;
        self.records.lock().unwrap().remove(key);
        Ok(())
    }

    async fn delete_if_matches(&self, key: &str, code: &str) -> DomainResult<bool> {
        self.check()?;
        let mut records = self.records.lock().unwrap();
        let now = self.clock.now();
        match records.get(key) {
            Some(record) if !record.is_expired_at(now) && record.matches(code) => {
                records.remove(key);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn backend_name(&self) -> &'static str {
        "mock"
    }

    async fn health_check(&self) -> DomainResult<()> {
        self.check()
    }
}

// Mock fixed-window limiter
pub struct MockRateLimiter {
    pub windows: Arc<Mutex<HashMap<String, RateLimitWindow>>>,
    pub clock: Arc<ManualClock>,
    pub quota: u32,
    pub window: Duration,
    pub calls: AtomicUsize,
}

impl MockRateLimiter {
    pub fn new(clock: Arc<ManualClock>, quota: u32, window_seconds: i64) -> Self {
        Self {
            windows: Arc::new(Mutex::new(HashMap::new())),
            clock,
            quota,
            window: Duration::seconds(window_seconds),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RateLimiter for MockRateLimiter {
    async fn consume(&self, requester_key: &str) -> DomainResult<RateLimitDecision> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.clock.now();
        let mut windows = self.windows.lock().unwrap();
        let window = windows
            .entry(requester_key.to_string())
            .or_insert_with(|| RateLimitWindow::new(requester_key, now, self.window));
        Ok(window.consume(now, self.quota))
    }
}

// Mock delivery recording the last code per destination
pub struct MockDeliveryService {
    pub sent: Arc<Mutex<HashMap<String, String>>>,
    pub attempts: AtomicUsize,
    pub should_fail: bool,
}

impl MockDeliveryService {
    pub fn new(should_fail: bool) -> Self {
        Self {
            sent: Arc::new(Mutex::new(HashMap::new())),
            attempts: AtomicUsize::new(0),
            should_fail,
        }
    }

    pub fn get_sent_code(&self, destination: &str) -> Option<String> {
        self.sent.lock().unwrap().get(destination).cloned()
    }

    pub fn attempt_count(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DeliveryService for MockDeliveryService {
    async fn deliver(&self, destination: &str, code: &str) -> Result<String, String> {
        let n = self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.should_fail {
            return Err("Mail provider error".to_string());
        }
        self.sent
            .lock()
            .unwrap()
            .insert(destination.to_string(), code.to_string());
        Ok(format!("mock-msg-{}", n))
    }
}
