//! Shared fixtures for API tests
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use actix_web::web;
use async_trait::async_trait;

use ro_api::AppState;
use ro_core::{
    DeliveryService, ManualClock, OtpService, OtpServiceConfig, OtpStore, SecureRandom,
};
use ro_infra::cache::MemoryOtpStore;
use ro_infra::rate_limit::MemoryRateLimiter;
use ro_shared::AppConfig;

/// Delivery double that remembers the last code per destination
#[derive(Default)]
pub struct RecordingDelivery {
    sent: Mutex<HashMap<String, String>>,
    fail: AtomicBool,
}

impl RecordingDelivery {
    pub fn last_code(&self, destination: &str) -> Option<String> {
        self.sent.lock().unwrap().get(destination).cloned()
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl DeliveryService for RecordingDelivery {
    async fn deliver(&self, destination: &str, code: &str) -> Result<String, String> {
        if self.fail.load(Ordering::SeqCst) {
            return Err("Mail provider error".to_string());
        }
        self.sent
            .lock()
            .unwrap()
            .insert(destination.to_string(), code.to_string());
        Ok(format!("test-{}", destination))
    }
}

/// Local backends on a manual clock, plus the recording delivery
pub struct TestContext {
    pub config: AppConfig,
    pub state: web::Data<AppState>,
    pub delivery: Arc<RecordingDelivery>,
    pub clock: Arc<ManualClock>,
}

impl TestContext {
    pub fn new(config: AppConfig, random: Arc<dyn SecureRandom>) -> Self {
        let clock = Arc::new(ManualClock::default());
        let store = Arc::new(MemoryOtpStore::new(clock.clone(), config.store.max_entries));
        Self::build(config, random, clock, store)
    }

    /// Same wiring around a caller-supplied store
    pub fn with_store(config: AppConfig, store: Arc<dyn OtpStore>) -> Self {
        let clock = Arc::new(ManualClock::default());
        Self::build(config, Arc::new(ro_core::OsSecureRandom), clock, store)
    }

    fn build(
        config: AppConfig,
        random: Arc<dyn SecureRandom>,
        clock: Arc<ManualClock>,
        store: Arc<dyn OtpStore>,
    ) -> Self {
        let delivery = Arc::new(RecordingDelivery::default());

        let service = OtpService::new(
            store,
            Arc::new(MemoryRateLimiter::new(
                clock.clone(),
                &config.rate_limit,
                config.store.limiter_sweep_threshold,
            )),
            delivery.clone(),
            random,
            OtpServiceConfig::from_app_config(&config.otp, &config.rate_limit),
        )
        .with_clock(clock.clone());

        let state = web::Data::new(AppState::new(Arc::new(service), &config));

        Self {
            config,
            state,
            delivery,
            clock,
        }
    }
}
