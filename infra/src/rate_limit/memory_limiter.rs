//! Process-local fixed-window rate limiter

use async_trait::async_trait;
use chrono::Duration;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use ro_core::{Clock, DomainResult, RateLimitDecision, RateLimitWindow, RateLimiter};
use ro_shared::RateLimitConfig;

/// Fixed-window limiter for single-instance deployments
///
/// Under horizontal scaling each instance counts separately, so the
/// effective global quota is multiplied by the number of instances.
pub struct MemoryRateLimiter {
    windows: Mutex<HashMap<String, RateLimitWindow>>,
    clock: Arc<dyn Clock>,
    quota: u32,
    window: Duration,
    /// Table size above which elapsed windows are swept
    sweep_threshold: usize,
}

impl MemoryRateLimiter {
    pub fn new(clock: Arc<dyn Clock>, config: &RateLimitConfig, sweep_threshold: usize) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            clock,
            quota: config.quota,
            window: config.window(),
            sweep_threshold: sweep_threshold.max(1),
        }
    }

    /// Number of tracked requesters
    pub async fn tracked(&self) -> usize {
        self.windows.lock().await.len()
    }
}

#[async_trait]
impl RateLimiter for MemoryRateLimiter {
    async fn consume(&self, requester_key: &str) -> DomainResult<RateLimitDecision> {
        let now = self.clock.now();
        let mut windows = self.windows.lock().await;

        if windows.len() >= self.sweep_threshold {
            let before = windows.len();
            windows.retain(|_, window| !window.is_elapsed(now));
            debug!(swept = before - windows.len(), "Swept elapsed rate limit windows");
        }

        let window = windows
            .entry(requester_key.to_string())
            .or_insert_with(|| RateLimitWindow::new(requester_key, now, self.window));
        Ok(window.consume(now, self.quota))
    }
}
