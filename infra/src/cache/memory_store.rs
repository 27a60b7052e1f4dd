//! Process-local bounded OTP store

use async_trait::async_trait;
use chrono::Duration;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use ro_core::{Clock, DomainResult, OtpRecord, OtpStore};

/// In-memory OTP store for single-instance deployments
///
/// Expiry is checked against the injected clock on every access. The map
/// never holds more than `max_entries` records: when full, expired records
/// are purged first and then the record closest to expiry is evicted.
pub struct MemoryOtpStore {
    records: RwLock<HashMap<String, OtpRecord>>,
    clock: Arc<dyn Clock>,
    max_entries: usize,
}

impl MemoryOtpStore {
    pub fn new(clock: Arc<dyn Clock>, max_entries: usize) -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            clock,
            max_entries: max_entries.max(1),
        }
    }

    /// Number of records currently held, expired or not
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    fn make_room(&self, records: &mut HashMap<String, OtpRecord>) {
        let now = self.clock.now();
        let before = records.len();
        records.retain(|_, record| !record.is_expired_at(now));
        if records.len() < before {
            debug!(purged = before - records.len(), "Purged expired OTP records");
        }

        if records.len() >= self.max_entries {
            let victim = records
                .iter()
                .min_by_key(|(_, record)| record.expires_at)
                .map(|(key, _)| key.clone());
            if let Some(victim) = victim {
                warn!(
                    max_entries = self.max_entries,
                    event = "otp_store_eviction",
                    "OTP store full, evicting the record closest to expiry"
                );
                records.remove(&victim);
            }
        }
    }
}

#[async_trait]
impl OtpStore for MemoryOtpStore {
    async fn put(&self, key: &str, code: &str, ttl: Duration) -> DomainResult<OtpRecord> {
        let record = OtpRecord::new(key, code, self.clock.now(), ttl);
        let mut records = self.records.write().await;
        if !records.contains_key(key) && records.len() >= self.max_entries {
            self.make_room(&mut records);
        }
        records.insert(key.to_string(), record.clone());
        Ok(record)
    }

    async fn get(&self, key: &str) -> DomainResult<Option<OtpRecord>> {
        {
            let records = self.records.read().await;
            match records.get(key) {
                None => return Ok(None),
                Some(record) if !record.is_expired_at(self.clock.now()) => {
                    return Ok(Some(record.clone()))
                }
                Some(_) => {}
            }
        }

        // Expired: purge under the write lock, re-checking in case a fresh
        // record replaced it in between.
        let mut records = self.records.write().await;
        match records.get(key) {
            Some(record) if !record.is_expired_at(self.clock.now()) => Ok(Some(record.clone())),
            Some(_) => {
                records.remove(key);
                debug!(event = "otp_expired_purged", "Purged expired OTP record on access");
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, key: &str) -> DomainResult<()> {
        self.records.write().await.remove(key);
        Ok(())
    }

    async fn delete_if_matches(&self, key: &str, code: &str) -> DomainResult<bool> {
        let mut records = self.records.write().await;
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
        "local"
    }
}
