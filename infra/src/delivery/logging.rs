//! Logging delivery for development
//!
//! Writes the code to the log instead of emailing it.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use ro_core::DeliveryService;
use ro_shared::utils::mask_email;

/// Delivery that only logs
#[derive(Clone, Default)]
pub struct LoggingDelivery {
    /// Counter for tracking number of codes "sent"
    message_count: Arc<AtomicU64>,
}

impl LoggingDelivery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the total number of codes logged
    pub fn get_message_count(&self) -> u64 {
        self.message_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DeliveryService for LoggingDelivery {
    async fn deliver(&self, destination: &str, code: &str) -> Result<String, String> {
        let message_id = format!("mock-{}", Uuid::new_v4());
        self.message_count.fetch_add(1, Ordering::SeqCst);

        info!(
            destination = %mask_email(destination),
            code = code,
            message_id = %message_id,
            event = "otp_delivery_logged",
            "Verification code (not sent)"
        );

        Ok(message_id)
    }
}
