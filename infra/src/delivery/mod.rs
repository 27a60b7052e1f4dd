//! Email delivery module
//!
//! Implementations of `DeliveryService`:
//!
//! - **GmailDelivery**: sends an HTML email through the Gmail REST API
//! - **LoggingDelivery**: logs the code instead of sending it (development)

use std::sync::Arc;

use ro_core::DeliveryService;
use ro_shared::{DeliveryConfig, DeliveryProvider};

use crate::InfrastructureError;

pub mod gmail;
pub mod logging;

pub use gmail::{GmailConfig, GmailDelivery};
pub use logging::LoggingDelivery;

/// Create the delivery service selected by `config.provider`
///
/// `ttl_minutes` is quoted in the message body.
pub fn create_delivery(
    config: &DeliveryConfig,
    ttl_minutes: u64,
) -> Result<Arc<dyn DeliveryService>, InfrastructureError> {
    match config.provider {
        DeliveryProvider::Mock => {
            tracing::warn!("Using logging delivery, codes will not be emailed");
            Ok(Arc::new(LoggingDelivery::new()))
        }
        DeliveryProvider::Gmail => {
            let gmail = GmailConfig::from_delivery_config(config, ttl_minutes)?;
            Ok(Arc::new(GmailDelivery::new(gmail)?))
        }
    }
}
