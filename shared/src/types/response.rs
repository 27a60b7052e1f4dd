//! API response types

use serde::{Deserialize, Serialize};

/// Success body: `{"ok": true, "message": "..."}` plus optional fields
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T = ()> {
    pub ok: bool,

    /// Stable machine-readable outcome (`otp_sent`, `otp_verified`)
    pub message: String,

    /// Extra payload for the endpoint
    #[serde(skip_serializing_if = "Option::is_none", flatten)]
    pub data: Option<T>,
}

impl ApiResponse<()> {
    /// Create a response carrying only a message
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
            data: None,
        }
    }
}

impl<T> ApiResponse<T> {
    /// Create a response with extra payload fields
    pub fn with_data(message: impl Into<String>, data: T) -> Self {
        Self {
            ok: true,
            message: message.into(),
            data: Some(data),
        }
    }
}
