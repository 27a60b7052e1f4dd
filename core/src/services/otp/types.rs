//! Types returned by the OTP service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Result of a successful issuance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueOutcome {
    /// Normalized identifier the code is bound to
    pub identifier: String,
    /// When the issued code stops being accepted
    pub expires_at: DateTime<Utc>,
    /// Receipt returned by the delivery provider
    pub receipt: String,
}

/// Result of a successful verification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyOutcome {
    pub identifier: String,
    pub verified_at: DateTime<Utc>,
}
