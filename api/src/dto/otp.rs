use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::{Validate, ValidationError};

/// Longest address accepted on the wire
const MAX_EMAIL_LENGTH: usize = 254;

/// Body of `POST /send-otp`
///
/// A missing `email` is treated like an empty one and rejected as an
/// invalid address by the service. Any JSON type is accepted here so that
/// a number or object fails validation rather than body parsing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct SendOtpRequest {
    #[serde(default)]
    #[validate(custom = "validate_email_value")]
    pub email: Option<Value>,
}

impl SendOtpRequest {
    /// The submitted address, empty when absent or not a string
    pub fn email(&self) -> &str {
        self.email.as_ref().and_then(Value::as_str).unwrap_or_default()
    }
}

fn validate_email_value(value: &Value) -> Result<(), ValidationError> {
    match value.as_str() {
        Some(email) if email.len() <= MAX_EMAIL_LENGTH => Ok(()),
        Some(_) => Err(ValidationError::new("length")),
        None => Err(ValidationError::new("type")),
    }
}

/// Body of `POST /verify-otp`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerifyOtpRequest {
    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub otp: Option<OtpValue>,
}

/// A submitted code, accepted as a JSON string or a JSON number
///
/// Clients that parse the emailed code as an integer lose its leading
/// zeros; numbers are left-padded back to the configured width.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OtpValue {
    Text(String),
    Number(u64),
}

impl OtpValue {
    /// Render as the code string compared against the stored record
    pub fn to_code(&self, length: usize) -> String {
        match self {
            OtpValue::Text(text) => text.clone(),
            OtpValue::Number(number) => format!("{:0width$}", number, width = length),
        }
    }
}

/// Body of `GET /_health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    /// Configured store backing, `local` or `external`
    pub store: String,
}
