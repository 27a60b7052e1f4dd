//! Code delivery configuration module

use serde::{Deserialize, Serialize};

use super::{env_string, ConfigError};

/// Delivery provider selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryProvider {
    /// Log the code instead of sending it (development)
    Mock,
    /// Send an HTML email through the Gmail API
    Gmail,
}

impl Default for DeliveryProvider {
    fn default() -> Self {
        DeliveryProvider::Mock
    }
}

impl std::str::FromStr for DeliveryProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mock" | "log" => Ok(DeliveryProvider::Mock),
            "gmail" => Ok(DeliveryProvider::Gmail),
            _ => Err(format!("Invalid delivery provider: {}", s)),
        }
    }
}

/// OAuth2 credentials for the Gmail API
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GmailCredentials {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub refresh_token: Option<String>,
}

/// Email delivery configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeliveryConfig {
    /// Selected provider
    #[serde(default)]
    pub provider: DeliveryProvider,

    /// Address the code is sent from
    #[serde(default)]
    pub sender_email: Option<String>,

    /// Display name in the From header
    #[serde(default = "default_sender_name")]
    pub sender_name: String,

    /// Gmail OAuth2 credentials
    #[serde(default)]
    pub gmail: GmailCredentials,

    /// Timeout for provider HTTP requests in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            provider: DeliveryProvider::default(),
            sender_email: None,
            sender_name: default_sender_name(),
            gmail: GmailCredentials::default(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl DeliveryConfig {
    /// Override from `DELIVERY_PROVIDER`, `SENDER_*` and `GMAIL_*` variables
    pub fn merge_env(self) -> Self {
        Self {
            provider: env_string("DELIVERY_PROVIDER")
                .and_then(|v| v.parse().ok())
                .unwrap_or(self.provider),
            sender_email: env_string("SENDER_EMAIL").or(self.sender_email),
            sender_name: env_string("SENDER_NAME").unwrap_or(self.sender_name),
            gmail: GmailCredentials {
                client_id: env_string("GMAIL_CLIENT_ID").or(self.gmail.client_id),
                client_secret: env_string("GMAIL_CLIENT_SECRET").or(self.gmail.client_secret),
                refresh_token: env_string("GMAIL_REFRESH_TOKEN").or(self.gmail.refresh_token),
            },
            request_timeout_secs: self.request_timeout_secs,
        }
    }

    /// Ensure every setting the Gmail provider needs is present
    pub fn require_gmail(&self) -> Result<(), ConfigError> {
        let missing = [
            ("SENDER_EMAIL", self.sender_email.is_none()),
            ("GMAIL_CLIENT_ID", self.gmail.client_id.is_none()),
            ("GMAIL_CLIENT_SECRET", self.gmail.client_secret.is_none()),
            ("GMAIL_REFRESH_TOKEN", self.gmail.refresh_token.is_none()),
        ]
        .iter()
        .filter(|(_, absent)| *absent)
        .map(|(name, _)| *name)
        .collect::<Vec<_>>();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Missing(missing.join(", ")))
        }
    }
}

fn default_sender_name() -> String {
    String::from("Ruve OTP")
}

fn default_request_timeout_secs() -> u64 {
    15
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_gmail_lists_missing_settings() {
        let config = DeliveryConfig {
            sender_email: Some("otp@ruve.app".to_string()),
            ..Default::default()
        };
        match config.require_gmail() {
            Err(ConfigError::Missing(names)) => {
                assert!(names.contains("GMAIL_CLIENT_ID"));
                assert!(names.contains("GMAIL_REFRESH_TOKEN"));
                assert!(!names.contains("SENDER_EMAIL"));
            }
            other => panic!("Expected missing settings, got {:?}", other),
        }
    }

    #[test]
    fn test_provider_from_str() {
        assert_eq!("gmail".parse::<DeliveryProvider>().unwrap(), DeliveryProvider::Gmail);
        assert_eq!("MOCK".parse::<DeliveryProvider>().unwrap(), DeliveryProvider::Mock);
        assert!("sms".parse::<DeliveryProvider>().is_err());
    }
}
