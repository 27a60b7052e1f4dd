//! Gmail API email delivery
//!
//! Sends the code as an HTML email through the Gmail REST API:
//!
//! 1. Exchange the OAuth2 refresh token for an access token (cached until
//!    shortly before it expires)
//! 2. Build a raw RFC 2822 message and base64url-encode it without padding
//! 3. POST `{"raw": ...}` to `users/me/messages/send`
//!
//! The Gmail message id is returned as the delivery receipt.

use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use ro_core::DeliveryService;
use ro_shared::utils::mask_email;
use ro_shared::DeliveryConfig;

use crate::InfrastructureError;

/// Google OAuth2 token endpoint
pub const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Gmail send endpoint for the authorized account
pub const SEND_URL: &str = "https://gmail.googleapis.com/gmail/v1/users/me/messages/send";

/// Subject line of every code email
pub const SUBJECT: &str = "Your Ruve verification code";

/// Refresh the access token this long before Google says it expires
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Gmail delivery configuration
#[derive(Debug, Clone)]
pub struct GmailConfig {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    /// From address, must belong to the authorized account
    pub sender_email: String,
    /// Display name in the From header
    pub sender_name: String,
    /// Lifetime quoted in the message body
    pub ttl_minutes: u64,
    /// Timeout for API requests in seconds
    pub request_timeout_secs: u64,
    /// Maximum send attempts for transient failures
    pub max_retries: u32,
    /// Initial retry delay in milliseconds
    pub retry_delay_ms: u64,
    pub token_url: String,
    pub send_url: String,
}

impl GmailConfig {
    /// Build from the shared delivery configuration
    ///
    /// Fails when any credential or the sender address is missing.
    pub fn from_delivery_config(
        config: &DeliveryConfig,
        ttl_minutes: u64,
    ) -> Result<Self, InfrastructureError> {
        config
            .require_gmail()
            .map_err(|e| InfrastructureError::Config(e.to_string()))?;

        let required = |value: &Option<String>| value.clone().unwrap_or_default();

        Ok(Self {
            client_id: required(&config.gmail.client_id),
            client_secret: required(&config.gmail.client_secret),
            refresh_token: required(&config.gmail.refresh_token),
            sender_email: required(&config.sender_email),
            sender_name: config.sender_name.clone(),
            ttl_minutes,
            request_timeout_secs: config.request_timeout_secs,
            max_retries: 2,
            retry_delay_ms: 500,
            token_url: TOKEN_URL.to_string(),
            send_url: SEND_URL.to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    raw: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    id: String,
}

struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

/// Gmail API delivery service
pub struct GmailDelivery {
    client: Client,
    config: GmailConfig,
    token: RwLock<Option<CachedToken>>,
}

impl GmailDelivery {
    /// Create a new Gmail delivery service
    pub fn new(config: GmailConfig) -> Result<Self, InfrastructureError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs.max(1)))
            .build()?;

        info!(
            "Gmail delivery initialized with sender: {}",
            mask_email(&config.sender_email)
        );

        Ok(Self {
            client,
            config,
            token: RwLock::new(None),
        })
    }

    /// Build the raw RFC 2822 message carrying `code`
    pub fn build_message(&self, to: &str, code: &str) -> String {
        let html = format!(
            concat!(
                "<div style=\"font-family: Arial, sans-serif; color:#111;\">",
                "<p style=\"font-size:16px\">Your one-time code for Ruve:</p>",
                "<h2 style=\"letter-spacing:4px; margin:6px 0;\">{}</h2>",
                "<p style=\"color:#666; font-size:13px; margin-top:10px;\">",
                "This code expires in {} minutes.</p>",
                "</div>"
            ),
            code, self.config.ttl_minutes
        );

        [
            format!(
                "From: \"{}\" <{}>",
                self.config.sender_name, self.config.sender_email
            ),
            format!("To: {}", to),
            format!("Subject: {}", SUBJECT),
            "MIME-Version: 1.0".to_string(),
            "Content-Type: text/html; charset=UTF-8".to_string(),
            String::new(),
            html,
        ]
        .join("\r\n")
    }

    /// Base64url without padding, as the Gmail API expects
    pub fn encode_message(raw: &str) -> String {
        URL_SAFE_NO_PAD.encode(raw.as_bytes())
    }

    /// Current access token, refreshing it when missing or about to expire
    async fn access_token(&self) -> Result<String, InfrastructureError> {
        {
            let token = self.token.read().await;
            if let Some(cached) = token.as_ref() {
                if cached.expires_at > Instant::now() + TOKEN_EXPIRY_MARGIN {
                    return Ok(cached.access_token.clone());
                }
            }
        }

        let mut token = self.token.write().await;
        // Another task may have refreshed while we waited for the lock
        if let Some(cached) = token.as_ref() {
            if cached.expires_at > Instant::now() + TOKEN_EXPIRY_MARGIN {
                return Ok(cached.access_token.clone());
            }
        }

        debug!("Refreshing Gmail access token");
        let response = self
            .client
            .post(&self.config.token_url)
            .form(&[
                ("grant_type", "refresh_token"),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("refresh_token", self.config.refresh_token.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Gmail token refresh failed with status {}", status);
            return Err(InfrastructureError::Delivery(format!(
                "token endpoint returned {}: {}",
                status,
                truncate(&body)
            )));
        }

        let refreshed: TokenResponse = response.json().await?;
        let lifetime = Duration::from_secs(refreshed.expires_in.unwrap_or(3600));
        *token = Some(CachedToken {
            access_token: refreshed.access_token.clone(),
            expires_at: Instant::now() + lifetime,
        });

        Ok(refreshed.access_token)
    }

    async fn invalidate_token(&self) {
        *self.token.write().await = None;
    }

    /// Send an encoded message with retry logic
    ///
    /// Retries transport failures, 429, 5xx and one expired-token 401.
    async fn send_with_retry(&self, to: &str, encoded: &str) -> Result<String, InfrastructureError> {
        let max_attempts = self.config.max_retries.max(1);
        let mut attempts = 0;
        let mut delay = Duration::from_millis(self.config.retry_delay_ms);

        loop {
            attempts += 1;
            debug!(
                "Sending email attempt {}/{} to {}",
                attempts,
                max_attempts,
                mask_email(to)
            );

            let token = self.access_token().await?;
            let result = self
                .client
                .post(&self.config.send_url)
                .bearer_auth(&token)
                .json(&SendRequest { raw: encoded })
                .send()
                .await;

            let error = match result {
                Ok(response) if response.status().is_success() => {
                    let sent: SendResponse = response.json().await?;
                    info!(
                        "Email sent successfully to {} with id: {}",
                        mask_email(to),
                        sent.id
                    );
                    return Ok(sent.id);
                }
                Ok(response) => {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    let error = InfrastructureError::Delivery(format!(
                        "Gmail API returned {}: {}",
                        status,
                        truncate(&body)
                    ));
                    if status == StatusCode::UNAUTHORIZED {
                        self.invalidate_token().await;
                    } else if !is_retryable_status(status) {
                        return Err(error);
                    }
                    error
                }
                Err(e) if e.is_timeout() || e.is_connect() => InfrastructureError::Http(e),
                Err(e) => return Err(InfrastructureError::Http(e)),
            };

            if attempts >= max_attempts {
                error!(
                    "Failed to send email after {} attempts: {}",
                    attempts, error
                );
                return Err(error);
            }

            warn!(
                "Failed to send email (attempt {}/{}): {}. Retrying in {:?}",
                attempts, max_attempts, error, delay
            );
            tokio::time::sleep(delay).await;
            delay *= 2;
        }
    }
}

#[async_trait]
impl DeliveryService for GmailDelivery {
    async fn deliver(&self, destination: &str, code: &str) -> Result<String, String> {
        let raw = self.build_message(destination, code);
        let encoded = Self::encode_message(&raw);
        self.send_with_retry(destination, &encoded)
            .await
            .map_err(|e| e.to_string())
    }
}

fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Keep provider error bodies short in logs and messages
fn truncate(body: &str) -> &str {
    match body.char_indices().nth(200) {
        Some((index, _)) => &body[..index],
        None => body,
    }
}
