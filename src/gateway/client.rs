//! SMS gateway client and webhook lifecycle

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

/// SMS gateway error types
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Upstream error: {0}")]
    UpstreamError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// SMS gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmsGatewayConfig {
    /// Gateway base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Basic auth username
    #[serde(default)]
    pub username: String,

    /// Basic auth password
    #[serde(default)]
    pub password: String,

    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_base_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

impl Default for SmsGatewayConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            username: String::new(),
            password: String::new(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl SmsGatewayConfig {
    /// Override fields from environment variables
    pub fn from_env(mut self) -> Self {
        if let Ok(val) = std::env::var("SMS_GATEWAY_URL") {
            self.base_url = val;
        }
        if let Ok(val) = std::env::var("SMS_USERNAME") {
            self.username = val;
        }
        if let Ok(val) = std::env::var("SMS_PASSWORD") {
            self.password = val;
        }
        if let Ok(val) = std::env::var("SMS_TIMEOUT_MS") {
            if let Ok(timeout) = val.parse() {
                self.timeout_ms = timeout;
            }
        }
        self
    }

    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// A webhook registration at the gateway
#[derive(Debug, Clone, Deserialize)]
pub struct RegisteredWebhook {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub event: Option<String>,
}

/// SMS gateway client
pub struct SmsGatewayClient {
    http: Client,
    config: SmsGatewayConfig,
}

impl SmsGatewayClient {
    /// Create a new gateway client
    pub fn new(config: SmsGatewayConfig) -> Result<Self, GatewayError> {
        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| GatewayError::RequestFailed(e.to_string()))?;

        Ok(Self { http, config })
    }

    /// Send one SMS to the destination identity
    pub async fn send_message(&self, identity: &str, message: &str) -> Result<(), GatewayError> {
        let url = format!("{}/message", self.config.base_url);
        let body = serde_json::json!({
            "message": message,
            "phoneNumbers": [identity],
        });

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.config.username, Some(&self.config.password))
            .json(&body)
            .send()
            .await
            .map_err(classify_send_error)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(GatewayError::UpstreamError(format!(
                "Status {}: {}",
                status, error_text
            )));
        }

        debug!(identity, "sms forwarded to gateway");
        Ok(())
    }

    /// Webhooks currently registered at the gateway
    pub async fn list_webhooks(&self) -> Result<Vec<RegisteredWebhook>, GatewayError> {
        let url = format!("{}/webhooks", self.config.base_url);

        let response = self
            .http
            .get(&url)
            .basic_auth(&self.config.username, Some(&self.config.password))
            .send()
            .await
            .map_err(classify_send_error)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(GatewayError::UpstreamError(format!(
                "Status {}: {}",
                status, error_text
            )));
        }

        response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))
    }

    /// Delete one webhook registration
    pub async fn delete_webhook(&self, id: &str) -> Result<(), GatewayError> {
        let url = format!("{}/webhooks/{}", self.config.base_url, id);

        let response = self
            .http
            .delete(&url)
            .basic_auth(&self.config.username, Some(&self.config.password))
            .send()
            .await
            .map_err(classify_send_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::UpstreamError(format!("Status {}", status)));
        }
        Ok(())
    }

    /// Register a webhook for the sms:received event
    pub async fn register_webhook(&self, callback_url: &str) -> Result<(), GatewayError> {
        let url = format!("{}/webhooks", self.config.base_url);
        let body = serde_json::json!({
            "url": callback_url,
            "event": "sms:received",
        });

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.config.username, Some(&self.config.password))
            .json(&body)
            .send()
            .await
            .map_err(classify_send_error)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(GatewayError::UpstreamError(format!(
                "Status {}: {}",
                status, error_text
            )));
        }
        Ok(())
    }

    /// Startup routine: deregister every existing webhook, then register
    /// `callback_url` for sms:received. Safe to run repeatedly.
    pub async fn install_webhook(&self, callback_url: &str) -> Result<(), GatewayError> {
        match self.list_webhooks().await {
            Ok(webhooks) => {
                for webhook in webhooks {
                    match self.delete_webhook(&webhook.id).await {
                        Ok(()) => info!(id = %webhook.id, "deregistered webhook"),
                        Err(e) => warn!(id = %webhook.id, error = %e, "failed to deregister webhook"),
                    }
                }
            }
            Err(e) => warn!(error = %e, "failed to list existing webhooks"),
        }

        self.register_webhook(callback_url).await?;
        info!(callback_url, "webhook registered");
        Ok(())
    }
}

fn classify_send_error(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Timeout(e.to_string())
    } else {
        GatewayError::RequestFailed(e.to_string())
    }
}
