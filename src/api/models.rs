//! Webhook request and response bodies

use serde::{Deserialize, Serialize};

/// Inbound sms:received event from the gateway.
///
/// Fields are optional so a missing message or number maps to the
/// "Invalid payload" client error instead of a deserialization reject.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    #[serde(default)]
    pub payload: Option<WebhookPayload>,
}

/// Event payload: the message text and the sender's number
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, rename = "phoneNumber")]
    pub phone_number: Option<String>,
}

/// Success response to the webhook caller
#[derive(Debug, Serialize, Deserialize)]
pub struct WebhookReply {
    pub success: bool,
    pub reply: String,
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
