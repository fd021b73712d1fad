//! HTTP handlers for the relay service

use crate::api::models::{ApiError, WebhookEvent, WebhookReply};
use crate::error::RelayError;
use crate::metrics::METRICS;
use crate::relay::RelayController;
use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;
use tracing::{error, info};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<RelayController>,
}

/// Handle one sms:received event
///
/// POST /webhook
pub async fn receive_sms(
    State(state): State<AppState>,
    Json(event): Json<WebhookEvent>,
) -> Result<Json<WebhookReply>, (StatusCode, Json<ApiError>)> {
    let (message, identity) = match event.payload {
        Some(payload) => (
            payload.message.unwrap_or_default(),
            payload.phone_number.unwrap_or_default(),
        ),
        None => (String::new(), String::new()),
    };

    info!(identity = %identity, "received sms event");

    match state.controller.handle(&identity, &message).await {
        Ok(outcome) => Ok(Json(WebhookReply {
            success: true,
            reply: outcome.reply().to_string(),
        })),
        Err(RelayError::InvalidInput(_)) => Err((
            StatusCode::BAD_REQUEST,
            Json(ApiError::new("Invalid payload")),
        )),
        Err(RelayError::Forbidden(_)) => Err((
            StatusCode::FORBIDDEN,
            Json(ApiError::new("Unauthorized country code")),
        )),
        Err(RelayError::Oversized) => Err((
            StatusCode::BAD_REQUEST,
            Json(ApiError::new("Message too large")),
        )),
        Err(e) => {
            error!(error = %e, "failed to process sms event");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiError::new("Failed to process response")),
            ))
        }
    }
}

/// Plain-text liveness page
///
/// GET /test
pub async fn test_page() -> &'static str {
    "HTTP is working correctly!"
}

/// Prometheus text exposition
///
/// GET /metrics
pub async fn export_metrics() -> String {
    METRICS.export_prometheus()
}
