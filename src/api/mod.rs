//! HTTP surface for the relay service
//!
//! - POST /webhook - inbound sms:received events
//! - GET /test - plain-text liveness page
//! - GET /metrics - Prometheus exposition

pub mod handlers;
pub mod models;
pub mod routes;

pub use handlers::{export_metrics, receive_sms, test_page, AppState};
pub use models::{ApiError, WebhookEvent, WebhookPayload, WebhookReply};
pub use routes::build_router;
