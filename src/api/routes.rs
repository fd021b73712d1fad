//! Router assembly with middleware

use crate::api::handlers::{export_metrics, receive_sms, test_page, AppState};
use axum::routing::{get, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Maximum accepted webhook body size in bytes
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Build the service router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/webhook", post(receive_sms))
        .route("/test", get(test_page))
        .route("/metrics", get(export_metrics))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}
