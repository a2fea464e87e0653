use axum::{
    extract::State,
    http::HeaderMap,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::Instrument;

use crate::error::RelayError;
use crate::handler::{handle_events, EventOutcome};
use crate::models::line::WebhookPayload;
use crate::signature::{self, SIGNATURE_HEADER};
use crate::util::AppState;

/// Build the Axum router with `/webhook` and `/status`.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/status", get(status))
        .route("/webhook", post(webhook))
        .with_state(Arc::new(state))
        .layer(TraceLayer::new_for_http())
}

/// Service status endpoint.
async fn status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let routes = vec!["/status", "/webhook"];
    Json(serde_json::json!({
        "name": "kumao",
        "version": env!("CARGO_PKG_VERSION"),
        "model": state.config.model,
        "routes": routes
    }))
}

/// LINE webhook receiver.
///
/// The raw body is verified against `x-line-signature` before it is parsed.
/// Events are then handled concurrently and the per-event results returned
/// as a JSON array (`null` for events that needed no reply).
async fn webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Vec<Option<EventOutcome>>>, RelayError> {
    let header = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());
    if let Err(e) = signature::check(&state.config.line_channel_secret, &body, header) {
        tracing::warn!("rejected webhook delivery: {}", e);
        return Err(e);
    }

    let payload: WebhookPayload = serde_json::from_slice(&body)?;
    let span = tracing::info_span!(
        "webhook",
        delivery_id = %uuid::Uuid::new_v4(),
        destination = payload.destination.as_deref().unwrap_or(""),
        events = payload.events.len()
    );

    async move {
        match handle_events(&state, payload.events).await {
            Ok(results) => Ok(Json(results)),
            Err(e) => {
                tracing::error!("webhook delivery failed: {}", e);
                Err(e)
            }
        }
    }
    .instrument(span)
    .await
}
