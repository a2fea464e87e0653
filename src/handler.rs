//! Per-event request chains.
//!
//! Text message: completion, then reply.
//! Image message: content fetch, then vision completion, then reply.
//! Anything else is skipped without an outbound call.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use futures_util::future::join_all;
use serde::Serialize;

use crate::error::RelayError;
use crate::models::line::{MessageEvent, ReplyRequest, WebhookEvent, WebhookMessage};
use crate::util::AppState;

/// Result of a replied event, echoed back in the webhook response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventOutcome {
    pub reply_token: String,
    pub kind: &'static str,
    /// JSON body returned by the reply API.
    pub reply: serde_json::Value,
}

/// Handle every event of a delivery concurrently.
///
/// Every event chain runs to completion, so a failing event never stops a
/// sibling's reply. Results keep the order of `events`; the first failure
/// (in event order) fails the batch.
pub async fn handle_events(
    state: &AppState,
    events: Vec<WebhookEvent>,
) -> Result<Vec<Option<EventOutcome>>, RelayError> {
    join_all(events.into_iter().map(|event| handle_event(state, event)))
        .await
        .into_iter()
        .collect()
}

/// Handle a single event, producing at most one reply.
pub async fn handle_event(
    state: &AppState,
    event: WebhookEvent,
) -> Result<Option<EventOutcome>, RelayError> {
    let event = match event {
        WebhookEvent::Message(ev) => ev,
        WebhookEvent::Other => return Ok(None),
    };

    let kind = event.message.kind();
    // Standby-mode events carry no reply token.
    let Some(reply_token) = event.reply_token.clone() else {
        tracing::debug!(
            kind,
            event_id = ?event.webhook_event_id,
            "skipping event without reply token"
        );
        return Ok(None);
    };
    let Some(text) = completion_text(state, &event).await? else {
        tracing::debug!(kind, "skipping unsupported message kind");
        return Ok(None);
    };

    let reply = state
        .line
        .reply(&ReplyRequest::text(reply_token.clone(), &text))
        .await?;
    tracing::info!(
        kind,
        event_id = ?event.webhook_event_id,
        chars = text.chars().count(),
        "replied"
    );

    Ok(Some(EventOutcome {
        reply_token,
        kind,
        reply,
    }))
}

/// Run the completion chain for a message, or `None` when the kind is not handled.
async fn completion_text(
    state: &AppState,
    event: &MessageEvent,
) -> Result<Option<String>, RelayError> {
    let config = &state.config;
    let request = match &event.message {
        WebhookMessage::Text { id, text } => {
            tracing::debug!(message_id = %id, "text message");
            config
                .prompts
                .text_request(&config.model, config.max_tokens, text)
        }
        WebhookMessage::Image {
            id,
            content_provider,
        } => {
            tracing::debug!(message_id = %id, "image message");
            let content = state
                .line
                .fetch_content(id, content_provider.as_ref())
                .await?;
            let encoded = STANDARD.encode(&content.bytes);
            config
                .prompts
                .vision_request(&config.model, config.max_tokens, &content.mime, &encoded)
        }
        WebhookMessage::Unsupported => return Ok(None),
    };

    state.openai.complete(&request).await.map(Some)
}
