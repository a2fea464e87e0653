use serde::{Deserialize, Serialize};

/// Maximum length of a LINE text message, in characters.
pub const MAX_TEXT_LENGTH: usize = 5000;

/// Webhook request body delivered by the LINE platform.
///
/// Example:
/// {
///   "destination": "U0123...",
///   "events": [ { "type": "message", "replyToken": "...", "message": { ... } } ]
/// }
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub events: Vec<WebhookEvent>,
}

/// A single webhook event.
///
/// Only `message` events are acted upon; follow, unfollow, postback, join
/// and any event type added to the platform later land in `Other`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WebhookEvent {
    Message(MessageEvent),
    #[serde(other)]
    Other,
}

/// Message event payload (user sent something to the bot).
///
/// `replyToken` is absent when the channel is in standby mode.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageEvent {
    #[serde(default)]
    pub reply_token: Option<String>,
    pub message: WebhookMessage,
    #[serde(default)]
    pub webhook_event_id: Option<String>,
}

/// Message object inside a message event.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WebhookMessage {
    Text {
        id: String,
        text: String,
    },
    Image {
        id: String,
        #[serde(default, rename = "contentProvider")]
        content_provider: Option<ContentProvider>,
    },
    /// Stickers, video, audio, location, file.
    #[serde(other)]
    Unsupported,
}

impl WebhookMessage {
    /// Short label used in logs and webhook results.
    pub fn kind(&self) -> &'static str {
        match self {
            WebhookMessage::Text { .. } => "text",
            WebhookMessage::Image { .. } => "image",
            WebhookMessage::Unsupported => "unsupported",
        }
    }
}

/// Where the binary content of an image message is stored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentProvider {
    /// Hosted by LINE; fetched through the content API.
    Line,
    /// Sent through the Messaging API with a public URL.
    External {
        #[serde(rename = "originalContentUrl")]
        original_content_url: String,
        #[serde(default, rename = "previewImageUrl")]
        preview_image_url: Option<String>,
    },
}

/// Body of `POST /v2/bot/message/reply`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyRequest {
    pub reply_token: String,
    pub messages: Vec<ReplyMessage>,
}

impl ReplyRequest {
    /// Single text reply, truncated to the platform's text length limit.
    pub fn text(reply_token: impl Into<String>, text: &str) -> Self {
        Self {
            reply_token: reply_token.into(),
            messages: vec![ReplyMessage::Text {
                text: truncate_chars(text, MAX_TEXT_LENGTH),
            }],
        }
    }
}

/// Outbound message object (only text is sent by the relay).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ReplyMessage {
    Text { text: String },
}

fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}
