//! Wire models for the two APIs the relay sits between.
//!
//! - `line`: LINE Messaging API webhook envelope, events and the reply request.
//! - `chat`: the subset of OpenAI Chat Completions used for text and vision prompts.
//!
//! Building completion requests from events lives in `crate::prompts`.

pub mod chat;
pub mod line;

pub use chat::{
    ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ContentPart, ImageUrl,
    MessageContent, Role,
};
pub use line::{
    ContentProvider, MessageEvent, ReplyMessage, ReplyRequest, WebhookEvent, WebhookMessage,
    WebhookPayload,
};
