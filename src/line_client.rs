use bytes::Bytes;
use http::header;

use crate::config::RelayConfig;
use crate::error::RelayError;
use crate::models::line::{ContentProvider, ReplyRequest};
use crate::util::ensure_success;

/// Fallback when the content API does not declare a usable image type.
pub const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

/// Binary message content downloaded from the platform.
#[derive(Debug, Clone)]
pub struct MessageContent {
    pub bytes: Bytes,
    pub mime: String,
}

/// Thin client over the two LINE Messaging API endpoints the relay uses.
#[derive(Clone)]
pub struct LineClient {
    http: reqwest::Client,
    api_base: String,
    data_api_base: String,
    access_token: String,
}

impl LineClient {
    pub fn new(http: reqwest::Client, config: &RelayConfig) -> Self {
        Self {
            http,
            api_base: config.line_api_base.clone(),
            data_api_base: config.line_data_api_base.clone(),
            access_token: config.line_access_token.clone(),
        }
    }

    /// URL of the content endpoint for a message id.
    pub fn content_url(&self, message_id: &str) -> String {
        format!(
            "{}/v2/bot/message/{}/content",
            self.data_api_base, message_id
        )
    }

    /// Download the binary content of an image message.
    ///
    /// LINE-hosted content goes through the content API with the channel
    /// bearer token; `external` content is fetched from its public URL.
    pub async fn fetch_content(
        &self,
        message_id: &str,
        provider: Option<&ContentProvider>,
    ) -> Result<MessageContent, RelayError> {
        let rb = match provider {
            Some(ContentProvider::External {
                original_content_url,
                ..
            }) => self.http.get(original_content_url),
            Some(ContentProvider::Line) | None => self
                .http
                .get(self.content_url(message_id))
                .bearer_auth(&self.access_token),
        };

        let resp = ensure_success("line content", rb.send().await?).await?;
        let mime = image_mime(
            resp.headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok()),
        );
        let bytes = resp.bytes().await?;
        tracing::debug!(message_id, mime = %mime, size = bytes.len(), "fetched message content");
        Ok(MessageContent { bytes, mime })
    }

    /// Send a reply through `POST /v2/bot/message/reply`, returning the API's JSON body.
    pub async fn reply(&self, request: &ReplyRequest) -> Result<serde_json::Value, RelayError> {
        let url = format!("{}/v2/bot/message/reply", self.api_base);
        let resp = self
            .http
            .post(url)
            .bearer_auth(&self.access_token)
            .json(request)
            .send()
            .await?;
        let resp = ensure_success("line reply", resp).await?;
        let body = resp.bytes().await?;
        Ok(reply_body(&body))
    }
}

/// Decode the reply API's response body.
///
/// The reply has already been delivered at this point, so an empty or
/// undecodable body maps to `{}` instead of failing the event.
fn reply_body(body: &[u8]) -> serde_json::Value {
    if body.is_empty() {
        return serde_json::json!({});
    }
    match serde_json::from_slice(body) {
        Ok(v) => v,
        Err(e) => {
            tracing::debug!(
                error = %e,
                body = %String::from_utf8_lossy(body),
                "reply API returned a non-JSON body"
            );
            serde_json::json!({})
        }
    }
}

/// Pick the MIME type for the data URL from a `Content-Type` header value.
fn image_mime(content_type: Option<&str>) -> String {
    content_type
        .and_then(|ct| ct.split(';').next())
        .map(|ct| ct.trim().to_ascii_lowercase())
        .filter(|ct| ct.starts_with("image/"))
        .unwrap_or_else(|| DEFAULT_IMAGE_MIME.to_string())
}
