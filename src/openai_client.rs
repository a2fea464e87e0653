use crate::config::RelayConfig;
use crate::error::RelayError;
use crate::models::chat::{ChatCompletionRequest, ChatCompletionResponse};
use crate::util::ensure_success;

/// Client for the Chat Completions endpoint.
#[derive(Clone)]
pub struct CompletionClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl CompletionClient {
    pub fn new(http: reqwest::Client, config: &RelayConfig) -> Self {
        Self {
            http,
            base_url: config.openai_base_url.clone(),
            api_key: config.openai_api_key.clone(),
        }
    }

    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    /// POST a completion request and return the text of the first choice.
    pub async fn complete(&self, request: &ChatCompletionRequest) -> Result<String, RelayError> {
        let resp = self
            .http
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;
        let resp = ensure_success("openai", resp).await?;
        let body: ChatCompletionResponse = resp.json().await?;

        let usage = body.usage.as_ref();
        tracing::debug!(
            model = body.model.as_deref().unwrap_or(request.model.as_str()),
            finish_reason = body.finish_reason().unwrap_or(""),
            prompt_tokens = usage.map(|u| u.prompt_tokens),
            completion_tokens = usage.map(|u| u.completion_tokens),
            total_tokens = usage.map(|u| u.total_tokens),
            "completion finished"
        );

        body.first_text()
            .map(str::to_string)
            .ok_or(RelayError::EmptyCompletion)
    }
}
