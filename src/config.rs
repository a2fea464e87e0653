use anyhow::{bail, Context, Result};
use std::time::Duration;

use crate::prompts::PromptConfig;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_LINE_API_BASE: &str = "https://api.line.me";
pub const DEFAULT_LINE_DATA_API_BASE: &str = "https://api-data.line.me";
pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

/// Runtime configuration for the relay.
///
/// Environment:
/// - LINE_ACCESS_TOKEN            (required) channel access token
/// - LINE_CHANNEL_SECRET          (required) webhook signing secret
/// - OPENAI_API_KEY               (required) completion API key
/// - OPENAI_BASE_URL              completion API base, default https://api.openai.com/v1
/// - OPENAI_MODEL                 default gpt-4o
/// - OPENAI_MAX_TOKENS            default 1000
/// - LINE_API_BASE                reply API base, default https://api.line.me
/// - LINE_DATA_API_BASE           content API base, default https://api-data.line.me
/// - KUMAO_HTTP_TIMEOUT_SECONDS   overall outbound request timeout (u64)
#[derive(Clone)]
pub struct RelayConfig {
    pub line_access_token: String,
    pub line_channel_secret: String,
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub line_api_base: String,
    pub line_data_api_base: String,
    pub model: String,
    pub max_tokens: u32,
    pub http_timeout: Option<Duration>,
    pub prompts: PromptConfig,
}

// Secrets stay out of logs.
impl std::fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayConfig")
            .field("openai_base_url", &self.openai_base_url)
            .field("line_api_base", &self.line_api_base)
            .field("line_data_api_base", &self.line_data_api_base)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("http_timeout", &self.http_timeout)
            .finish_non_exhaustive()
    }
}

impl RelayConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut missing: Vec<&'static str> = Vec::new();
        let line_access_token = get("LINE_ACCESS_TOKEN");
        if line_access_token.is_none() {
            missing.push("LINE_ACCESS_TOKEN");
        }
        let line_channel_secret = get("LINE_CHANNEL_SECRET");
        if line_channel_secret.is_none() {
            missing.push("LINE_CHANNEL_SECRET");
        }
        let openai_api_key = get("OPENAI_API_KEY");
        if openai_api_key.is_none() {
            missing.push("OPENAI_API_KEY");
        }
        if !missing.is_empty() {
            bail!("missing required environment variables: {}", missing.join(", "));
        }

        let max_tokens = match get("OPENAI_MAX_TOKENS") {
            Some(v) => v
                .parse::<u32>()
                .with_context(|| format!("OPENAI_MAX_TOKENS is not a number: {v}"))?,
            None => DEFAULT_MAX_TOKENS,
        };

        let http_timeout = match get("KUMAO_HTTP_TIMEOUT_SECONDS") {
            Some(v) => Some(Duration::from_secs(v.parse::<u64>().with_context(|| {
                format!("KUMAO_HTTP_TIMEOUT_SECONDS is not a number: {v}")
            })?)),
            None => None,
        };

        Ok(Self {
            line_access_token: line_access_token.unwrap_or_default(),
            line_channel_secret: line_channel_secret.unwrap_or_default(),
            openai_api_key: openai_api_key.unwrap_or_default(),
            openai_base_url: trim_base(get("OPENAI_BASE_URL"), DEFAULT_OPENAI_BASE_URL),
            line_api_base: trim_base(get("LINE_API_BASE"), DEFAULT_LINE_API_BASE),
            line_data_api_base: trim_base(get("LINE_DATA_API_BASE"), DEFAULT_LINE_DATA_API_BASE),
            model: get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_tokens,
            http_timeout,
            prompts: PromptConfig::default(),
        })
    }

    pub fn with_prompts(mut self, prompts: PromptConfig) -> Self {
        self.prompts = prompts;
        self
    }
}

fn trim_base(value: Option<String>, default: &str) -> String {
    value
        .unwrap_or_else(|| default.to_string())
        .trim_end_matches('/')
        .to_string()
}
