use anyhow::Context;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::RelayConfig;
use crate::error::RelayError;
use crate::line_client::LineClient;
use crate::openai_client::CompletionClient;

/// Initialize dotenv and structured tracing based on RUST_LOG.
/// - Supports an explicit env file path via ENV_FILE
/// - Falls back to standard `.env` discovery
/// - Logs the source used
pub fn init_tracing() {
    let mut env_source: String = "none".into();
    if let Ok(p) = std::env::var("ENV_FILE") {
        let p = p.trim();
        if !p.is_empty() && std::path::Path::new(p).is_file() && dotenvy::from_filename(p).is_ok()
        {
            env_source = format!("{p} (ENV_FILE)");
        }
    }
    if env_source == "none" {
        if let Ok(path) = dotenvy::dotenv() {
            env_source = path.display().to_string();
        }
    }

    // Initialize tracing (respects RUST_LOG potentially provided by the env file)
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=info".into());
    let subscriber = fmt().with_env_filter(EnvFilter::new(filter)).finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    tracing::info!("Environment loaded from: {}", env_source);
}

/// Get the bind address for the HTTP server from env or default to 0.0.0.0:3000.
pub fn env_bind_addr() -> String {
    std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into())
}

/// Build the shared outbound HTTP client.
///
/// Proxies come from the standard HTTP_PROXY / HTTPS_PROXY variables,
/// which reqwest honors by default.
pub fn build_http_client(config: &RelayConfig) -> anyhow::Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = config.http_timeout {
        builder = builder.timeout(timeout);
    }

    // User-Agent for observability
    builder = builder.user_agent(format!("kumao/{}", env!("CARGO_PKG_VERSION")));

    builder.build().context("failed to build outbound http client")
}

/// Shared application state used by the HTTP server and handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: RelayConfig,
    pub line: LineClient,
    pub openai: CompletionClient,
}

impl AppState {
    pub fn new(config: RelayConfig) -> anyhow::Result<Self> {
        let http = build_http_client(&config)?;
        Ok(Self {
            line: LineClient::new(http.clone(), &config),
            openai: CompletionClient::new(http, &config),
            config,
        })
    }
}

/// Build a JSON error response with the given HTTP status and message.
pub fn error_response(status: StatusCode, msg: &str) -> Response {
    let body = serde_json::json!({ "error": { "message": msg } });
    (status, axum::Json(body)).into_response()
}

/// Turn a non-2xx upstream response into `RelayError::Upstream`, keeping its body text.
pub async fn ensure_success(
    service: &'static str,
    resp: reqwest::Response,
) -> Result<reqwest::Response, RelayError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    tracing::warn!(service, status = %status, "upstream call failed");
    Err(RelayError::Upstream {
        service,
        status,
        body,
    })
}
