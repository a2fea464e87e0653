#![allow(dead_code)]

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// Bytes served for every image download.
pub const IMAGE_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nstub-image";

/// One call received by the stub, in arrival order.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub endpoint: Endpoint,
    pub path: String,
    pub authorization: Option<String>,
    pub body: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Content,
    External,
    Completion,
    Reply,
}

/// How the fake completions endpoint answers.
#[derive(Clone)]
pub enum CompletionBehavior {
    /// Echo `answer: <user text>` (or `answer: image` for multimodal input).
    Echo,
    /// Echo after sleeping.
    Delayed(Duration),
    NoChoices,
    Error {
        status: StatusCode,
        body: serde_json::Value,
    },
    /// Pick a behavior by the user text of the request; unmatched text echoes.
    ByUserText(Vec<(String, CompletionBehavior)>),
}

/// How the fake content and reply endpoints answer.
#[derive(Clone, Copy, Default)]
pub enum LineBehavior {
    #[default]
    Ok,
    Error(StatusCode),
}

#[derive(Clone)]
pub struct StubConfig {
    pub completion: CompletionBehavior,
    pub content: LineBehavior,
    pub reply: LineBehavior,
}

impl Default for StubConfig {
    fn default() -> Self {
        Self {
            completion: CompletionBehavior::Echo,
            content: LineBehavior::Ok,
            reply: LineBehavior::Ok,
        }
    }
}

/// In-process stand-in for the LINE content/reply APIs and the completions API.
#[derive(Clone)]
pub struct UpstreamStub {
    base_url: String,
    calls: Arc<Mutex<Vec<Recorded>>>,
    shutdown: Arc<Mutex<Option<oneshot::Sender<()>>>>,
}

#[derive(Clone)]
struct StubState {
    config: StubConfig,
    calls: Arc<Mutex<Vec<Recorded>>>,
}

impl StubState {
    fn record(
        &self,
        endpoint: Endpoint,
        path: String,
        headers: &HeaderMap,
        body: Option<serde_json::Value>,
    ) {
        let authorization = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        if let Ok(mut guard) = self.calls.lock() {
            guard.push(Recorded {
                endpoint,
                path,
                authorization,
                body,
            });
        }
    }
}

impl UpstreamStub {
    pub async fn start(completion: CompletionBehavior) -> Self {
        Self::start_with(StubConfig {
            completion,
            ..StubConfig::default()
        })
        .await
    }

    pub async fn start_with(config: StubConfig) -> Self {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let state = Arc::new(StubState {
            config,
            calls: calls.clone(),
        });

        let router = Router::new()
            .route("/v2/bot/message/:id/content", get(content_handler))
            .route("/v2/bot/message/reply", post(reply_handler))
            .route("/external/:name", get(external_handler))
            .route("/v1/chat/completions", post(completion_handler))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind upstream stub");
        let addr = listener.local_addr().expect("upstream stub local addr");
        let (tx, rx) = oneshot::channel::<()>();

        let server = axum::serve(listener, router.into_make_service());
        tokio::spawn(async move {
            tokio::select! {
                res = server => {
                    if let Err(err) = res {
                        eprintln!("Upstream stub server error: {err:?}");
                    }
                }
                _ = rx => {}
            }
        });

        UpstreamStub {
            base_url: format!("http://{}", addr),
            calls,
            shutdown: Arc::new(Mutex::new(Some(tx))),
        }
    }

    pub fn url(&self) -> String {
        self.base_url.clone()
    }

    pub fn calls(&self) -> Vec<Recorded> {
        self.calls.lock().expect("lock stub calls").clone()
    }

    pub fn calls_to(&self, endpoint: Endpoint) -> Vec<Recorded> {
        self.calls()
            .into_iter()
            .filter(|c| c.endpoint == endpoint)
            .collect()
    }
}

impl Drop for UpstreamStub {
    fn drop(&mut self) {
        if let Ok(mut guard) = self.shutdown.lock() {
            if let Some(tx) = guard.take() {
                let _ = tx.send(());
            }
        }
    }
}

async fn content_handler(
    State(state): State<Arc<StubState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    state.record(
        Endpoint::Content,
        format!("/v2/bot/message/{id}/content"),
        &headers,
        None,
    );
    if let LineBehavior::Error(status) = state.config.content {
        return (status, Json(serde_json::json!({ "message": "Not found" }))).into_response();
    }
    ([(header::CONTENT_TYPE, "image/png")], IMAGE_BYTES).into_response()
}

async fn external_handler(
    State(state): State<Arc<StubState>>,
    Path(name): Path<String>,
    headers: HeaderMap,
) -> Response {
    state.record(Endpoint::External, format!("/external/{name}"), &headers, None);
    ([(header::CONTENT_TYPE, "image/jpeg")], IMAGE_BYTES).into_response()
}

async fn reply_handler(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Response {
    state.record(
        Endpoint::Reply,
        "/v2/bot/message/reply".to_string(),
        &headers,
        Some(body),
    );
    if let LineBehavior::Error(status) = state.config.reply {
        return (
            status,
            Json(serde_json::json!({ "message": "Invalid reply token" })),
        )
            .into_response();
    }
    Json(serde_json::json!({ "sentMessages": [ { "id": "461230966842064897" } ] })).into_response()
}

async fn completion_handler(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Response {
    state.record(
        Endpoint::Completion,
        "/v1/chat/completions".to_string(),
        &headers,
        Some(body.clone()),
    );

    let user = body["messages"]
        .as_array()
        .and_then(|msgs| msgs.iter().rev().find(|m| m["role"] == "user"))
        .map(|m| match m["content"].as_str() {
            Some(s) => s.to_string(),
            None => "image".to_string(),
        })
        .unwrap_or_default();

    let behavior = match &state.config.completion {
        CompletionBehavior::ByUserText(rules) => rules
            .iter()
            .find(|(text, _)| *text == user)
            .map(|(_, b)| b.clone())
            .unwrap_or(CompletionBehavior::Echo),
        other => other.clone(),
    };

    match behavior {
        CompletionBehavior::Echo | CompletionBehavior::ByUserText(_) => echo(&body, &user),
        CompletionBehavior::Delayed(delay) => {
            tokio::time::sleep(delay).await;
            echo(&body, &user)
        }
        CompletionBehavior::NoChoices => {
            Json(serde_json::json!({ "id": "chatcmpl-empty", "choices": [] })).into_response()
        }
        CompletionBehavior::Error { status, body } => (status, Json(body)).into_response(),
    }
}

fn echo(body: &serde_json::Value, user: &str) -> Response {
    Json(serde_json::json!({
        "id": "chatcmpl-stub",
        "object": "chat.completion",
        "model": body["model"],
        "choices": [
            {
                "index": 0,
                "message": { "role": "assistant", "content": format!("answer: {user}") },
                "finish_reason": "stop"
            }
        ],
        "usage": { "prompt_tokens": 10, "completion_tokens": 3, "total_tokens": 13 }
    }))
    .into_response()
}
