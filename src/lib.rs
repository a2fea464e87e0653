#![forbid(unsafe_code)]
#![doc = r#"
Kumao

LINE Messaging API webhook relay. Text messages are answered with an OpenAI Chat
Completions reply; image messages are downloaded, embedded as base64 and answered
with a vision completion.

Crate highlights
- HTTP server (in `server`): `POST /webhook` (signed LINE deliveries) and `GET /status`.
- Handler: one independent request chain per event, events of a delivery run concurrently.
- Models: LINE webhook/reply shapes and the Chat Completions subset the relay sends.

Modules
- `config`: Environment-driven configuration.
- `prompts`: Fixed prompts and completion request building.
- `signature`: `x-line-signature` verification.
- `line_client` / `openai_client`: Outbound API calls.
- `handler`: Text and image chains.
- `server`: Axum router/handlers.
- `util`: Shared helpers (tracing, env, HTTP client, error responses).
"#]

pub mod config;
pub mod error;
pub mod handler;
pub mod line_client;
pub mod models;
pub mod openai_client;
pub mod prompts;
pub mod server;
pub mod signature;
pub mod util;

pub use crate::config::RelayConfig;
pub use crate::error::RelayError;
pub use crate::server::build_router;
