use axum::response::{IntoResponse, Response};
use http::StatusCode;
use thiserror::Error;

use crate::util::error_response;

/// Errors raised while handling a webhook delivery.
///
/// There is no fallback reply to the user: any of these fails the whole
/// webhook request and the platform sees a non-2xx status.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The `x-line-signature` header was absent.
    #[error("missing x-line-signature header")]
    MissingSignature,

    /// The signature did not match the request body.
    #[error("invalid webhook signature")]
    InvalidSignature,

    /// Body was not a webhook payload.
    #[error("invalid webhook payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),

    /// An upstream API answered with a non-success status.
    #[error("{service} returned {status}: {body}")]
    Upstream {
        service: &'static str,
        status: StatusCode,
        body: String,
    },

    /// Transport-level failure talking to an upstream API.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The completion response carried no text in its first choice.
    #[error("completion returned no text")]
    EmptyCompletion,
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingSignature | Self::InvalidSignature => StatusCode::UNAUTHORIZED,
            Self::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            Self::Upstream { .. } | Self::Http(_) | Self::EmptyCompletion => {
                StatusCode::BAD_GATEWAY
            }
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        error_response(self.status(), &self.to_string())
    }
}
