//! Error model and the single normalization boundary.
//!
//! Every non-2xx backend response is converted to one [`ApiError`] here, with
//! the backend's human-readable `message` when the body carries one. Callers
//! never probe response bodies themselves.

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Login or refresh rejected by the backend. Never retried.
    #[error("invalid credentials: {message}")]
    Credential { message: String },

    /// Authentication failure (401). Recovered once via renewal by the
    /// pipeline; terminal when surfaced.
    #[error("authentication required: {message}")]
    Unauthorized { message: String },

    /// Authorization failure (403). Never recoverable locally.
    #[error("access denied: {message}")]
    Forbidden { message: String },

    /// Any other non-2xx response, including server faults.
    #[error("api error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Transport failure: connect error, timeout, broken stream.
    #[error("network error: {0}")]
    Network(String),

    /// A 2xx response whose body did not match the expected shape, or a
    /// request body that could not be serialized.
    #[error("unexpected payload: {0}")]
    Decode(String),

    /// Client construction failed (TLS backend, malformed defaults).
    #[error("client configuration error: {0}")]
    Config(String),
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Message suitable for display, regardless of variant.
    pub fn message(&self) -> String {
        match self {
            Self::Credential { message }
            | Self::Unauthorized { message }
            | Self::Forbidden { message } => message.clone(),
            Self::Api { message, .. } => message.clone(),
            Self::Network(m) | Self::Decode(m) | Self::Config(m) => m.clone(),
        }
    }
}

/// Shape of backend error bodies. The PetGet backend emits `{ message }`;
/// some gateways in front of it emit `{ error, message }`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Map a status and raw body to the error taxonomy. Pure so it is testable
/// without a live response.
pub(crate) fn normalize(status: StatusCode, body: &str) -> ApiError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message.or(b.error))
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });

    match status {
        StatusCode::UNAUTHORIZED => ApiError::Unauthorized { message },
        StatusCode::FORBIDDEN => ApiError::Forbidden { message },
        status => ApiError::Api {
            status: status.as_u16(),
            message,
        },
    }
}

/// Consume a non-2xx response into an [`ApiError`].
pub(crate) async fn from_response(response: reqwest::Response) -> ApiError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    normalize(status, &body)
}
