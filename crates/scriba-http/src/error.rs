//! Error types for the HTTP layer.

use scriba_protocol::GatewayError;

/// Errors raised while setting up an HTTP gateway.
///
/// Per-request failures are reported as [`GatewayError`] so the session
/// and drafts layers can react to them without knowing about HTTP.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    /// The configured base URL is not an absolute http(s) URL.
    #[error("invalid base url {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// The underlying HTTP client could not be built (TLS backend, etc.).
    #[error("HTTP client could not be built: {0}")]
    Client(#[from] reqwest::Error),
}

/// Classifies a failed `reqwest` call.
pub(crate) fn gateway_error(e: reqwest::Error) -> GatewayError {
    if e.is_decode() {
        GatewayError::Decode(e.to_string())
    } else if let Some(status) = e.status() {
        GatewayError::from_status(status.as_u16(), e.to_string())
    } else {
        GatewayError::Transport(e.to_string())
    }
}
