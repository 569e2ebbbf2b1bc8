//! Error types for the protocol layer.
//!
//! Each crate in Scriba defines its own error enum. `TokenError` covers
//! the token codec; `GatewayError` is the common currency for remote
//! failures so that the session and draft layers can react to them
//! without knowing which transport produced them.

/// A token could not be decoded into usable claims.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// The token is not three dot-separated segments, or the payload
    /// segment is not valid base64url / JSON.
    #[error("malformed token: {0}")]
    Malformed(String),

    /// The payload decoded but carries no numeric `exp` claim.
    #[error("token has no numeric expiry claim")]
    MissingExpiry,

    /// The token decoded fine but its expiry (minus the safety skew) has
    /// already passed.
    #[error("token expired at {exp}")]
    Expired { exp: i64 },
}

/// A call to the remote blog API failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// The server rejected the credential (HTTP 401).
    #[error("unauthorized")]
    Unauthorized,

    /// The credential is valid but lacks permission (HTTP 403).
    #[error("forbidden")]
    Forbidden,

    /// The addressed resource does not exist (HTTP 404).
    #[error("resource not found")]
    NotFound,

    /// Any other non-success status.
    #[error("request rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },

    /// The request never produced a response (DNS, TLS, timeout, ...).
    #[error("transport failure: {0}")]
    Transport(String),

    /// The response arrived but its body could not be understood.
    #[error("malformed response: {0}")]
    Decode(String),
}

impl GatewayError {
    /// Classifies a non-success HTTP status.
    ///
    /// `message` is whatever diagnostic the server sent back; it is only
    /// kept for the catch-all variant.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        match status {
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            409 => Self::Rejected {
                status,
                message: "conflict: post was modified elsewhere".into(),
            },
            _ => Self::Rejected {
                status,
                message: message.into(),
            },
        }
    }

    /// Returns `true` for the 401-class failure that must end the session.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}
