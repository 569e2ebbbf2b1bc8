//! Error types for the session layer.

use scriba_protocol::{GatewayError, TokenError};

/// Errors that can occur during session management.
///
/// An expired session is deliberately absent: expiry is detected
/// internally and silently normalizes the session to anonymous.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The server rejected the credentials, or the auth call failed.
    /// The session is left as it was.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(#[source] GatewayError),

    /// The server answered with a token that fails local validation
    /// (malformed, no expiry claim, or already expired).
    #[error("server issued an unusable token: {0}")]
    InvalidToken(#[source] TokenError),

    /// The operation needs a logged-in user and there is none.
    #[error("no active session")]
    NoActiveSession,

    /// Re-fetching the profile of the current user failed. The previous
    /// profile is kept unless the failure was a 401.
    #[error("profile unavailable: {0}")]
    ProfileUnavailable(#[source] GatewayError),
}
