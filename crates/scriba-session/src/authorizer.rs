//! Outbound request authorization.
//!
//! Every call to the blog API passes through a [`RequestAuthorizer`]
//! twice: before sending, to get its `Authorization` header, and after
//! the response arrives, so that a 401 can end the session.

use std::sync::Arc;

use scriba_protocol::SessionAuthority;

/// What the caller should do after a response status was observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Nothing session-related happened.
    Proceed,
    /// The server rejected the credential (401). The session has already
    /// been ended; the caller surfaces the failure.
    SessionRevoked,
    /// The credential is valid but not allowed (403). The session is left
    /// as is and the caller surfaces the failure.
    Forbidden,
}

/// Decorates requests with the bearer token and reacts to auth failures.
#[derive(Clone)]
pub struct RequestAuthorizer {
    session: Arc<dyn SessionAuthority>,
}

impl RequestAuthorizer {
    pub fn new(session: Arc<dyn SessionAuthority>) -> Self {
        Self { session }
    }

    /// Login and register calls travel without a token.
    pub fn should_authorize(path: &str) -> bool {
        !path.split('/').any(|segment| segment == "auth")
    }

    /// `Bearer <token>`, or `None` when there is no valid token.
    ///
    /// Never yields an expired token: the session normalizes first.
    pub fn authorization_header(&self) -> Option<String> {
        self.session.bearer_token().map(|t| format!("Bearer {t}"))
    }

    /// Header for a request to `path`, applying both rules above.
    pub fn header_for(&self, path: &str) -> Option<String> {
        if Self::should_authorize(path) {
            self.authorization_header()
        } else {
            None
        }
    }

    /// Classifies a response status, ending the session on 401.
    pub fn observe(&self, status: u16) -> Disposition {
        match status {
            401 => {
                tracing::warn!(status, "unauthorized response, ending session");
                self.session.revoke();
                Disposition::SessionRevoked
            }
            403 => {
                tracing::warn!(status, "forbidden response, session kept");
                Disposition::Forbidden
            }
            _ => Disposition::Proceed,
        }
    }
}

impl std::fmt::Debug for RequestAuthorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestAuthorizer")
            .field("authenticated", &self.session.current_user().is_some())
            .finish()
    }
}
