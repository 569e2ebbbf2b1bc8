//! Session types: the in-memory record of who is logged in.

use std::time::Duration;

use scriba_protocol::UserProfile;

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Configuration for session behavior.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// A persisted session older than this is discarded at startup.
    ///
    /// Default: 8 hours.
    pub max_persisted_age: Duration,

    /// Safety margin before the token's `exp` claim at which the token
    /// already counts as expired.
    ///
    /// Default: 30 seconds.
    pub expiry_skew: Duration,

    /// How often the expiry watch re-checks the token.
    ///
    /// Default: 60 seconds. Must be non-zero.
    pub expiry_check_interval: Duration,

    /// Storage key the session record is persisted under.
    pub storage_key: String,
}

impl SessionConfig {
    /// Clamp and fix any out-of-range values so the config is safe to use.
    ///
    /// Called automatically by `SessionManager::new`. A zero check
    /// interval would make the expiry watch spin, so it falls back to the
    /// default; an empty storage key falls back likewise.
    pub fn validated(mut self) -> Self {
        let defaults = Self::default();
        if self.expiry_check_interval.is_zero() {
            tracing::warn!("expiry_check_interval is zero, using default");
            self.expiry_check_interval = defaults.expiry_check_interval;
        }
        if self.storage_key.is_empty() {
            tracing::warn!("storage_key is empty, using default");
            self.storage_key = defaults.storage_key;
        }
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_persisted_age: Duration::from_secs(8 * 60 * 60),
            expiry_skew: Duration::from_secs(30),
            expiry_check_interval: Duration::from_secs(60),
            storage_key: "blog_auth".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// The authentication state of the client.
///
/// ```text
///   Anonymous ──(login / register)──→ Authenticated
///       ↑                                 │     │
///       │                      (token exp)│     │(logout / 401)
///       │                                 ▼     │
///       └────────(normalize)──────────  Expired │
///       └───────────────────────────────────────┘
/// ```
///
/// `Expired` is transient: the moment it is observed the session is
/// cleared, and every query answers as if `Anonymous`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticated,
    Expired,
}

impl SessionState {
    /// Only `Authenticated` may issue authorized requests.
    pub fn is_authenticated(self) -> bool {
        matches!(self, Self::Authenticated)
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// An established session.
///
/// Token and user travel together: there is no way to hold one without
/// the other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// The signed access token.
    pub token: String,
    /// The profile of the user the token was issued to.
    pub user: UserProfile,
}
