//! The session manager: the single source of truth for "am I logged in".
//!
//! It owns the in-memory [`Session`], keeps the persisted copy in step
//! with it, and answers every token or identity query. Expiry is never
//! reported as an error: whichever call first notices that the token has
//! passed its expiry clears the session, and from then on the client is
//! simply anonymous.
//!
//! # Concurrency note
//!
//! All methods take `&self`. The session sits behind a plain
//! `std::sync::Mutex` that is only held for short synchronous sections
//! (never across an `.await`), so the manager can be shared as an `Arc`
//! between the UI, the request authorizer and the expiry watch.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use scriba_protocol::token;
use scriba_protocol::{
    Clock, Credentials, Registration, SessionAuthority, TokenError, UserProfile,
};
use scriba_storage::KeyValueStore;

use crate::store::SessionStore;
use crate::watch::ExpiryWatch;
use crate::{AuthGateway, Session, SessionConfig, SessionError, SessionState};

/// Owns the authentication session of the client.
///
/// ## Lifecycle
///
/// ```text
/// new() ──(restore)──→ [Authenticated] ──(token expires)──→ [Anonymous]
///   │                        ↑    │
///   ▼                        │    └──(logout / 401)──→ [Anonymous]
/// [Anonymous] ──(login / register)┘
/// ```
pub struct SessionManager<A> {
    gateway: A,
    store: SessionStore,
    clock: Arc<dyn Clock>,
    config: SessionConfig,
    /// `Some` exactly while a token and its user are held.
    current: Mutex<Option<Session>>,
}

impl<A: AuthGateway> SessionManager<A> {
    /// Creates a manager and restores any persisted session.
    ///
    /// A saved session that is too old or whose token has expired is
    /// discarded silently and the manager starts anonymous.
    pub fn new(
        gateway: A,
        storage: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        config: SessionConfig,
    ) -> Self {
        let config = config.validated();
        let store = SessionStore::new(
            storage,
            clock.clone(),
            config.storage_key.clone(),
            config.max_persisted_age,
        );

        let manager = Self {
            gateway,
            store,
            clock,
            config,
            current: Mutex::new(None),
        };
        manager.restore();
        manager
    }

    fn restore(&self) {
        let Some(record) = self.store.load() else {
            return;
        };

        if self.token_expired(&record.token) {
            tracing::info!(user = %record.user, "persisted session token expired, discarded");
            self.store.clear();
            return;
        }

        tracing::info!(user = %record.user, "session restored");
        *self.lock() = Some(Session {
            token: record.token,
            user: record.user,
        });
    }

    // -----------------------------------------------------------------------
    // Login / register / logout
    // -----------------------------------------------------------------------

    /// Exchanges credentials for a token and establishes a session.
    ///
    /// # Errors
    /// - [`SessionError::AuthenticationFailed`]: the gateway refused
    /// - [`SessionError::InvalidToken`]: the returned token is unusable
    ///
    /// On error the current session, if any, is left untouched.
    pub async fn login(&self, credentials: &Credentials) -> Result<UserProfile, SessionError> {
        tracing::debug!(handle = %credentials.handle, "login attempt");

        let token = self.gateway.login(credentials).await.map_err(|e| {
            tracing::warn!(handle = %credentials.handle, error = %e, "login rejected");
            SessionError::AuthenticationFailed(e)
        })?;

        self.establish(token, &credentials.handle).await
    }

    /// Creates an account and logs into it. Same shape as [`login`](Self::login).
    pub async fn register(
        &self,
        registration: &Registration,
    ) -> Result<UserProfile, SessionError> {
        tracing::debug!(handle = %registration.handle, "registration attempt");

        let token = self.gateway.register(registration).await.map_err(|e| {
            tracing::warn!(handle = %registration.handle, error = %e, "registration rejected");
            SessionError::AuthenticationFailed(e)
        })?;

        self.establish(token, &registration.handle).await
    }

    /// Validates a freshly issued token, resolves the profile and swaps
    /// the new session in.
    async fn establish(&self, token: String, handle: &str) -> Result<UserProfile, SessionError> {
        let claims = token::decode(&token).map_err(|e| {
            tracing::warn!(handle, error = %e, "server issued a malformed token");
            SessionError::InvalidToken(e)
        })?;
        if self.token_expired(&token) {
            tracing::warn!(handle, exp = claims.exp, "server issued an expired token");
            return Err(SessionError::InvalidToken(TokenError::Expired { exp: claims.exp }));
        }

        // The credentials are already proven; a failed profile lookup
        // downgrades to a placeholder instead of failing the login.
        let user = match self.gateway.fetch_user_profile(&token, handle).await {
            Ok(profile) => profile,
            Err(e) => {
                tracing::warn!(handle, error = %e, "profile fetch failed, using placeholder");
                UserProfile::placeholder(handle)
            }
        };

        {
            let mut current = self.lock();
            if let Some(previous) = current.as_ref() {
                tracing::debug!(previous = %previous.user, "replacing existing session");
            }
            self.store.save(&token, &user);
            *current = Some(Session {
                token,
                user: user.clone(),
            });
        }

        tracing::info!(%user, exp = claims.exp, "session established");
        Ok(user)
    }

    /// Ends the session and clears the persisted copy. Idempotent.
    pub fn logout(&self) {
        let mut current = self.lock();
        let ended = current.take();
        self.store.clear();
        drop(current);

        match ended {
            Some(session) => tracing::info!(user = %session.user, "logged out"),
            None => tracing::debug!("logout with no active session"),
        }
    }

    /// Re-fetches the current user's profile and persists it alongside
    /// the existing token.
    ///
    /// # Errors
    /// - [`SessionError::NoActiveSession`]: nobody is logged in, or the
    ///   session ended or was replaced while the profile was in flight
    /// - [`SessionError::ProfileUnavailable`]: the fetch failed; the old
    ///   profile is kept, except on a 401, which also ends the session
    pub async fn refresh_user_data(&self) -> Result<UserProfile, SessionError> {
        let session = self.active().ok_or(SessionError::NoActiveSession)?;

        let result = self
            .gateway
            .fetch_user_profile(&session.token, &session.user.handle)
            .await;

        match result {
            Ok(user) => {
                let mut current = self.lock();
                match current.as_mut() {
                    Some(active) if active.token == session.token => {
                        self.store.save(&active.token, &user);
                        active.user = user.clone();
                        tracing::debug!(%user, "profile refreshed");
                        Ok(user)
                    }
                    // Logged out or replaced while the fetch was in flight.
                    _ => {
                        tracing::debug!(%user, "session changed during refresh, profile not applied");
                        Err(SessionError::NoActiveSession)
                    }
                }
            }
            Err(e) if e.is_unauthorized() => {
                tracing::warn!(user = %session.user, "profile refresh unauthorized, ending session");
                self.end_if_current(&session.token);
                Err(SessionError::ProfileUnavailable(e))
            }
            Err(e) => {
                tracing::warn!(user = %session.user, error = %e, "profile refresh failed");
                Err(SessionError::ProfileUnavailable(e))
            }
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// The access token, only while it is still valid.
    pub fn token(&self) -> Option<String> {
        self.active().map(|s| s.token)
    }

    /// The logged-in user, only while the token is still valid.
    pub fn current_user(&self) -> Option<UserProfile> {
        self.active().map(|s| s.user)
    }

    pub fn is_authenticated(&self) -> bool {
        self.state().is_authenticated()
    }

    /// Current state. An expired session is normalized first, so this
    /// never returns [`SessionState::Expired`].
    pub fn state(&self) -> SessionState {
        match self.check_expiry() {
            SessionState::Expired => SessionState::Anonymous,
            state => state,
        }
    }

    /// Guard for operations that need a logged-in user.
    pub fn require_authenticated(&self) -> Result<UserProfile, SessionError> {
        self.current_user().ok_or(SessionError::NoActiveSession)
    }

    /// Checks the token against the clock, ending the session if it has
    /// expired.
    ///
    /// Returns [`SessionState::Expired`] only on the call that performed
    /// the transition; later calls see `Anonymous`.
    pub fn check_expiry(&self) -> SessionState {
        let mut current = self.lock();

        let expired = match current.as_ref() {
            None => return SessionState::Anonymous,
            Some(session) => self.token_expired(&session.token),
        };
        if !expired {
            return SessionState::Authenticated;
        }

        let ended = current.take();
        self.store.clear();
        drop(current);

        if let Some(session) = ended {
            tracing::info!(user = %session.user, "session expired");
        }
        SessionState::Expired
    }

    /// Starts a background task that runs [`check_expiry`](Self::check_expiry)
    /// every `expiry_check_interval`.
    ///
    /// Must be called from within a Tokio runtime. The task holds only a
    /// weak reference, so it never keeps the manager alive.
    pub fn spawn_expiry_watch(self: &Arc<Self>) -> ExpiryWatch {
        ExpiryWatch::spawn(Arc::downgrade(self), self.config.expiry_check_interval)
    }

    /// The gateway this manager authenticates through.
    pub fn gateway(&self) -> &A {
        &self.gateway
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    /// Snapshot of the session after normalizing expiry.
    fn active(&self) -> Option<Session> {
        if self.check_expiry() != SessionState::Authenticated {
            return None;
        }
        self.lock().clone()
    }

    /// Ends the session only if it still holds `token`.
    fn end_if_current(&self, token: &str) {
        let mut current = self.lock();
        if current.as_ref().is_some_and(|s| s.token == token) {
            current.take();
            self.store.clear();
        }
    }

    fn token_expired(&self, token: &str) -> bool {
        token::is_expired(token, self.clock.now_millis(), self.config.expiry_skew)
    }

    fn lock(&self) -> MutexGuard<'_, Option<Session>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<A: AuthGateway> SessionAuthority for SessionManager<A> {
    fn current_user(&self) -> Option<UserProfile> {
        SessionManager::current_user(self)
    }

    fn bearer_token(&self) -> Option<String> {
        self.token()
    }

    fn revoke(&self) {
        tracing::warn!("session revoked by the remote gateway");
        self.logout();
    }
}
