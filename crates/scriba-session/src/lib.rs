//! Authentication session management for Scriba.
//!
//! This crate handles who the client is talking to the blog API as:
//!
//! 1. **Authentication**: exchanging credentials for a token ([`AuthGateway`] trait)
//! 2. **Session tracking**: holding, validating and persisting it ([`SessionManager`])
//! 3. **Authorization**: decorating outgoing requests and reacting to
//!    401/403 responses ([`RequestAuthorizer`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Drafts Layer (above)  ← asks the session who the current user is
//!     ↕
//! Session Layer (this crate)  ← token, profile, expiry, persistence
//!     ↕
//! Protocol + Storage (below)  ← token codec, clock, key/value store
//! ```

#![allow(async_fn_in_trait)]

mod auth;
mod authorizer;
mod error;
mod manager;
mod session;
mod store;
mod watch;

pub use auth::AuthGateway;
pub use authorizer::{Disposition, RequestAuthorizer};
pub use error::SessionError;
pub use manager::SessionManager;
pub use session::{Session, SessionConfig, SessionState};
pub use store::{PersistedSession, SessionStore};
pub use watch::ExpiryWatch;
