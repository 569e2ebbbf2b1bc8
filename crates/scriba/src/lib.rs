//! # Scriba
//!
//! Session and draft reconciliation core for a personal blog client.
//!
//! Scriba keeps the two stateful pieces of a blog front end out of the
//! UI: the authenticated session (token, profile, expiry, persistence)
//! and the local drafts that are reconciled with the server's published
//! posts. The UI renders what [`BlogClient`] hands back and reports
//! edits to an autosave handle.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scriba::prelude::*;
//!
//! # async fn run() -> Result<(), ScribaError> {
//! let client = BlogClientBuilder::new()
//!     .http_config(HttpConfig::default().with_base_url("http://localhost:8080"))
//!     .build_http()?;
//!
//! client.login(&Credentials::new("ana", "secret")).await?;
//! let draft = client.create_draft()?;
//! let editor = client.open_editor(draft.id)?;
//! editor.edit("Hello", "First post")?;
//! editor.flush().await?;
//! client.publish(draft.id).await?;
//! # Ok(())
//! # }
//! ```

#![allow(async_fn_in_trait)]

mod client;
mod error;

pub use client::{BlogClient, BlogClientBuilder};
pub use error::ScribaError;

/// Re-exports of the layer crates for callers that need more than the
/// facade.
pub use scriba_autosave as autosave;
pub use scriba_drafts as drafts;
#[cfg(feature = "http")]
pub use scriba_http as http;
pub use scriba_protocol as protocol;
pub use scriba_session as session;
pub use scriba_storage as storage;

/// Everything an embedding application usually needs.
pub mod prelude {
    pub use crate::{BlogClient, BlogClientBuilder, ScribaError};

    pub use scriba_autosave::{AutosaveConfig, AutosaveHandle, FlushOutcome};
    pub use scriba_drafts::{DraftConfig, PostGateway};
    #[cfg(feature = "http")]
    pub use scriba_http::HttpConfig;
    pub use scriba_protocol::{
        Clock, Credentials, Draft, DraftId, DraftOrigin, GatewayError, Post, PostFields, PostId,
        PostKey, PublishedPost, Registration, SystemClock, UserId, UserProfile,
    };
    pub use scriba_session::{AuthGateway, SessionConfig, SessionState};
    pub use scriba_storage::{KeyValueStore, MemoryStorage};
    #[cfg(feature = "fs")]
    pub use scriba_storage::FileStorage;
}
