//! Local drafts and their reconciliation with published posts.
//!
//! - [`DraftStore`]: per-user JSON collections of drafts in a
//!   [`KeyValueStore`](scriba_storage::KeyValueStore)
//! - [`PostGateway`]: the remote side, where published posts live
//! - [`ReconciliationEngine`]: merged listing, new and edit drafts,
//!   publishing, deletion and stale-draft cleanup
//!
//! # How it fits in the stack
//!
//! ```text
//! UI / autosave (above)  ← every post read and write goes through the engine
//!     ↕
//! Drafts Layer (this crate)  ← asks the session only "who is the user?"
//!     ↕
//! Protocol + Storage (below)
//! ```

#![allow(async_fn_in_trait)]

mod config;
mod engine;
mod error;
mod gateway;
mod id;
mod store;

pub use config::DraftConfig;
pub use engine::ReconciliationEngine;
pub use error::DraftError;
pub use gateway::PostGateway;
pub use id::DraftIdGenerator;
pub use store::DraftStore;
