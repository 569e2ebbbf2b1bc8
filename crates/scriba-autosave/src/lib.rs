//! Debounced autosave for the draft editor.
//!
//! Editors call [`AutosaveHandle::edit`] on every keystroke. Changes are
//! coalesced over [`AutosaveConfig::debounce`] of inactivity and then
//! handed to a [`DraftSink`] (normally the reconciliation engine) once,
//! skipping the write if nothing changed since the last save.
//!
//! # Integration
//!
//! ```ignore
//! let handle = AutosaveHandle::spawn(engine.clone(), &draft, AutosaveConfig::default());
//! handle.edit("Title", "First paragraph")?;
//! // ... on navigation away:
//! handle.flush().await?;
//! drop(handle);
//! ```

mod actor;
mod config;
mod error;
mod sink;

pub use actor::{AutosaveHandle, FlushOutcome};
pub use config::{AutosaveConfig, MAX_DEBOUNCE};
pub use error::AutosaveError;
pub use sink::{DraftContent, DraftSink};
