//! Error types for autosave.

use scriba_drafts::DraftError;

/// Errors reported by an [`AutosaveHandle`](crate::AutosaveHandle).
#[derive(Debug, thiserror::Error)]
pub enum AutosaveError {
    /// Persisting the coalesced content failed. The content stays
    /// pending and is retried on the next save opportunity.
    #[error(transparent)]
    Save(#[from] DraftError),

    /// The autosave task has stopped (cancelled or runtime shut down).
    #[error("autosave for this draft is no longer running")]
    Closed,
}
