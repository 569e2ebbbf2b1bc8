//! Error types for the drafts layer.

use scriba_protocol::{DraftId, GatewayError};
use scriba_storage::StorageError;

/// Errors that can occur during draft and post operations.
///
/// Read-side problems never show up here: a corrupt draft collection
/// reads as empty and a failed published-post listing degrades to local
/// drafts only.
#[derive(Debug, thiserror::Error)]
pub enum DraftError {
    /// No user identity is available to namespace drafts under, or a
    /// remote operation was attempted while anonymous.
    #[error("no active session")]
    NoActiveSession,

    /// The id does not resolve to a stored draft of the current user.
    #[error("draft {0} not found")]
    DraftNotFound(DraftId),

    /// Writing the draft collection failed, or it could not be read back
    /// to apply the change. The draft is not saved.
    #[error("draft could not be persisted: {0}")]
    StoragePersistFailed(#[source] StorageError),

    /// Creating or updating the remote post failed. The draft is kept.
    #[error("publish failed: {0}")]
    PublishFailed(#[source] GatewayError),

    /// Deleting the remote post failed. Nothing local was changed.
    #[error("remote delete failed: {0}")]
    RemoteDeleteFailed(#[source] GatewayError),
}
