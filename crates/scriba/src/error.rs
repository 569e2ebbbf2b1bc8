//! Unified error type for Scriba.

use scriba_autosave::AutosaveError;
use scriba_drafts::DraftError;
#[cfg(feature = "http")]
use scriba_http::HttpError;
use scriba_protocol::{GatewayError, TokenError};
use scriba_session::SessionError;
use scriba_storage::StorageError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `scriba` facade you deal with this single error type
/// instead of importing errors from each layer. The `#[from]` attribute
/// on each variant lets `?` convert layer errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum ScribaError {
    /// Login, registration or profile refresh failed.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A draft operation failed.
    #[error(transparent)]
    Draft(#[from] DraftError),

    #[error(transparent)]
    Autosave(#[from] AutosaveError),

    /// The HTTP gateways could not be set up.
    #[cfg(feature = "http")]
    #[error(transparent)]
    Http(#[from] HttpError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Token(#[from] TokenError),

    /// A remote call failed outside any session or draft operation.
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl ScribaError {
    /// Returns `true` when the failure means the user has to log in
    /// (again) before retrying.
    pub fn requires_login(&self) -> bool {
        matches!(
            self,
            Self::Session(SessionError::NoActiveSession)
                | Self::Draft(DraftError::NoActiveSession)
                | Self::Gateway(GatewayError::Unauthorized)
                | Self::Draft(DraftError::PublishFailed(GatewayError::Unauthorized))
                | Self::Draft(DraftError::RemoteDeleteFailed(GatewayError::Unauthorized))
        )
    }
}

#[cfg(test)]
mod tests {
    use scriba_protocol::DraftId;

    use super::*;

    #[test]
    fn test_from_session_error() {
        let err: ScribaError = SessionError::NoActiveSession.into();
        assert!(matches!(err, ScribaError::Session(_)));
        assert_eq!(err.to_string(), "no active session");
    }

    #[test]
    fn test_from_draft_error() {
        let err: ScribaError = DraftError::DraftNotFound(DraftId(9)).into();
        assert!(matches!(err, ScribaError::Draft(_)));
        assert!(err.to_string().contains('9'));
    }

    #[test]
    fn test_from_autosave_error() {
        let err: ScribaError = AutosaveError::Closed.into();
        assert!(matches!(err, ScribaError::Autosave(_)));
    }

    #[test]
    fn test_from_token_error() {
        let err: ScribaError = TokenError::MissingExpiry.into();
        assert!(matches!(err, ScribaError::Token(_)));
    }

    #[test]
    fn test_requires_login_for_session_and_auth_failures() {
        assert!(ScribaError::from(DraftError::NoActiveSession).requires_login());
        assert!(
            ScribaError::from(DraftError::PublishFailed(GatewayError::Unauthorized))
                .requires_login()
        );
        assert!(
            !ScribaError::from(DraftError::PublishFailed(GatewayError::Forbidden))
                .requires_login()
        );
        assert!(!ScribaError::from(DraftError::DraftNotFound(DraftId(1))).requires_login());
    }
}
