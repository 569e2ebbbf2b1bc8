//! The seam between the session layer and everything that needs to know
//! who is logged in.

use crate::UserProfile;

/// Read access to the current session, plus the one write the outside
/// world is allowed to make: revoking it.
///
/// Implemented by `SessionManager`. The reconciliation engine only asks
/// for [`current_user`](Self::current_user); the request authorizer asks
/// for [`bearer_token`](Self::bearer_token) and calls
/// [`revoke`](Self::revoke) when the server answers 401.
///
/// Object safe so it can be shared as `Arc<dyn SessionAuthority>`.
pub trait SessionAuthority: Send + Sync {
    /// The profile of the authenticated user, or `None` when anonymous
    /// (an expired session counts as anonymous).
    fn current_user(&self) -> Option<UserProfile>;

    /// The access token, only if it is currently valid.
    fn bearer_token(&self) -> Option<String>;

    /// Drops the session, in memory and persisted.
    fn revoke(&self);
}
