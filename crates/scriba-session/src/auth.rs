//! The remote authentication gateway.
//!
//! Scriba doesn't issue tokens or store accounts. The blog API does.
//! The session manager talks to it through the [`AuthGateway`] trait, so
//! production code can plug in the HTTP client while tests plug in a
//! scripted fake.

use scriba_protocol::{Credentials, GatewayError, Registration, UserProfile};

/// Exchanges credentials for tokens and looks up profiles.
///
/// # Trait bounds
///
/// - `Send + Sync` → the gateway is shared with the expiry watch task.
/// - `'static` → it lives as long as the session manager that owns it.
pub trait AuthGateway: Send + Sync + 'static {
    /// Exchanges login credentials for a signed access token.
    ///
    /// # Returns
    /// - `Ok(token)`: credentials accepted
    /// - `Err(GatewayError::Unauthorized)`: bad credentials
    fn login(
        &self,
        credentials: &Credentials,
    ) -> impl std::future::Future<Output = Result<String, GatewayError>> + Send;

    /// Creates an account and returns a signed access token for it.
    fn register(
        &self,
        registration: &Registration,
    ) -> impl std::future::Future<Output = Result<String, GatewayError>> + Send;

    /// Fetches the full profile for `handle`, authorized with `token`.
    ///
    /// The token is passed explicitly because during login it belongs to
    /// a session that is not established yet.
    fn fetch_user_profile(
        &self,
        token: &str,
        handle: &str,
    ) -> impl std::future::Future<Output = Result<UserProfile, GatewayError>> + Send;
}
