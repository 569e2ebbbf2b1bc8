//! [`AuthGateway`] over HTTP.

use reqwest::Method;
use scriba_protocol::{Credentials, GatewayError, Registration, UserProfile};
use scriba_session::AuthGateway;

use crate::ApiClient;
use crate::wire::AuthResponse;

/// Login, registration and profile lookup against `/api/auth` and
/// `/api/usuario`.
///
/// Does not go through the request authorizer: auth endpoints carry no
/// token, and the profile lookup is authorized with the token passed in
/// by the session manager.
#[derive(Debug, Clone)]
pub struct HttpAuthGateway {
    api: ApiClient,
}

impl HttpAuthGateway {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    async fn exchange<B: serde::Serialize + ?Sized>(
        &self,
        action: &str,
        body: &B,
    ) -> Result<String, GatewayError> {
        let url = self.api.endpoint(&["api", "auth", action]);
        let response = ApiClient::send(self.api.request(Method::POST, url, None).json(body)).await?;
        let auth: AuthResponse = ApiClient::parse_response(response).await?;

        tracing::debug!(action, expiration = ?auth.expiration, "token issued");
        Ok(auth.token)
    }
}

impl AuthGateway for HttpAuthGateway {
    async fn login(&self, credentials: &Credentials) -> Result<String, GatewayError> {
        self.exchange("login", credentials).await
    }

    async fn register(&self, registration: &Registration) -> Result<String, GatewayError> {
        self.exchange("register", registration).await
    }

    async fn fetch_user_profile(
        &self,
        token: &str,
        handle: &str,
    ) -> Result<UserProfile, GatewayError> {
        let url = self
            .api
            .endpoint(&["api", "usuario", "buscar-por-usuario", handle]);
        let request = self
            .api
            .request(Method::GET, url, None)
            .bearer_auth(token);

        let response = ApiClient::send(request).await?;
        ApiClient::parse_response(response).await
    }
}
