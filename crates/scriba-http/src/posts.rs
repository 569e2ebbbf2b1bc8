//! [`PostGateway`] over HTTP.

use reqwest::{Method, Url};
use scriba_drafts::PostGateway;
use scriba_protocol::{GatewayError, PostFields, PostId, PublishedPost, UserProfile};
use scriba_session::{Disposition, RequestAuthorizer};

use crate::ApiClient;
use crate::wire::PostResponse;

/// CRUD on `/api/postagens`, authorized by the current session.
///
/// Every request carries the header the [`RequestAuthorizer`] hands out,
/// and every response status is reported back to it, so a 401 from any
/// post endpoint ends the session.
#[derive(Debug, Clone)]
pub struct HttpPostGateway {
    api: ApiClient,
    authorizer: RequestAuthorizer,
}

impl HttpPostGateway {
    pub fn new(api: ApiClient, authorizer: RequestAuthorizer) -> Self {
        Self { api, authorizer }
    }

    fn posts_url(&self, tail: &[&str]) -> Url {
        let mut segments = vec!["api", "postagens"];
        segments.extend_from_slice(tail);
        self.api.endpoint(&segments)
    }

    /// Sends an authorized request and lets the authorizer see the status.
    async fn send(
        &self,
        method: Method,
        url: Url,
        build: impl FnOnce(reqwest::RequestBuilder) -> reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, GatewayError> {
        let header = self.authorizer.header_for(url.path());
        let request = build(self.api.request(method, url, header.as_deref()));

        let response = ApiClient::send(request).await?;
        if self.authorizer.observe(response.status().as_u16()) == Disposition::SessionRevoked {
            tracing::debug!(status = %response.status(), "post request rejected credential");
        }
        Ok(response)
    }
}

impl PostGateway for HttpPostGateway {
    async fn list_published(&self, user: &UserProfile) -> Result<Vec<PublishedPost>, GatewayError> {
        let url = self.posts_url(&["filtrar"]);
        let handle = user.handle.as_str();
        let response = self
            .send(Method::GET, url, |r| r.query(&[("usuarioUsuario", handle)]))
            .await?;

        // The server filter is a substring match on the handle.
        let posts: Vec<PostResponse> = ApiClient::parse_response(response).await?;
        let fetched = posts.len();
        let own: Vec<PublishedPost> = posts
            .into_iter()
            .filter(|p| p.written_by(user))
            .map(PublishedPost::from)
            .collect();
        tracing::debug!(%user, fetched, kept = own.len(), "published posts fetched");
        Ok(own)
    }

    async fn create_post(&self, fields: &PostFields) -> Result<PublishedPost, GatewayError> {
        let url = self.posts_url(&["criar"]);
        let response = self.send(Method::POST, url, |r| r.json(fields)).await?;

        let post: PostResponse = ApiClient::parse_response(response).await?;
        Ok(post.into())
    }

    async fn update_post(
        &self,
        id: PostId,
        fields: &PostFields,
    ) -> Result<PublishedPost, GatewayError> {
        let id = id.to_string();
        let url = self.posts_url(&[&id]);
        let response = self.send(Method::PUT, url, |r| r.json(fields)).await?;

        let post: PostResponse = ApiClient::parse_response(response).await?;
        Ok(post.into())
    }

    async fn delete_post(&self, id: PostId) -> Result<(), GatewayError> {
        let id = id.to_string();
        let url = self.posts_url(&[&id]);
        let response = self.send(Method::DELETE, url, |r| r).await?;

        ApiClient::check_status(response).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use scriba_protocol::SessionAuthority;

    use super::*;

    #[derive(Default)]
    struct StubSession {
        revoked: AtomicBool,
    }

    impl SessionAuthority for StubSession {
        fn current_user(&self) -> Option<UserProfile> {
            Some(UserProfile::placeholder("ana"))
        }

        fn bearer_token(&self) -> Option<String> {
            Some("a.b.c".into())
        }

        fn revoke(&self) {
            self.revoked.store(true, Ordering::SeqCst);
        }
    }

    fn gateway(base: &str) -> (Arc<StubSession>, HttpPostGateway) {
        let session = Arc::new(StubSession::default());
        let api = ApiClient::with_client(reqwest::Client::new(), base).unwrap();
        let gateway = HttpPostGateway::new(api, RequestAuthorizer::new(session.clone()));
        (session, gateway)
    }

    #[test]
    fn test_posts_url_builds_collection_paths() {
        let (_, gw) = gateway("http://localhost:8080");
        assert_eq!(gw.posts_url(&["criar"]).path(), "/api/postagens/criar");
        assert_eq!(gw.posts_url(&["7"]).path(), "/api/postagens/7");
    }

    #[tokio::test]
    async fn test_delete_post_unreachable_server_keeps_session() {
        let (session, gw) = gateway("http://127.0.0.1:1");

        let result = gw.delete_post(PostId(3)).await;

        assert!(matches!(result, Err(GatewayError::Transport(_))));
        assert!(!session.revoked.load(Ordering::SeqCst));
    }
}
