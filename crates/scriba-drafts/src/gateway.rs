//! The remote post gateway.
//!
//! Published posts live on the server. The reconciliation engine reaches
//! them only through [`PostGateway`], so it can be driven by the HTTP
//! client in production and by a recording fake in tests.

use scriba_protocol::{GatewayError, PostFields, PostId, PublishedPost, UserProfile};

/// CRUD on the server-owned published posts.
///
/// Implementations are expected to authorize their own requests (attach
/// the bearer token, react to 401); the engine never sees the token.
pub trait PostGateway: Send + Sync + 'static {
    /// Published posts written by `author`.
    fn list_published(
        &self,
        author: &UserProfile,
    ) -> impl std::future::Future<Output = Result<Vec<PublishedPost>, GatewayError>> + Send;

    /// Creates a post; the server assigns its id.
    fn create_post(
        &self,
        fields: &PostFields,
    ) -> impl std::future::Future<Output = Result<PublishedPost, GatewayError>> + Send;

    /// Overwrites the content of post `id`.
    fn update_post(
        &self,
        id: PostId,
        fields: &PostFields,
    ) -> impl std::future::Future<Output = Result<PublishedPost, GatewayError>> + Send;

    fn delete_post(
        &self,
        id: PostId,
    ) -> impl std::future::Future<Output = Result<(), GatewayError>> + Send;
}
