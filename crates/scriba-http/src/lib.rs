//! HTTP gateways for Scriba.
//!
//! Implements the two remote seams of the client against the blog REST
//! API with [`reqwest`]:
//!
//! - [`HttpAuthGateway`] → [`scriba_session::AuthGateway`]: login,
//!   registration and profile lookup.
//! - [`HttpPostGateway`] → [`scriba_drafts::PostGateway`]: listing,
//!   creating, updating and deleting published posts, authorized through
//!   a [`scriba_session::RequestAuthorizer`].
//!
//! Both share one [`ApiClient`] (one connection pool, one base URL).
//! Non-2xx responses become [`GatewayError`](scriba_protocol::GatewayError)
//! values; the server's `message` field is kept for diagnostics.

#![allow(async_fn_in_trait)]

mod auth;
mod client;
mod config;
mod error;
mod posts;
pub mod wire;

pub use auth::HttpAuthGateway;
pub use client::ApiClient;
pub use config::HttpConfig;
pub use error::HttpError;
pub use posts::HttpPostGateway;
