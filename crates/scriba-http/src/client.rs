//! Thin wrapper over [`reqwest::Client`] bound to one API base URL.

use reqwest::{Method, RequestBuilder, Url};
use scriba_protocol::GatewayError;
use serde::de::DeserializeOwned;

use crate::error::gateway_error;
use crate::wire::error_message;
use crate::{HttpConfig, HttpError};

/// HTTP client for a single blog API instance.
///
/// Cheap to clone: the inner `reqwest::Client` is reference counted, so
/// the auth and post gateways share one connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base: Url,
}

impl ApiClient {
    /// Builds a client with the configured timeout.
    pub fn new(config: HttpConfig) -> Result<Self, HttpError> {
        let config = config.validated();
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Self::with_client(client, &config.base_url)
    }

    /// Reuses an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Result<Self, HttpError> {
        let invalid = |reason: String| HttpError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason,
        };

        let base = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme {:?}", base.scheme())));
        }
        if base.cannot_be_a_base() {
            return Err(invalid("not a base url".into()));
        }

        Ok(Self { client, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Absolute URL for `segments` under the base URL. Each segment is
    /// percent-encoded, so a handle like `"a b/c"` stays one segment.
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // Only fails for cannot-be-a-base URLs, rejected in `with_client`.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Starts a request to `url`, optionally carrying an `Authorization`
    /// header value.
    pub fn request(&self, method: Method, url: Url, authorization: Option<&str>) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match authorization {
            Some(value) => builder.header(reqwest::header::AUTHORIZATION, value),
            None => builder,
        }
    }

    // ---- response helpers ----

    /// Sends `request`, mapping transport failures.
    pub async fn send(request: RequestBuilder) -> Result<reqwest::Response, GatewayError> {
        request.send().await.map_err(gateway_error)
    }

    /// Returns the response unchanged on a 2xx status, or the matching
    /// [`GatewayError`] with the server's message.
    pub async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, GatewayError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(GatewayError::from_status(
                status.as_u16(),
                error_message(&body),
            ));
        }
        Ok(response)
    }

    /// Parses a successful JSON response body into `T`.
    pub async fn parse_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, GatewayError> {
        let response = Self::ensure_success(response).await?;
        response.json::<T>().await.map_err(gateway_error)
    }

    /// Asserts a success status, discarding the body.
    pub async fn check_status(response: reqwest::Response) -> Result<(), GatewayError> {
        Self::ensure_success(response).await?;
        Ok(())
    }
}
