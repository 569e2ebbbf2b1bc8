//! HTTP gateway configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Where the blog API lives and how long to wait for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Scheme, host and port of the API, without the `/api` suffix.
    ///
    /// Default: `http://localhost:8080`.
    pub base_url: String,

    /// Whole-request timeout.
    ///
    /// Default: 10 seconds.
    pub timeout: Duration,
}

impl HttpConfig {
    /// Normalizes the base URL (no trailing slash) and replaces a zero
    /// timeout with the default.
    pub fn validated(mut self) -> Self {
        let trimmed = self.base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            tracing::warn!("base_url is empty, using default");
            self.base_url = Self::default().base_url;
        } else {
            self.base_url = trimmed.to_string();
        }
        if self.timeout.is_zero() {
            tracing::warn!("timeout is zero, using default");
            self.timeout = Self::default().timeout;
        }
        self
    }

    /// Builder-style base URL override.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}
