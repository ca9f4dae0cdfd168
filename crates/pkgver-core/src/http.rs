//! Thin HTTP GET wrapper shared by all registry clients.
//!
//! One request, full body read, structured errors. Retry, backoff and
//! caching all live elsewhere: resolvers decide what a failure means
//! (usually a `skipped` result), and the TTL cache decides whether to
//! call here at all.

use crate::error::{ResolveError, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default user agent, sent on every request. crates.io in particular
/// rejects anonymous clients.
pub const DEFAULT_USER_AGENT: &str = concat!("pkgver/", env!("CARGO_PKG_VERSION"));

/// HTTP client for registry lookups.
///
/// Wraps a shared `reqwest::Client` configured with a timeout and user
/// agent. All registry clients hold this behind an `Arc` so connection
/// pools are shared process-wide.
///
/// # Examples
///
/// ```no_run
/// use pkgver_core::http::HttpClient;
///
/// # async fn example() -> pkgver_core::error::Result<()> {
/// let http = HttpClient::new();
/// let body = http.get("https://pypi.org/pypi/requests/json").await?;
/// println!("fetched {} bytes", body.len());
/// # Ok(())
/// # }
/// ```
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a client with the default timeout and user agent.
    pub fn new() -> Self {
        Self::with_config(Duration::from_secs(DEFAULT_TIMEOUT_SECS), DEFAULT_USER_AGENT)
    }

    /// Creates a client with an explicit timeout and user agent.
    pub fn with_config(timeout: Duration, user_agent: &str) -> Self {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .gzip(true)
            .build()
            .expect("failed to create HTTP client");

        Self { client }
    }

    /// Issues one GET request and returns the full response body.
    ///
    /// # Errors
    ///
    /// - `ResolveError::Transport` on connection, TLS or timeout failure
    /// - `ResolveError::Status` when the response code is not 2xx
    pub async fn get(&self, url: &str) -> Result<Vec<u8>> {
        self.get_with_headers(url, &[]).await
    }

    /// Issues one GET request with additional headers.
    ///
    /// Used for endpoints that require an `Accept` variant or a bearer
    /// token (GitHub API, GHCR).
    ///
    /// # Errors
    ///
    /// Same as [`HttpClient::get`].
    pub async fn get_with_headers(&self, url: &str, headers: &[(&str, String)]) -> Result<Vec<u8>> {
        tracing::debug!("GET {url}");

        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(*name, value.as_str());
        }

        let response = request.send().await.map_err(|e| ResolveError::Transport {
            url: url.to_string(),
            source: e,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResolveError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| ResolveError::Transport {
            url: url.to_string(),
            source: e,
        })?;

        Ok(body.to_vec())
    }

    /// GETs a URL and decodes the body as JSON.
    ///
    /// # Errors
    ///
    /// Same as [`HttpClient::get`], plus `ResolveError::Decode` when the
    /// body is not valid JSON of the expected shape.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let body = self.get(url).await?;
        decode_json(url, &body)
    }

    /// GETs a URL with headers and decodes the body as JSON.
    ///
    /// # Errors
    ///
    /// Same as [`HttpClient::get_json`].
    pub async fn get_json_with_headers<T: DeserializeOwned>(
        &self,
        url: &str,
        headers: &[(&str, String)],
    ) -> Result<T> {
        let body = self.get_with_headers(url, headers).await?;
        decode_json(url, &body)
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Decodes a response body as JSON, attributing failures to the URL.
pub fn decode_json<T: DeserializeOwned>(url: &str, body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|e| ResolveError::Decode {
        url: url.to_string(),
        source: e,
    })
}
