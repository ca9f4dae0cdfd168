//! pub.dev registry client.

use pkgver_core::version::{clean, compare};
use pkgver_core::{HttpClient, ResolveError, Result, TtlCache};
use serde::Deserialize;
use std::sync::Arc;

const PUB_DEV_API_BASE: &str = "https://pub.dev/api";

/// Client for the pub.dev API.
#[derive(Clone)]
pub struct PubDevRegistry {
    http: Arc<HttpClient>,
    cache: Arc<TtlCache<String>>,
    base_url: String,
}

impl PubDevRegistry {
    pub fn new(http: Arc<HttpClient>, cache: Arc<TtlCache<String>>) -> Self {
        Self::with_base_url(http, cache, PUB_DEV_API_BASE.to_string())
    }

    /// Overrides the API base URL. Used by tests.
    pub fn with_base_url(
        http: Arc<HttpClient>,
        cache: Arc<TtlCache<String>>,
        base_url: String,
    ) -> Self {
        Self {
            http,
            cache,
            base_url,
        }
    }

    /// Returns the latest non-retracted version of a package.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails, the package does not
    /// exist, or every published version is retracted.
    pub async fn get_latest(&self, name: &str) -> Result<String> {
        let key = format!("dart:{name}");
        if let Some(version) = self.cache.get(&key) {
            return Ok(version);
        }

        let url = format!("{}/packages/{}", self.base_url, urlencoding::encode(name));
        let response: PackageResponse = self.http.get_json(&url).await?;

        let version = select_latest(&response).ok_or_else(|| ResolveError::NotFound {
            name: name.to_string(),
        })?;

        self.cache.put(key, version.clone());
        Ok(version)
    }
}

/// The registry's own `latest` pointer wins unless it was retracted, in
/// which case the highest non-retracted published version stands in.
fn select_latest(response: &PackageResponse) -> Option<String> {
    if let Some(latest) = &response.latest
        && !latest.retracted
    {
        return Some(latest.version.clone());
    }

    response
        .versions
        .iter()
        .filter(|v| !v.retracted)
        .max_by(|a, b| compare(clean(&a.version), clean(&b.version)))
        .map(|v| v.version.clone())
}

#[derive(Deserialize)]
struct PackageResponse {
    #[serde(default)]
    latest: Option<VersionEntry>,
    #[serde(default)]
    versions: Vec<VersionEntry>,
}

#[derive(Deserialize)]
struct VersionEntry {
    version: String,
    #[serde(default)]
    retracted: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_for(server: &mockito::Server) -> PubDevRegistry {
        PubDevRegistry::with_base_url(
            Arc::new(HttpClient::new()),
            Arc::new(TtlCache::new()),
            server.url(),
        )
    }

    #[tokio::test]
    async fn test_latest_pointer_wins() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/packages/http")
            .with_status(200)
            .with_body(
                r#"{
                    "latest": {"version": "1.1.0"},
                    "versions": [
                        {"version": "1.0.0"},
                        {"version": "1.1.0"}
                    ]
                }"#,
            )
            .create_async()
            .await;

        let registry = registry_for(&server);
        assert_eq!(registry.get_latest("http").await.unwrap(), "1.1.0");
    }

    #[tokio::test]
    async fn test_retracted_latest_falls_back() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/packages/provider")
            .with_status(200)
            .with_body(
                r#"{
                    "latest": {"version": "6.1.2", "retracted": true},
                    "versions": [
                        {"version": "6.1.2", "retracted": true},
                        {"version": "6.1.1"},
                        {"version": "6.0.5"}
                    ]
                }"#,
            )
            .create_async()
            .await;

        let registry = registry_for(&server);
        assert_eq!(registry.get_latest("provider").await.unwrap(), "6.1.1");
    }

    #[tokio::test]
    async fn test_all_retracted_is_not_found() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/packages/pulled")
            .with_status(200)
            .with_body(
                r#"{
                    "latest": {"version": "0.2.0", "retracted": true},
                    "versions": [{"version": "0.2.0", "retracted": true}]
                }"#,
            )
            .create_async()
            .await;

        let registry = registry_for(&server);
        assert!(matches!(
            registry.get_latest("pulled").await,
            Err(ResolveError::NotFound { .. })
        ));
    }

    #[tokio::test]
    #[ignore]
    async fn test_fetch_real_http() {
        let registry =
            PubDevRegistry::new(Arc::new(HttpClient::new()), Arc::new(TtlCache::new()));
        let latest = registry.get_latest("http").await.unwrap();
        assert!(!latest.is_empty());
    }
}
