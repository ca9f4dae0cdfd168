//! PyPI JSON API client.

use pkgver_core::{HttpClient, Result, TtlCache};
use serde::Deserialize;
use std::sync::Arc;

const PYPI_BASE: &str = "https://pypi.org/pypi";

/// Client for the PyPI JSON API.
///
/// `https://pypi.org/pypi/{name}/json` reports the latest release in
/// `info.version`, which is the only field this resolver needs; it is
/// cached under `pypi:<name>`.
#[derive(Clone)]
pub struct PypiRegistry {
    http: Arc<HttpClient>,
    cache: Arc<TtlCache<String>>,
    base_url: String,
}

impl PypiRegistry {
    pub fn new(http: Arc<HttpClient>, cache: Arc<TtlCache<String>>) -> Self {
        Self::with_base_url(http, cache, PYPI_BASE.to_string())
    }

    /// Overrides the registry base URL. Used by tests.
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

    /// Returns the latest release version for a package.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails, the package does not
    /// exist (404), or the body does not decode.
    pub async fn get_latest(&self, name: &str) -> Result<String> {
        let key = format!("pypi:{name}");
        if let Some(version) = self.cache.get(&key) {
            return Ok(version);
        }

        let url = format!("{}/{}/json", self.base_url, urlencoding::encode(name));
        let response: PackageResponse = self.http.get_json(&url).await?;

        self.cache.put(key, response.info.version.clone());
        Ok(response.info.version)
    }
}

#[derive(Deserialize)]
struct PackageResponse {
    info: PackageInfo,
}

#[derive(Deserialize)]
struct PackageInfo {
    version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_for(server: &mockito::Server) -> PypiRegistry {
        PypiRegistry::with_base_url(
            Arc::new(HttpClient::new()),
            Arc::new(TtlCache::new()),
            server.url(),
        )
    }

    #[tokio::test]
    async fn test_get_latest() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/requests/json")
            .with_status(200)
            .with_body(r#"{"info": {"version": "2.31.0", "name": "requests"}}"#)
            .create_async()
            .await;

        let registry = registry_for(&server);
        assert_eq!(registry.get_latest("requests").await.unwrap(), "2.31.0");
    }

    #[tokio::test]
    async fn test_get_latest_uses_cache() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/flask/json")
            .with_status(200)
            .with_body(r#"{"info": {"version": "3.0.0"}}"#)
            .expect(1)
            .create_async()
            .await;

        let registry = registry_for(&server);
        registry.get_latest("flask").await.unwrap();
        assert_eq!(registry.get_latest("flask").await.unwrap(), "3.0.0");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_package_surfaces_status() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/no-such-pkg/json")
            .with_status(404)
            .create_async()
            .await;

        let registry = registry_for(&server);
        assert!(registry.get_latest("no-such-pkg").await.is_err());
    }

    #[tokio::test]
    #[ignore]
    async fn test_fetch_real_requests() {
        let registry = PypiRegistry::new(Arc::new(HttpClient::new()), Arc::new(TtlCache::new()));
        let version = registry.get_latest("requests").await.unwrap();
        assert!(!version.is_empty());
    }
}
