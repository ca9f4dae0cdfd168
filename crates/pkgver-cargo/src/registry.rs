//! crates.io API client.
//!
//! `https://crates.io/api/v1/crates/{name}` reports the latest stable
//! version directly; the selection chain is `max_stable_version` →
//! `max_version` → highest non-yanked `versions[].num`.

use pkgver_core::version::{clean, compare};
use pkgver_core::{HttpClient, ResolveError, Result, TtlCache};
use serde::Deserialize;
use std::sync::Arc;

const CRATES_IO_BASE: &str = "https://crates.io/api/v1/crates";

/// Client for the crates.io API.
#[derive(Clone)]
pub struct CratesIoRegistry {
    http: Arc<HttpClient>,
    cache: Arc<TtlCache<String>>,
    base_url: String,
}

impl CratesIoRegistry {
    pub fn new(http: Arc<HttpClient>, cache: Arc<TtlCache<String>>) -> Self {
        Self::with_base_url(http, cache, CRATES_IO_BASE.to_string())
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

    /// Returns the latest stable version of a crate.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails, the crate does not
    /// exist, or no version survives the selection chain.
    pub async fn get_latest(&self, name: &str) -> Result<String> {
        let key = format!("rust:{name}");
        if let Some(version) = self.cache.get(&key) {
            return Ok(version);
        }

        let url = format!("{}/{}", self.base_url, urlencoding::encode(name));
        let response: CrateResponse = self.http.get_json(&url).await?;

        let version = select_latest(&response).ok_or_else(|| ResolveError::NotFound {
            name: name.to_string(),
        })?;

        self.cache.put(key, version.clone());
        Ok(version)
    }
}

fn select_latest(response: &CrateResponse) -> Option<String> {
    if let Some(stable) = &response.krate.max_stable_version {
        return Some(stable.clone());
    }
    if let Some(max) = &response.krate.max_version {
        return Some(max.clone());
    }
    response
        .versions
        .iter()
        .filter(|v| !v.yanked)
        .max_by(|a, b| compare(clean(&a.num), clean(&b.num)))
        .map(|v| v.num.clone())
}

#[derive(Deserialize)]
struct CrateResponse {
    #[serde(rename = "crate")]
    krate: CrateInfo,
    #[serde(default)]
    versions: Vec<VersionEntry>,
}

#[derive(Deserialize)]
struct CrateInfo {
    #[serde(default)]
    max_stable_version: Option<String>,
    #[serde(default)]
    max_version: Option<String>,
}

#[derive(Deserialize)]
struct VersionEntry {
    num: String,
    #[serde(default)]
    yanked: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_for(server: &mockito::Server) -> CratesIoRegistry {
        CratesIoRegistry::with_base_url(
            Arc::new(HttpClient::new()),
            Arc::new(TtlCache::new()),
            server.url(),
        )
    }

    #[tokio::test]
    async fn test_max_stable_version_wins() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/serde")
            .with_status(200)
            .with_body(
                r#"{
                    "crate": {"max_stable_version": "1.0.214", "max_version": "2.0.0-beta.1"},
                    "versions": []
                }"#,
            )
            .create_async()
            .await;

        let registry = registry_for(&server);
        assert_eq!(registry.get_latest("serde").await.unwrap(), "1.0.214");
    }

    #[tokio::test]
    async fn test_max_version_fallback() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/prerelease-only")
            .with_status(200)
            .with_body(r#"{"crate": {"max_version": "0.1.0-alpha.1"}, "versions": []}"#)
            .create_async()
            .await;

        let registry = registry_for(&server);
        assert_eq!(
            registry.get_latest("prerelease-only").await.unwrap(),
            "0.1.0-alpha.1"
        );
    }

    #[tokio::test]
    async fn test_non_yanked_version_fallback() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/oldcrate")
            .with_status(200)
            .with_body(
                r#"{
                    "crate": {},
                    "versions": [
                        {"num": "0.3.0", "yanked": true},
                        {"num": "0.2.0", "yanked": false},
                        {"num": "0.1.0", "yanked": false}
                    ]
                }"#,
            )
            .create_async()
            .await;

        let registry = registry_for(&server);
        assert_eq!(registry.get_latest("oldcrate").await.unwrap(), "0.2.0");
    }

    #[tokio::test]
    async fn test_all_yanked_is_not_found() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/deadcrate")
            .with_status(200)
            .with_body(r#"{"crate": {}, "versions": [{"num": "0.1.0", "yanked": true}]}"#)
            .create_async()
            .await;

        let registry = registry_for(&server);
        assert!(matches!(
            registry.get_latest("deadcrate").await,
            Err(ResolveError::NotFound { .. })
        ));
    }

    #[tokio::test]
    #[ignore]
    async fn test_fetch_real_serde() {
        let registry =
            CratesIoRegistry::new(Arc::new(HttpClient::new()), Arc::new(TtlCache::new()));
        let latest = registry.get_latest("serde").await.unwrap();
        assert!(!latest.is_empty());
    }
}
