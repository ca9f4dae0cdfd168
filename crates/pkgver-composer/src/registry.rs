//! Packagist registry client.
//!
//! Packagist serves package metadata from several generations of
//! endpoint; they are tried in order:
//!
//! 1. `https://packagist.org/packages/{vendor}/{name}.json`
//! 2. `https://packagist.org/p2/{vendor}/{name}.json`
//! 3. `https://repo.packagist.org/p2/{vendor}/{name}.json`
//!
//! When all three fail, the search API is consulted once; an exact name
//! match there triggers one retry of the chain (the package exists but a
//! mirror lagged).

use pkgver_core::{HttpClient, ResolveError, Result, TtlCache};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;

const PACKAGIST_BASE: &str = "https://packagist.org";
const PACKAGIST_REPO_BASE: &str = "https://repo.packagist.org";

/// One published version with its release timestamp.
///
/// `is_dev` is decided at parse time, while the versions-map key is
/// still in hand: a version is dev when its key *or* its `version`
/// value carries a `dev-`/`-dev` marker.
#[derive(Debug, Clone)]
pub struct ComposerVersion {
    pub version: String,
    pub time: Option<String>,
    pub is_dev: bool,
}

/// Client for the Packagist APIs.
#[derive(Clone)]
pub struct PackagistRegistry {
    http: Arc<HttpClient>,
    cache: Arc<TtlCache<Vec<ComposerVersion>>>,
    base_url: String,
    repo_base_url: String,
}

impl PackagistRegistry {
    pub fn new(http: Arc<HttpClient>, cache: Arc<TtlCache<Vec<ComposerVersion>>>) -> Self {
        Self::with_base_urls(
            http,
            cache,
            PACKAGIST_BASE.to_string(),
            PACKAGIST_REPO_BASE.to_string(),
        )
    }

    /// Overrides both base URLs. Used by tests.
    pub fn with_base_urls(
        http: Arc<HttpClient>,
        cache: Arc<TtlCache<Vec<ComposerVersion>>>,
        base_url: String,
        repo_base_url: String,
    ) -> Self {
        Self {
            http,
            cache,
            base_url,
            repo_base_url,
        }
    }

    /// Returns all published versions of `vendor/name`, cached under
    /// `packagist:<vendor>/<name>`.
    ///
    /// # Errors
    ///
    /// Returns the last endpoint error when every endpoint fails and the
    /// search API does not confirm the package exists.
    pub async fn get_versions(&self, vendor: &str, name: &str) -> Result<Vec<ComposerVersion>> {
        let key = format!("packagist:{vendor}/{name}");
        if let Some(versions) = self.cache.get(&key) {
            return Ok(versions);
        }

        let versions = match self.try_endpoints(vendor, name).await {
            Ok(versions) => versions,
            Err(e) => {
                if self.search_has_exact_match(vendor, name).await {
                    tracing::debug!("search confirmed {vendor}/{name}, retrying endpoints");
                    self.try_endpoints(vendor, name).await?
                } else {
                    return Err(e);
                }
            }
        };

        self.cache.put(key, versions.clone());
        Ok(versions)
    }

    async fn try_endpoints(&self, vendor: &str, name: &str) -> Result<Vec<ComposerVersion>> {
        let packages_url = format!("{}/packages/{vendor}/{name}.json", self.base_url);
        let mut last_error = match self.http.get_json::<PackagesResponse>(&packages_url).await {
            Ok(response) => {
                return Ok(response
                    .package
                    .versions
                    .into_iter()
                    .map(|(key, entry)| {
                        let version = entry.version.unwrap_or_else(|| key.clone());
                        let is_dev = is_dev_version(&key) || is_dev_version(&version);
                        ComposerVersion {
                            version,
                            time: entry.time,
                            is_dev,
                        }
                    })
                    .collect());
            }
            Err(e) => e,
        };

        for base in [&self.base_url, &self.repo_base_url] {
            let p2_url = format!("{base}/p2/{vendor}/{name}.json");
            match self.http.get_json::<P2Response>(&p2_url).await {
                Ok(response) => {
                    let versions = response
                        .packages
                        .into_values()
                        .flatten()
                        .map(|entry| {
                            let version = entry.version.unwrap_or_default();
                            let is_dev = is_dev_version(&version);
                            ComposerVersion {
                                version,
                                time: entry.time,
                                is_dev,
                            }
                        })
                        .filter(|v| !v.version.is_empty())
                        .collect();
                    return Ok(versions);
                }
                Err(e) => last_error = e,
            }
        }

        Err(last_error)
    }

    async fn search_has_exact_match(&self, vendor: &str, name: &str) -> bool {
        let full_name = format!("{vendor}/{name}");
        let url = format!(
            "{}/search.json?q={}",
            self.base_url,
            urlencoding::encode(&full_name)
        );

        match self.http.get_json::<SearchResponse>(&url).await {
            Ok(response) => response.results.iter().any(|r| r.name == full_name),
            Err(e) => {
                tracing::debug!("packagist search failed for {full_name}: {e}");
                false
            }
        }
    }
}

/// Selects the version with the newest `time` among non-dev versions.
pub fn select_latest(versions: &[ComposerVersion]) -> Option<&ComposerVersion> {
    versions
        .iter()
        .filter(|v| !v.is_dev)
        .max_by(|a, b| a.time.cmp(&b.time))
}

/// Whether a versions-map key or version string carries a dev marker.
pub fn is_dev_version(version: &str) -> bool {
    version.contains("dev-") || version.contains("-dev")
}

/// Validates the `<vendor>/<name>` package name shape.
pub fn split_package_name(full_name: &str) -> Option<(&str, &str)> {
    let (vendor, name) = full_name.split_once('/')?;
    if vendor.is_empty() || name.is_empty() || name.contains('/') {
        return None;
    }
    Some((vendor, name))
}

#[derive(Deserialize)]
struct PackagesResponse {
    package: PackageBody,
}

#[derive(Deserialize)]
struct PackageBody {
    #[serde(default)]
    versions: HashMap<String, VersionEntry>,
}

#[derive(Deserialize)]
struct P2Response {
    #[serde(default)]
    packages: HashMap<String, Vec<VersionEntry>>,
}

#[derive(Deserialize)]
struct VersionEntry {
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    time: Option<String>,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Deserialize)]
struct SearchResult {
    name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_for(server: &mockito::Server) -> PackagistRegistry {
        PackagistRegistry::with_base_urls(
            Arc::new(HttpClient::new()),
            Arc::new(TtlCache::new()),
            server.url(),
            server.url(),
        )
    }

    #[test]
    fn test_split_package_name() {
        assert_eq!(
            split_package_name("guzzlehttp/guzzle"),
            Some(("guzzlehttp", "guzzle"))
        );
        assert_eq!(split_package_name("invalidname"), None);
        assert_eq!(split_package_name("a/b/c"), None);
        assert_eq!(split_package_name("/name"), None);
        assert_eq!(split_package_name("vendor/"), None);
    }

    fn version(v: &str, time: &str) -> ComposerVersion {
        ComposerVersion {
            version: v.into(),
            time: Some(time.into()),
            is_dev: is_dev_version(v),
        }
    }

    #[test]
    fn test_is_dev_version() {
        assert!(is_dev_version("dev-master"));
        assert!(is_dev_version("2.x-dev"));
        assert!(!is_dev_version("7.8.1"));
    }

    #[test]
    fn test_select_latest_by_time() {
        let versions = vec![
            version("7.8.0", "2023-08-27T10:00:00+00:00"),
            version("7.8.1", "2023-12-03T20:05:00+00:00"),
            version("dev-master", "2024-01-01T00:00:00+00:00"),
        ];
        assert_eq!(select_latest(&versions).unwrap().version, "7.8.1");
    }

    #[test]
    fn test_select_latest_skips_dev_keyed_entries() {
        // Dev marker on the map key only; the stored version looks stable
        let versions = vec![
            version("3.5.0", "2023-10-27T15:32:00+00:00"),
            ComposerVersion {
                version: "2.1.0".into(),
                time: Some("2024-06-01T00:00:00+00:00".into()),
                is_dev: true,
            },
        ];
        assert_eq!(select_latest(&versions).unwrap().version, "3.5.0");
    }

    #[tokio::test]
    async fn test_packages_endpoint() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/packages/guzzlehttp/guzzle.json")
            .with_status(200)
            .with_body(
                r#"{
                    "package": {
                        "versions": {
                            "7.8.1": {"version": "7.8.1", "time": "2023-12-03T20:05:00+00:00"},
                            "7.8.0": {"version": "7.8.0", "time": "2023-08-27T10:00:00+00:00"}
                        }
                    }
                }"#,
            )
            .create_async()
            .await;

        let registry = registry_for(&server);
        let versions = registry.get_versions("guzzlehttp", "guzzle").await.unwrap();
        assert_eq!(versions.len(), 2);
        assert!(versions.iter().all(|v| !v.is_dev));
    }

    #[tokio::test]
    async fn test_dev_marker_on_key_classifies_entry_as_dev() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/packages/acme/lib.json")
            .with_status(200)
            .with_body(
                r#"{
                    "package": {
                        "versions": {
                            "2.x-dev": {"version": "2.1.0", "time": "2024-06-01T00:00:00+00:00"},
                            "1.4.0": {"version": "1.4.0", "time": "2024-01-10T00:00:00+00:00"}
                        }
                    }
                }"#,
            )
            .create_async()
            .await;

        let registry = registry_for(&server);
        let versions = registry.get_versions("acme", "lib").await.unwrap();

        let keyed_dev = versions.iter().find(|v| v.version == "2.1.0").unwrap();
        assert!(keyed_dev.is_dev);
        // The dev-keyed entry loses despite its newer time
        assert_eq!(select_latest(&versions).unwrap().version, "1.4.0");
    }

    #[tokio::test]
    async fn test_p2_fallback() {
        let mut server = mockito::Server::new_async().await;
        let _packages = server
            .mock("GET", "/packages/symfony/console.json")
            .with_status(404)
            .create_async()
            .await;
        let _p2 = server
            .mock("GET", "/p2/symfony/console.json")
            .with_status(200)
            .with_body(
                r#"{
                    "packages": {
                        "symfony/console": [
                            {"version": "7.0.1", "time": "2023-12-01T10:00:00+00:00"},
                            {"version": "6.4.1", "time": "2023-11-01T10:00:00+00:00"}
                        ]
                    }
                }"#,
            )
            .create_async()
            .await;

        let registry = registry_for(&server);
        let versions = registry.get_versions("symfony", "console").await.unwrap();
        assert_eq!(versions.len(), 2);
        assert_eq!(versions[0].version, "7.0.1");
    }

    #[tokio::test]
    async fn test_total_failure_without_search_match() {
        let mut server = mockito::Server::new_async().await;
        for path in ["/packages/ghost/pkg.json", "/p2/ghost/pkg.json"] {
            server.mock("GET", path).with_status(404).create_async().await;
        }
        let _search = server
            .mock("GET", mockito::Matcher::Regex(r"^/search\.json.*".into()))
            .with_status(200)
            .with_body(r#"{"results": []}"#)
            .create_async()
            .await;

        let registry = registry_for(&server);
        assert!(registry.get_versions("ghost", "pkg").await.is_err());
    }

    #[tokio::test]
    async fn test_search_match_triggers_retry() {
        let mut server = mockito::Server::new_async().await;
        let _packages_fail = server
            .mock("GET", "/packages/laravel/framework.json")
            .with_status(500)
            .create_async()
            .await;
        let _p2_fail = server
            .mock("GET", "/p2/laravel/framework.json")
            .with_status(500)
            .create_async()
            .await;
        let _search = server
            .mock("GET", mockito::Matcher::Regex(r"^/search\.json.*".into()))
            .with_status(200)
            .with_body(r#"{"results": [{"name": "laravel/framework"}]}"#)
            .create_async()
            .await;

        let registry = registry_for(&server);
        // The retry still fails here (mocks keep returning 500), but the
        // retry path itself is exercised: the error is the endpoint's,
        // not a search failure.
        let result = registry.get_versions("laravel", "framework").await;
        assert!(matches!(result, Err(ResolveError::Status { .. })));
    }

    #[tokio::test]
    #[ignore]
    async fn test_fetch_real_guzzle() {
        let registry =
            PackagistRegistry::new(Arc::new(HttpClient::new()), Arc::new(TtlCache::new()));
        let versions = registry.get_versions("guzzlehttp", "guzzle").await.unwrap();
        assert!(!versions.is_empty());
    }
}
