//! npm registry client.
//!
//! Package metadata comes from `https://registry.npmjs.org/{package}`.
//! Only the `dist-tags.latest` pointer and the `versions` key set are
//! retained; that is enough to answer both plain and major-pinned
//! lookups from cache.

use pkgver_core::{HttpClient, Result, TtlCache};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;

const REGISTRY_BASE: &str = "https://registry.npmjs.org";

/// Parsed summary of one npm package, as cached under `npm:<name>`.
#[derive(Debug, Clone)]
pub struct NpmPackageInfo {
    /// The registry's own `latest` dist-tag, when present.
    pub latest_tag: Option<String>,
    /// All published version strings.
    pub versions: Vec<String>,
}

/// Client for the npm registry.
#[derive(Clone)]
pub struct NpmRegistry {
    http: Arc<HttpClient>,
    cache: Arc<TtlCache<NpmPackageInfo>>,
    base_url: String,
}

impl NpmRegistry {
    pub fn new(http: Arc<HttpClient>, cache: Arc<TtlCache<NpmPackageInfo>>) -> Self {
        Self::with_base_url(http, cache, REGISTRY_BASE.to_string())
    }

    /// Overrides the registry base URL. Used by tests.
    pub fn with_base_url(
        http: Arc<HttpClient>,
        cache: Arc<TtlCache<NpmPackageInfo>>,
        base_url: String,
    ) -> Self {
        Self {
            http,
            cache,
            base_url,
        }
    }

    /// Fetches the package summary, going through the cache.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails, the registry responds
    /// with a non-2xx status, or the body does not decode.
    pub async fn get_package(&self, name: &str) -> Result<NpmPackageInfo> {
        let key = format!("npm:{name}");
        if let Some(info) = self.cache.get(&key) {
            return Ok(info);
        }

        let url = format!("{}/{}", self.base_url, urlencoding::encode(name));
        let metadata: PackageMetadata = self.http.get_json(&url).await?;
        let info = NpmPackageInfo {
            latest_tag: metadata.dist_tags.and_then(|t| t.latest),
            versions: metadata.versions.into_keys().collect(),
        };

        self.cache.put(key, info.clone());
        Ok(info)
    }
}

#[derive(Deserialize)]
struct PackageMetadata {
    #[serde(rename = "dist-tags")]
    dist_tags: Option<DistTags>,
    #[serde(default)]
    versions: HashMap<String, serde_json::Value>,
}

#[derive(Deserialize)]
struct DistTags {
    latest: Option<String>,
}
