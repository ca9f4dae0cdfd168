//! proxy.golang.org registry client.
//!
//! `/{module}/@latest` answers most lookups in one round trip; modules
//! that do not serve it (the endpoint is optional in the proxy protocol)
//! fall back to `/{module}/@v/list` and the shared version order.

use crate::version::escape_module_path;
use pkgver_core::version::max_version;
use pkgver_core::{HttpClient, ResolveError, Result, TtlCache};
use serde::Deserialize;
use std::sync::Arc;

const PROXY_BASE: &str = "https://proxy.golang.org";

/// Client for the Go module proxy.
#[derive(Clone)]
pub struct GoProxyRegistry {
    http: Arc<HttpClient>,
    cache: Arc<TtlCache<String>>,
    base_url: String,
}

impl GoProxyRegistry {
    pub fn new(http: Arc<HttpClient>, cache: Arc<TtlCache<String>>) -> Self {
        Self::with_base_url(http, cache, PROXY_BASE.to_string())
    }

    /// Overrides the proxy base URL. Used by tests.
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

    /// Returns the latest version of a module, `v` prefix included.
    ///
    /// # Errors
    ///
    /// Returns an error if both the `/@latest` and `/@v/list` lookups
    /// fail, or the list contains no parseable version.
    pub async fn get_latest(&self, module_path: &str) -> Result<String> {
        let key = format!("go:{module_path}");
        if let Some(version) = self.cache.get(&key) {
            return Ok(version);
        }

        let escaped = escape_module_path(module_path);

        let latest_url = format!("{}/{}/@latest", self.base_url, escaped);
        let version = match self.http.get_json::<LatestInfo>(&latest_url).await {
            Ok(info) => info.version,
            Err(e) => {
                tracing::debug!("@latest failed for {module_path}, trying @v/list: {e}");
                self.latest_from_list(module_path, &escaped).await?
            }
        };

        self.cache.put(key, version.clone());
        Ok(version)
    }

    async fn latest_from_list(&self, module_path: &str, escaped: &str) -> Result<String> {
        let url = format!("{}/{}/@v/list", self.base_url, escaped);
        let body = self.http.get(&url).await?;
        let content = String::from_utf8_lossy(&body);

        max_version(content.lines().map(str::trim))
            .map(String::from)
            .ok_or_else(|| ResolveError::NotFound {
                name: module_path.to_string(),
            })
    }
}

#[derive(Deserialize)]
struct LatestInfo {
    #[serde(rename = "Version")]
    version: String,
}
