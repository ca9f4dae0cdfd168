//! Maven Central search client.
//!
//! Uses the Solr endpoint at `https://search.maven.org/solrsearch/select`
//! with `core=gav&rows=1`, which returns the newest coordinate first.

use pkgver_core::{HttpClient, ResolveError, Result, TtlCache};
use serde::Deserialize;
use std::sync::Arc;

const MAVEN_SEARCH_BASE: &str = "https://search.maven.org/solrsearch/select";

/// Client for Maven Central's Solr search API.
#[derive(Clone)]
pub struct MavenCentralRegistry {
    http: Arc<HttpClient>,
    cache: Arc<TtlCache<String>>,
    base_url: String,
}

impl MavenCentralRegistry {
    pub fn new(http: Arc<HttpClient>, cache: Arc<TtlCache<String>>) -> Self {
        Self::with_base_url(http, cache, MAVEN_SEARCH_BASE.to_string())
    }

    /// Overrides the search base URL. Used by tests.
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

    /// Returns the latest version of `<group>:<artifact>`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails, the response does not
    /// decode, or the search returns no documents for the coordinate.
    pub async fn get_latest(&self, group_id: &str, artifact_id: &str) -> Result<String> {
        let key = format!("maven:{group_id}:{artifact_id}");
        if let Some(version) = self.cache.get(&key) {
            return Ok(version);
        }

        let url = format!(
            "{}?q=g:%22{}%22+AND+a:%22{}%22&core=gav&rows=1&wt=json",
            self.base_url,
            urlencoding::encode(group_id),
            urlencoding::encode(artifact_id),
        );
        let response: SolrResponse = self.http.get_json(&url).await?;

        let doc = response
            .response
            .docs
            .into_iter()
            .next()
            .ok_or_else(|| ResolveError::NotFound {
                name: format!("{group_id}:{artifact_id}"),
            })?;

        let version = doc.latest_version.unwrap_or(doc.version);
        self.cache.put(key, version.clone());
        Ok(version)
    }
}

#[derive(Deserialize)]
struct SolrResponse {
    response: SolrBody,
}

#[derive(Deserialize)]
struct SolrBody {
    #[serde(default)]
    docs: Vec<VersionDoc>,
}

#[derive(Deserialize)]
struct VersionDoc {
    #[serde(rename = "v", default)]
    version: String,
    #[serde(rename = "latestVersion", default)]
    latest_version: Option<String>,
}
