//! GitHub releases/tags client for Swift packages.
//!
//! Swift packages are resolved against their hosting repository: the
//! release list is authoritative, the tag list stands in for projects
//! that never publish a stable release. A `GITHUB_TOKEN` environment
//! variable, when present, is forwarded as a bearer token to lift the
//! anonymous rate limit.

use pkgver_core::{HttpClient, Result, TtlCache};
use serde::Deserialize;
use std::sync::Arc;

const GITHUB_API_BASE: &str = "https://api.github.com";

/// One resolvable release or tag.
#[derive(Debug, Clone)]
pub struct ReleaseCandidate {
    pub tag: String,
}

/// Client for the GitHub releases and tags APIs.
#[derive(Clone)]
pub struct GitHubReleaseRegistry {
    http: Arc<HttpClient>,
    cache: Arc<TtlCache<Vec<ReleaseCandidate>>>,
    base_url: String,
}

impl GitHubReleaseRegistry {
    pub fn new(http: Arc<HttpClient>, cache: Arc<TtlCache<Vec<ReleaseCandidate>>>) -> Self {
        Self::with_base_url(http, cache, GITHUB_API_BASE.to_string())
    }

    /// Overrides the API base URL. Used by tests.
    pub fn with_base_url(
        http: Arc<HttpClient>,
        cache: Arc<TtlCache<Vec<ReleaseCandidate>>>,
        base_url: String,
    ) -> Self {
        Self {
            http,
            cache,
            base_url,
        }
    }

    /// Returns the non-draft, non-prerelease releases of a repository,
    /// falling back to the tag list when no release qualifies. Cached
    /// under `swift:<url>`.
    ///
    /// # Errors
    ///
    /// Returns an error when both lookups fail.
    pub async fn get_candidates(
        &self,
        cache_key: &str,
        owner: &str,
        repo: &str,
    ) -> Result<Vec<ReleaseCandidate>> {
        if let Some(candidates) = self.cache.get(cache_key) {
            return Ok(candidates);
        }

        let headers = github_headers();

        let releases_url = format!("{}/repos/{owner}/{repo}/releases", self.base_url);
        let releases: Vec<Release> = self
            .http
            .get_json_with_headers(&releases_url, &headers)
            .await?;

        let mut candidates: Vec<ReleaseCandidate> = releases
            .into_iter()
            .filter(|r| !r.draft && !r.prerelease)
            .map(|r| ReleaseCandidate { tag: r.tag_name })
            .collect();

        if candidates.is_empty() {
            let tags_url = format!("{}/repos/{owner}/{repo}/tags", self.base_url);
            let tags: Vec<Tag> = self.http.get_json_with_headers(&tags_url, &headers).await?;
            candidates = tags
                .into_iter()
                .map(|t| ReleaseCandidate { tag: t.name })
                .collect();
        }

        self.cache.put(cache_key.to_string(), candidates.clone());
        Ok(candidates)
    }
}

/// Standard headers for GitHub API calls, with an optional bearer token
/// from the environment.
pub fn github_headers() -> Vec<(&'static str, String)> {
    let mut headers = vec![("Accept", "application/vnd.github.v3+json".to_string())];
    if let Ok(token) = std::env::var("GITHUB_TOKEN")
        && !token.is_empty()
    {
        headers.push(("Authorization", format!("Bearer {token}")));
    }
    headers
}

#[derive(Deserialize)]
struct Release {
    tag_name: String,
    #[serde(default)]
    draft: bool,
    #[serde(default)]
    prerelease: bool,
}

#[derive(Deserialize)]
struct Tag {
    name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_for(server: &mockito::Server) -> GitHubReleaseRegistry {
        GitHubReleaseRegistry::with_base_url(
            Arc::new(HttpClient::new()),
            Arc::new(TtlCache::new()),
            server.url(),
        )
    }

    #[tokio::test]
    async fn test_draft_and_prerelease_filtered_out() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/repos/apple/swift-nio/releases")
            .with_status(200)
            .with_body(
                r#"[
                    {"tag_name": "2.63.0-rc.1", "draft": false, "prerelease": true},
                    {"tag_name": "2.63.0", "draft": true, "prerelease": false},
                    {"tag_name": "2.62.0", "draft": false, "prerelease": false}
                ]"#,
            )
            .create_async()
            .await;

        let registry = registry_for(&server);
        let candidates = registry
            .get_candidates("swift:https://github.com/apple/swift-nio", "apple", "swift-nio")
            .await
            .unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].tag, "2.62.0");
    }

    #[tokio::test]
    async fn test_tags_fallback_when_no_releases() {
        let mut server = mockito::Server::new_async().await;
        let _releases = server
            .mock("GET", "/repos/a/b/releases")
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;
        let _tags = server
            .mock("GET", "/repos/a/b/tags")
            .with_status(200)
            .with_body(r#"[{"name": "1.0.0"}, {"name": "0.9.0"}]"#)
            .create_async()
            .await;

        let registry = registry_for(&server);
        let candidates = registry
            .get_candidates("swift:https://github.com/a/b", "a", "b")
            .await
            .unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].tag, "1.0.0");
    }

    #[tokio::test]
    async fn test_tags_fallback_when_no_release_qualifies() {
        let mut server = mockito::Server::new_async().await;
        let _releases = server
            .mock("GET", "/repos/a/prerelease-only/releases")
            .with_status(200)
            .with_body(
                r#"[
                    {"tag_name": "2.0.0-beta.1", "draft": false, "prerelease": true},
                    {"tag_name": "2.0.0", "draft": true, "prerelease": false}
                ]"#,
            )
            .create_async()
            .await;
        let _tags = server
            .mock("GET", "/repos/a/prerelease-only/tags")
            .with_status(200)
            .with_body(r#"[{"name": "1.9.0"}, {"name": "1.8.0"}]"#)
            .create_async()
            .await;

        let registry = registry_for(&server);
        let candidates = registry
            .get_candidates("swift:https://github.com/a/prerelease-only", "a", "prerelease-only")
            .await
            .unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].tag, "1.9.0");
    }

    #[tokio::test]
    async fn test_candidates_cached() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/repos/a/b/releases")
            .with_status(200)
            .with_body(r#"[{"tag_name": "1.0.0", "draft": false, "prerelease": false}]"#)
            .expect(1)
            .create_async()
            .await;

        let registry = registry_for(&server);
        registry.get_candidates("swift:url", "a", "b").await.unwrap();
        registry.get_candidates("swift:url", "a", "b").await.unwrap();
        mock.assert_async().await;
    }
}
