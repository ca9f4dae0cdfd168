//! GitHub releases/tags client for action repositories.
//!
//! Actions follow the GitHub API's own ordering: the first non-draft,
//! non-prerelease release wins; repositories without releases fall back
//! to the first tag. A `GITHUB_TOKEN` environment variable, when set, is
//! forwarded as a bearer token.

use pkgver_core::{HttpClient, ResolveError, Result, TtlCache};
use serde::Deserialize;
use std::sync::Arc;

const GITHUB_API_BASE: &str = "https://api.github.com";

/// The chosen release (or tag) for one action repository.
#[derive(Debug, Clone)]
pub struct ActionRelease {
    pub tag: String,
    pub published_at: Option<String>,
    pub url: Option<String>,
}

/// Client for action release lookups.
#[derive(Clone)]
pub struct ActionRegistry {
    http: Arc<HttpClient>,
    cache: Arc<TtlCache<ActionRelease>>,
    base_url: String,
}

impl ActionRegistry {
    pub fn new(http: Arc<HttpClient>, cache: Arc<TtlCache<ActionRelease>>) -> Self {
        Self::with_base_url(http, cache, GITHUB_API_BASE.to_string())
    }

    /// Overrides the API base URL. Used by tests.
    pub fn with_base_url(
        http: Arc<HttpClient>,
        cache: Arc<TtlCache<ActionRelease>>,
        base_url: String,
    ) -> Self {
        Self {
            http,
            cache,
            base_url,
        }
    }

    /// Returns the latest stable release of `owner/repo`, cached under
    /// `github-action:<owner>/<repo>`.
    ///
    /// # Errors
    ///
    /// Returns an error when the lookups fail, or `NotFound` when the
    /// repository has neither qualifying releases nor tags.
    pub async fn get_latest_release(&self, owner: &str, repo: &str) -> Result<ActionRelease> {
        let key = format!("github-action:{owner}/{repo}");
        if let Some(release) = self.cache.get(&key) {
            return Ok(release);
        }

        let headers = github_headers();

        let releases_url = format!("{}/repos/{owner}/{repo}/releases", self.base_url);
        let releases: Vec<Release> = self
            .http
            .get_json_with_headers(&releases_url, &headers)
            .await?;

        let chosen = releases
            .into_iter()
            .find(|r| !r.draft && !r.prerelease)
            .map(|r| ActionRelease {
                tag: r.tag_name,
                published_at: r.published_at,
                url: r.html_url,
            });

        let release = match chosen {
            Some(release) => release,
            None => {
                let tags_url = format!("{}/repos/{owner}/{repo}/tags", self.base_url);
                let tags: Vec<Tag> = self.http.get_json_with_headers(&tags_url, &headers).await?;
                let first = tags.into_iter().next().ok_or_else(|| ResolveError::NotFound {
                    name: format!("{owner}/{repo}"),
                })?;
                ActionRelease {
                    tag: first.name,
                    published_at: None,
                    url: None,
                }
            }
        };

        self.cache.put(key, release.clone());
        Ok(release)
    }
}

fn github_headers() -> Vec<(&'static str, String)> {
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
    #[serde(default)]
    published_at: Option<String>,
    #[serde(default)]
    html_url: Option<String>,
}

#[derive(Deserialize)]
struct Tag {
    name: String,
}
