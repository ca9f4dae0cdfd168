//! Docker Hub and OCI V2 registry clients.
//!
//! Docker Hub has its own tags API with digest/timestamp/size metadata;
//! GHCR and custom registries speak the plain V2 `tags/list` protocol,
//! which reports names only. Bearer tokens are forwarded from the
//! environment when present (`GHCR_TOKEN`/`GITHUB_TOKEN` for GHCR,
//! `DOCKER_REGISTRY_TOKEN` for custom registries); anonymous access
//! stays the default.

use pkgver_core::{HttpClient, Result, TtlCache};
use serde::Deserialize;
use std::sync::Arc;

const DOCKERHUB_BASE: &str = "https://hub.docker.com";
const GHCR_BASE: &str = "https://ghcr.io";

/// One upstream tag, in upstream order, with whatever enrichment the
/// registry reported.
#[derive(Debug, Clone)]
pub struct TagInfo {
    pub name: String,
    pub digest: Option<String>,
    pub created: Option<String>,
    pub size: Option<u64>,
}

/// Client for Docker Hub and V2 registries.
#[derive(Clone)]
pub struct DockerRegistry {
    http: Arc<HttpClient>,
    cache: Arc<TtlCache<Vec<TagInfo>>>,
    dockerhub_base: String,
    ghcr_base: String,
}

impl DockerRegistry {
    pub fn new(http: Arc<HttpClient>, cache: Arc<TtlCache<Vec<TagInfo>>>) -> Self {
        Self::with_base_urls(
            http,
            cache,
            DOCKERHUB_BASE.to_string(),
            GHCR_BASE.to_string(),
        )
    }

    /// Overrides the Docker Hub and GHCR base URLs. Used by tests.
    pub fn with_base_urls(
        http: Arc<HttpClient>,
        cache: Arc<TtlCache<Vec<TagInfo>>>,
        dockerhub_base: String,
        ghcr_base: String,
    ) -> Self {
        Self {
            http,
            cache,
            dockerhub_base,
            ghcr_base,
        }
    }

    /// Lists tags for a Docker Hub image. Bare names default to the
    /// `library` namespace. Cached under `dockerhub:<image>`.
    pub async fn dockerhub_tags(&self, image: &str) -> Result<Vec<TagInfo>> {
        let key = format!("dockerhub:{image}");
        if let Some(tags) = self.cache.get(&key) {
            return Ok(tags);
        }

        let (namespace, repo) = match image.split_once('/') {
            Some((namespace, repo)) => (namespace, repo),
            None => ("library", image),
        };

        let url = format!(
            "{}/v2/repositories/{namespace}/{repo}/tags?page_size=100",
            self.dockerhub_base
        );
        let response: HubTagsResponse = self.http.get_json(&url).await?;

        let tags: Vec<TagInfo> = response
            .results
            .into_iter()
            .map(|t| {
                let digest = t.images.into_iter().find_map(|i| i.digest);
                TagInfo {
                    name: t.name,
                    digest,
                    created: t.tag_last_pushed.or(t.last_updated),
                    size: t.full_size,
                }
            })
            .collect();

        self.cache.put(key, tags.clone());
        Ok(tags)
    }

    /// Lists tags for a GHCR image via the V2 protocol. The `ghcr.io/`
    /// prefix on the image name is optional. Cached under `ghcr:<image>`.
    pub async fn ghcr_tags(&self, image: &str) -> Result<Vec<TagInfo>> {
        let path = image.strip_prefix("ghcr.io/").unwrap_or(image);
        let key = format!("ghcr:{path}");
        if let Some(tags) = self.cache.get(&key) {
            return Ok(tags);
        }

        let url = format!("{}/v2/{path}/tags/list", self.ghcr_base);
        let token = std::env::var("GHCR_TOKEN")
            .or_else(|_| std::env::var("GITHUB_TOKEN"))
            .ok()
            .filter(|t| !t.is_empty());
        let tags = self.v2_tags(&url, token).await?;

        self.cache.put(key, tags.clone());
        Ok(tags)
    }

    /// Lists tags from a caller-supplied V2 registry base. Not cached:
    /// the same image name may resolve differently per base.
    pub async fn custom_tags(&self, base: &str, image: &str) -> Result<Vec<TagInfo>> {
        let url = format!("{}/v2/{image}/tags/list", base.trim_end_matches('/'));
        let token = std::env::var("DOCKER_REGISTRY_TOKEN")
            .ok()
            .filter(|t| !t.is_empty());
        self.v2_tags(&url, token).await
    }

    async fn v2_tags(&self, url: &str, token: Option<String>) -> Result<Vec<TagInfo>> {
        let mut headers = Vec::new();
        if let Some(token) = &token {
            headers.push(("Authorization", format!("Bearer {token}")));
        }

        let response: V2TagsResponse = self.http.get_json_with_headers(url, &headers).await?;
        Ok(response
            .tags
            .into_iter()
            .map(|name| TagInfo {
                name,
                digest: None,
                created: None,
                size: None,
            })
            .collect())
    }
}

#[derive(Deserialize)]
struct HubTagsResponse {
    #[serde(default)]
    results: Vec<HubTag>,
}

#[derive(Deserialize)]
struct HubTag {
    name: String,
    #[serde(default)]
    images: Vec<HubImage>,
    #[serde(default)]
    tag_last_pushed: Option<String>,
    #[serde(default)]
    last_updated: Option<String>,
    #[serde(default)]
    full_size: Option<u64>,
}

#[derive(Deserialize)]
struct HubImage {
    #[serde(default)]
    digest: Option<String>,
}

#[derive(Deserialize)]
struct V2TagsResponse {
    #[serde(default)]
    tags: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_for(server: &mockito::Server) -> DockerRegistry {
        DockerRegistry::with_base_urls(
            Arc::new(HttpClient::new()),
            Arc::new(TtlCache::new()),
            server.url(),
            server.url(),
        )
    }

    #[tokio::test]
    async fn test_dockerhub_bare_name_uses_library_namespace() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/v2/repositories/library/nginx/tags?page_size=100")
            .with_status(200)
            .with_body(
                r#"{
                    "results": [
                        {"name": "1.25.3",
                         "images": [{"digest": "sha256:abc123"}],
                         "tag_last_pushed": "2023-10-24T13:48:22Z",
                         "full_size": 67890123},
                        {"name": "latest", "images": []}
                    ]
                }"#,
            )
            .create_async()
            .await;

        let registry = registry_for(&server);
        let tags = registry.dockerhub_tags("nginx").await.unwrap();
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0].name, "1.25.3");
        assert_eq!(tags[0].digest.as_deref(), Some("sha256:abc123"));
        assert_eq!(tags[0].size, Some(67_890_123));
        assert!(tags[1].digest.is_none());
    }

    #[tokio::test]
    async fn test_dockerhub_namespaced_image() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/v2/repositories/grafana/grafana/tags?page_size=100")
            .with_status(200)
            .with_body(r#"{"results": [{"name": "10.2.0", "images": []}]}"#)
            .create_async()
            .await;

        let registry = registry_for(&server);
        let tags = registry.dockerhub_tags("grafana/grafana").await.unwrap();
        assert_eq!(tags[0].name, "10.2.0");
    }

    #[tokio::test]
    async fn test_ghcr_prefix_normalisation() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/v2/owner/app/tags/list")
            .with_status(200)
            .with_body(r#"{"name": "owner/app", "tags": ["1.0.0", "latest"]}"#)
            .create_async()
            .await;

        let registry = registry_for(&server);
        let tags = registry.ghcr_tags("ghcr.io/owner/app").await.unwrap();
        assert_eq!(tags.len(), 2);
        assert!(tags[0].digest.is_none());
    }

    #[tokio::test]
    async fn test_custom_registry_base() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/v2/team/service/tags/list")
            .with_status(200)
            .with_body(r#"{"tags": ["2.1.0"]}"#)
            .create_async()
            .await;

        let registry = registry_for(&server);
        let tags = registry
            .custom_tags(&server.url(), "team/service")
            .await
            .unwrap();
        assert_eq!(tags[0].name, "2.1.0");
    }

    #[tokio::test]
    async fn test_dockerhub_tags_cached() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v2/repositories/library/redis/tags?page_size=100")
            .with_status(200)
            .with_body(r#"{"results": [{"name": "7.2", "images": []}]}"#)
            .expect(1)
            .create_async()
            .await;

        let registry = registry_for(&server);
        registry.dockerhub_tags("redis").await.unwrap();
        registry.dockerhub_tags("redis").await.unwrap();
        mock.assert_async().await;
    }
}
