//! The `check_swift_versions` tool.

use crate::registry::{GitHubReleaseRegistry, ReleaseCandidate};
use async_trait::async_trait;
use pkgver_core::types::{EXCLUDED_BY_CONSTRAINTS, registry_names};
use pkgver_core::version::{clean, compare, parse};
use pkgver_core::{
    Constraints, PackageVersion, Result, ToolHandler, parse_request, require_field,
    sort_by_name,
};
use serde::Deserialize;
use serde_json::{Value, json};

/// Resolver for Swift package dependencies.
pub struct SwiftResolver {
    registry: GitHubReleaseRegistry,
}

#[derive(Debug, Deserialize)]
struct SwiftRequest {
    dependencies: Vec<SwiftDependency>,
    #[serde(default)]
    constraints: Option<Constraints>,
}

#[derive(Debug, Deserialize)]
struct SwiftDependency {
    url: String,
    #[serde(default)]
    version: Option<String>,
}

impl SwiftResolver {
    pub fn new(registry: GitHubReleaseRegistry) -> Self {
        Self { registry }
    }

    async fn check(&self, request: SwiftRequest) -> Vec<PackageVersion> {
        let constraints = request.constraints.unwrap_or_default();
        let mut results = Vec::with_capacity(request.dependencies.len());
        let mut seen = std::collections::HashSet::new();

        for dep in &request.dependencies {
            if !seen.insert(dep.url.clone()) {
                continue;
            }
            let current = dep.version.as_deref().map(|v| clean(v).to_string());
            let constraint = constraints.get(&dep.url);

            if constraint.is_some_and(|c| c.exclude_package) {
                results.push(PackageVersion::skipped(
                    dep.url.clone(),
                    current.as_deref(),
                    registry_names::SWIFT,
                    EXCLUDED_BY_CONSTRAINTS,
                ));
                continue;
            }

            let Some((owner, repo)) = parse_github_url(&dep.url) else {
                results.push(PackageVersion::skipped(
                    dep.url.clone(),
                    current.as_deref(),
                    registry_names::SWIFT,
                    "Non-GitHub repository",
                ));
                continue;
            };

            let cache_key = format!("swift:{}", dep.url);
            match self.registry.get_candidates(&cache_key, &owner, &repo).await {
                Ok(candidates) => {
                    let pin = constraint.and_then(|c| c.major_version);
                    match select_latest(&candidates, pin) {
                        Some(latest) => results.push(PackageVersion::resolved(
                            dep.url.clone(),
                            current.as_deref(),
                            latest,
                            registry_names::SWIFT,
                        )),
                        None => results.push(PackageVersion::skipped(
                            dep.url.clone(),
                            current.as_deref(),
                            registry_names::SWIFT,
                            "No releases or tags found",
                        )),
                    }
                }
                Err(e) => {
                    tracing::debug!("swift lookup failed for {}: {e}", dep.url);
                    results.push(PackageVersion::skipped(
                        dep.url.clone(),
                        current.as_deref(),
                        registry_names::SWIFT,
                        e.to_string(),
                    ));
                }
            }
        }

        sort_by_name(&mut results);
        results
    }
}

/// Extracts `(owner, repo)` from a GitHub URL, accepting `https`,
/// `http`, `git` and ssh `git@` forms with an optional `.git` suffix.
pub fn parse_github_url(url: &str) -> Option<(String, String)> {
    let rest = url
        .strip_prefix("https://github.com/")
        .or_else(|| url.strip_prefix("http://github.com/"))
        .or_else(|| url.strip_prefix("git://github.com/"))
        .or_else(|| url.strip_prefix("git@github.com:"))?;

    let mut segments = rest.trim_end_matches('/').splitn(2, '/');
    let owner = segments.next()?.to_string();
    let repo = segments
        .next()?
        .trim_end_matches(".git")
        .to_string();

    if owner.is_empty() || repo.is_empty() || repo.contains('/') {
        return None;
    }
    Some((owner, repo))
}

/// Highest candidate per the shared version order, with leading `v`
/// stripped from the reported version. Candidates arrive already
/// filtered to stable releases (or tags). A major pin re-selects inside
/// the pinned major when the overall latest exceeds it.
fn select_latest(candidates: &[ReleaseCandidate], pin: Option<u64>) -> Option<String> {
    let latest = candidates
        .iter()
        .max_by(|a, b| compare(clean(&a.tag), clean(&b.tag)))?;
    let latest_version = clean(&latest.tag).to_string();

    if let Some(pin) = pin
        && parse(&latest_version).is_some_and(|v| v.major > pin)
    {
        let pinned = candidates
            .iter()
            .filter(|c| parse(clean(&c.tag)).is_some_and(|v| v.major == pin))
            .max_by(|a, b| compare(clean(&a.tag), clean(&b.tag)));
        if let Some(pinned) = pinned {
            return Some(clean(&pinned.tag).to_string());
        }
    }

    Some(latest_version)
}

#[async_trait]
impl ToolHandler for SwiftResolver {
    fn name(&self) -> &'static str {
        "check_swift_versions"
    }

    fn description(&self) -> &'static str {
        "Check latest versions for Swift packages hosted on GitHub"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "dependencies": {
                    "type": "array",
                    "description": "Package.swift dependency declarations",
                    "items": {
                        "type": "object",
                        "properties": {
                            "url": {"type": "string"},
                            "version": {"type": "string"},
                            "requirement": {"type": "string"}
                        },
                        "required": ["url"]
                    }
                },
                "constraints": {
                    "type": "object",
                    "description": "Optional per-package constraints keyed by URL",
                    "additionalProperties": {
                        "type": "object",
                        "properties": {
                            "majorVersion": {"type": "integer"},
                            "excludePackage": {"type": "boolean"}
                        }
                    }
                }
            },
            "required": ["dependencies"]
        })
    }

    async fn call(&self, args: Value) -> Result<Value> {
        require_field(&args, "dependencies")?;
        let request: SwiftRequest = parse_request(args)?;
        let results = self.check(request).await;
        Ok(serde_json::to_value(results)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pkgver_core::{HttpClient, TtlCache};
    use std::sync::Arc;

    fn resolver_for(server: &mockito::Server) -> SwiftResolver {
        SwiftResolver::new(GitHubReleaseRegistry::with_base_url(
            Arc::new(HttpClient::new()),
            Arc::new(TtlCache::new()),
            server.url(),
        ))
    }

    fn candidate(tag: &str) -> ReleaseCandidate {
        ReleaseCandidate { tag: tag.into() }
    }

    #[test]
    fn test_parse_github_url_forms() {
        assert_eq!(
            parse_github_url("https://github.com/apple/swift-nio"),
            Some(("apple".into(), "swift-nio".into()))
        );
        assert_eq!(
            parse_github_url("https://github.com/apple/swift-nio.git"),
            Some(("apple".into(), "swift-nio".into()))
        );
        assert_eq!(
            parse_github_url("git@github.com:apple/swift-nio.git"),
            Some(("apple".into(), "swift-nio".into()))
        );
        assert_eq!(parse_github_url("https://gitlab.com/a/b"), None);
        assert_eq!(parse_github_url("https://github.com/onlyowner"), None);
    }

    #[test]
    fn test_select_latest_highest_version_wins() {
        let candidates = vec![
            candidate("v1.4.0"),
            candidate("v1.5.0"),
            candidate("v1.5.0-rc.1"),
        ];
        assert_eq!(select_latest(&candidates, None), Some("1.5.0".into()));
    }

    #[test]
    fn test_select_latest_major_pin() {
        let candidates = vec![
            candidate("v2.1.0"),
            candidate("v1.9.0"),
            candidate("v1.8.0"),
        ];
        assert_eq!(select_latest(&candidates, Some(1)), Some("1.9.0".into()));
    }

    #[test]
    fn test_select_latest_pin_without_match_keeps_latest() {
        let candidates = vec![candidate("v3.0.0")];
        assert_eq!(select_latest(&candidates, Some(1)), Some("3.0.0".into()));
    }

    #[test]
    fn test_select_latest_empty() {
        assert_eq!(select_latest(&[], None), None);
    }

    #[tokio::test]
    async fn test_non_github_url_is_skipped() {
        let server = mockito::Server::new_async().await;
        let resolver = resolver_for(&server);
        let result = resolver
            .call(json!({
                "dependencies": [{"url": "https://gitlab.com/a/b", "version": "1.0.0"}]
            }))
            .await
            .unwrap();

        assert_eq!(result[0]["skipped"], json!(true));
        assert_eq!(result[0]["skipReason"], json!("Non-GitHub repository"));
    }

    #[tokio::test]
    async fn test_release_resolution() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/repos/apple/swift-nio/releases")
            .with_status(200)
            .with_body(
                r#"[
                    {"tag_name": "v2.62.0", "draft": false, "prerelease": false},
                    {"tag_name": "v2.61.0", "draft": false, "prerelease": false}
                ]"#,
            )
            .create_async()
            .await;

        let resolver = resolver_for(&server);
        let result = resolver
            .call(json!({
                "dependencies": [{
                    "url": "https://github.com/apple/swift-nio",
                    "version": "2.60.0"
                }]
            }))
            .await
            .unwrap();

        assert_eq!(result[0]["latestVersion"], json!("2.62.0"));
        assert_eq!(result[0]["currentVersion"], json!("2.60.0"));
        assert_eq!(result[0]["registry"], json!("swift"));
    }

    #[tokio::test]
    async fn test_prerelease_only_repo_resolves_from_tags() {
        let mut server = mockito::Server::new_async().await;
        let _releases = server
            .mock("GET", "/repos/a/beta/releases")
            .with_status(200)
            .with_body(
                r#"[
                    {"tag_name": "v2.0.0-beta.2", "draft": false, "prerelease": true},
                    {"tag_name": "v2.0.0-beta.1", "draft": false, "prerelease": true}
                ]"#,
            )
            .create_async()
            .await;
        let _tags = server
            .mock("GET", "/repos/a/beta/tags")
            .with_status(200)
            .with_body(r#"[{"name": "v1.3.0"}, {"name": "v1.2.0"}]"#)
            .create_async()
            .await;

        let resolver = resolver_for(&server);
        let result = resolver
            .call(json!({
                "dependencies": [{"url": "https://github.com/a/beta", "version": "1.2.0"}]
            }))
            .await
            .unwrap();

        assert_eq!(result[0]["latestVersion"], json!("1.3.0"));
        assert!(result[0].get("skipped").is_none());
    }

    #[tokio::test]
    async fn test_constraint_pins_major() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/repos/a/pkg/releases")
            .with_status(200)
            .with_body(
                r#"[
                    {"tag_name": "2.0.0", "draft": false, "prerelease": false},
                    {"tag_name": "1.7.0", "draft": false, "prerelease": false}
                ]"#,
            )
            .create_async()
            .await;

        let resolver = resolver_for(&server);
        let url = "https://github.com/a/pkg";
        let result = resolver
            .call(json!({
                "dependencies": [{"url": url}],
                "constraints": {url: {"majorVersion": 1}}
            }))
            .await
            .unwrap();

        assert_eq!(result[0]["latestVersion"], json!("1.7.0"));
    }

    #[tokio::test]
    async fn test_missing_dependencies_key() {
        let server = mockito::Server::new_async().await;
        let resolver = resolver_for(&server);
        assert!(resolver.call(json!({})).await.is_err());
    }
}
