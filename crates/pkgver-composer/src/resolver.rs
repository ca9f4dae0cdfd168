//! The `check_composer_versions` tool.

use crate::registry::{ComposerVersion, PackagistRegistry, split_package_name};
use async_trait::async_trait;
use pkgver_core::types::{EXCLUDED_BY_CONSTRAINTS, registry_names};
use pkgver_core::version::{clean, compare, parse};
use pkgver_core::{
    Constraints, PackageVersion, Result, ToolHandler, parse_request, require_field,
    sort_by_name,
};
use serde::Deserialize;
use serde_json::{Value, json};

/// Resolver for PHP Composer dependencies.
pub struct ComposerResolver {
    registry: PackagistRegistry,
}

#[derive(Debug, Deserialize)]
struct ComposerRequest {
    dependencies: serde_json::Map<String, Value>,
    #[serde(default)]
    constraints: Option<Constraints>,
}

impl ComposerResolver {
    pub fn new(registry: PackagistRegistry) -> Self {
        Self { registry }
    }

    async fn check(&self, request: ComposerRequest) -> Vec<PackageVersion> {
        let constraints = request.constraints.unwrap_or_default();
        let mut results = Vec::with_capacity(request.dependencies.len());

        for (full_name, value) in request.dependencies {
            // php/ext requirements land here too; they have no vendor
            let current = value.as_str().map(|v| clean(v).to_string());

            let Some((vendor, name)) = split_package_name(&full_name) else {
                results.push(PackageVersion::skipped(
                    full_name,
                    current.as_deref(),
                    registry_names::PACKAGIST,
                    "Invalid package name format",
                ));
                continue;
            };

            let constraint = constraints.get(&full_name);
            if constraint.is_some_and(|c| c.exclude_package) {
                results.push(PackageVersion::skipped(
                    full_name,
                    current.as_deref(),
                    registry_names::PACKAGIST,
                    EXCLUDED_BY_CONSTRAINTS,
                ));
                continue;
            }

            match self.registry.get_versions(vendor, name).await {
                Ok(versions) => {
                    let pin = constraint.and_then(|c| c.major_version);
                    match select_with_pin(&versions, pin) {
                        Some(latest) => results.push(PackageVersion::resolved(
                            full_name,
                            current.as_deref(),
                            latest,
                            registry_names::PACKAGIST,
                        )),
                        None => results.push(PackageVersion::skipped(
                            full_name,
                            current.as_deref(),
                            registry_names::PACKAGIST,
                            "No stable versions found",
                        )),
                    }
                }
                Err(e) => {
                    tracing::debug!("packagist lookup failed for {full_name}: {e}");
                    results.push(PackageVersion::skipped(
                        full_name,
                        current.as_deref(),
                        registry_names::PACKAGIST,
                        e.to_string(),
                    ));
                }
            }
        }

        sort_by_name(&mut results);
        results
    }
}

/// Newest-by-time non-dev version, restricted to a pinned major when the
/// unpinned winner exceeds it.
fn select_with_pin(versions: &[ComposerVersion], pin: Option<u64>) -> Option<String> {
    let latest = crate::registry::select_latest(versions)?;
    let latest_version = clean(&latest.version).to_string();

    if let Some(pin) = pin
        && parse(&latest_version).is_some_and(|v| v.major > pin)
    {
        let pinned = versions
            .iter()
            .filter(|v| !v.is_dev)
            .filter(|v| parse(clean(&v.version)).is_some_and(|p| p.major == pin))
            .max_by(|a, b| compare(clean(&a.version), clean(&b.version)));
        if let Some(pinned) = pinned {
            return Some(clean(&pinned.version).to_string());
        }
    }

    Some(latest_version)
}

#[async_trait]
impl ToolHandler for ComposerResolver {
    fn name(&self) -> &'static str {
        "check_composer_versions"
    }

    fn description(&self) -> &'static str {
        "Check latest versions for PHP Composer packages"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "dependencies": {
                    "type": "object",
                    "description": "require section from composer.json",
                    "additionalProperties": {"type": "string"}
                },
                "constraints": {
                    "type": "object",
                    "description": "Optional per-package constraints",
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
        let request: ComposerRequest = parse_request(args)?;
        let results = self.check(request).await;
        Ok(serde_json::to_value(results)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pkgver_core::{HttpClient, TtlCache};
    use std::sync::Arc;

    fn resolver_for(server: &mockito::Server) -> ComposerResolver {
        ComposerResolver::new(PackagistRegistry::with_base_urls(
            Arc::new(HttpClient::new()),
            Arc::new(TtlCache::new()),
            server.url(),
            server.url(),
        ))
    }

    fn version(v: &str, time: &str) -> ComposerVersion {
        ComposerVersion {
            version: v.into(),
            time: Some(time.into()),
            is_dev: crate::registry::is_dev_version(v),
        }
    }

    #[test]
    fn test_select_with_pin() {
        let versions = vec![
            version("11.0.0", "2024-03-12T10:00:00+00:00"),
            version("10.3.0", "2024-01-16T10:00:00+00:00"),
            version("10.2.0", "2023-12-01T10:00:00+00:00"),
        ];
        assert_eq!(select_with_pin(&versions, None), Some("11.0.0".into()));
        assert_eq!(select_with_pin(&versions, Some(10)), Some("10.3.0".into()));
        // Pin with no published match retains the overall latest
        assert_eq!(select_with_pin(&versions, Some(9)), Some("11.0.0".into()));
    }

    #[tokio::test]
    async fn test_invalid_name_is_skipped() {
        let server = mockito::Server::new_async().await;
        let resolver = resolver_for(&server);
        let result = resolver
            .call(json!({"dependencies": {"invalidname": "^1.0"}}))
            .await
            .unwrap();

        assert_eq!(
            result,
            json!([{
                "name": "invalidname",
                "currentVersion": "1.0",
                "latestVersion": "unknown",
                "registry": "packagist",
                "skipped": true,
                "skipReason": "Invalid package name format"
            }])
        );
    }

    #[tokio::test]
    async fn test_latest_by_time_excludes_dev() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/packages/monolog/monolog.json")
            .with_status(200)
            .with_body(
                r#"{
                    "package": {
                        "versions": {
                            "dev-main": {"version": "dev-main", "time": "2024-06-01T00:00:00+00:00"},
                            "3.5.0": {"version": "3.5.0", "time": "2023-10-27T15:32:00+00:00"},
                            "3.4.0": {"version": "3.4.0", "time": "2023-06-21T08:46:00+00:00"}
                        }
                    }
                }"#,
            )
            .create_async()
            .await;

        let resolver = resolver_for(&server);
        let result = resolver
            .call(json!({"dependencies": {"monolog/monolog": "^3.0"}}))
            .await
            .unwrap();

        assert_eq!(result[0]["latestVersion"], json!("3.5.0"));
        assert_eq!(result[0]["currentVersion"], json!("3.0"));
    }

    #[tokio::test]
    async fn test_excluded_package() {
        let server = mockito::Server::new_async().await;
        let resolver = resolver_for(&server);
        let result = resolver
            .call(json!({
                "dependencies": {"guzzlehttp/guzzle": "^7.0"},
                "constraints": {"guzzlehttp/guzzle": {"excludePackage": true}}
            }))
            .await
            .unwrap();

        assert_eq!(result[0]["skipReason"], json!("Package excluded by constraints"));
    }

    #[tokio::test]
    async fn test_lookup_failure_is_skip() {
        let mut server = mockito::Server::new_async().await;
        for path in ["/packages/a/b.json", "/p2/a/b.json"] {
            server.mock("GET", path).with_status(404).create_async().await;
        }
        server
            .mock("GET", mockito::Matcher::Regex(r"^/search\.json.*".into()))
            .with_status(200)
            .with_body(r#"{"results": []}"#)
            .create_async()
            .await;

        let resolver = resolver_for(&server);
        let result = resolver
            .call(json!({"dependencies": {"a/b": "^1.0"}}))
            .await
            .unwrap();

        assert_eq!(result[0]["skipped"], json!(true));
        assert_eq!(result[0]["latestVersion"], json!("unknown"));
    }

    #[tokio::test]
    async fn test_missing_dependencies_key() {
        let server = mockito::Server::new_async().await;
        let resolver = resolver_for(&server);
        assert!(resolver.call(json!({"require": {}})).await.is_err());
    }
}
