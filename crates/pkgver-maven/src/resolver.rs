//! The `check_maven_versions` and `check_gradle_versions` tools.

use crate::registry::MavenCentralRegistry;
use async_trait::async_trait;
use pkgver_core::types::registry_names;
use pkgver_core::version::clean;
use pkgver_core::{
    PackageVersion, Result, ToolHandler, parse_request, require_field, sort_by_name,
};
use serde::Deserialize;
use serde_json::{Value, json};

/// Resolver for pom.xml dependency lists.
pub struct MavenResolver {
    registry: MavenCentralRegistry,
}

#[derive(Debug, Deserialize)]
struct MavenRequest {
    dependencies: Vec<MavenDependency>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MavenDependency {
    group_id: String,
    artifact_id: String,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    scope: Option<String>,
}

impl MavenResolver {
    pub fn new(registry: MavenCentralRegistry) -> Self {
        Self { registry }
    }

    async fn check(&self, request: MavenRequest) -> Vec<PackageVersion> {
        let mut results = Vec::with_capacity(request.dependencies.len());
        let mut seen = std::collections::HashSet::new();

        for dep in &request.dependencies {
            if !seen.insert((dep.group_id.clone(), dep.artifact_id.clone())) {
                continue;
            }
            let decoration = dep.scope.as_deref().map(|s| format!(" ({s})"));
            results.push(
                resolve_coordinate(
                    &self.registry,
                    &dep.group_id,
                    &dep.artifact_id,
                    dep.version.as_deref(),
                    decoration.as_deref(),
                    registry_names::MAVEN,
                )
                .await,
            );
        }

        sort_by_name(&mut results);
        results
    }
}

#[async_trait]
impl ToolHandler for MavenResolver {
    fn name(&self) -> &'static str {
        "check_maven_versions"
    }

    fn description(&self) -> &'static str {
        "Check latest versions for Maven dependencies from pom.xml"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "dependencies": {
                    "type": "array",
                    "description": "Maven coordinates to check",
                    "items": {
                        "type": "object",
                        "properties": {
                            "groupId": {"type": "string"},
                            "artifactId": {"type": "string"},
                            "version": {"type": "string"},
                            "scope": {"type": "string"}
                        },
                        "required": ["groupId", "artifactId"]
                    }
                }
            },
            "required": ["dependencies"]
        })
    }

    async fn call(&self, args: Value) -> Result<Value> {
        require_field(&args, "dependencies")?;
        let request: MavenRequest = parse_request(args)?;
        let results = self.check(request).await;
        Ok(serde_json::to_value(results)?)
    }
}

/// Resolver for Gradle dependency lists. Same upstream as Maven; the
/// request shape and name decoration follow Gradle conventions.
pub struct GradleResolver {
    registry: MavenCentralRegistry,
}

#[derive(Debug, Deserialize)]
struct GradleRequest {
    dependencies: Vec<GradleDependency>,
}

#[derive(Debug, Deserialize)]
struct GradleDependency {
    configuration: String,
    group: String,
    name: String,
    #[serde(default)]
    version: Option<String>,
}

impl GradleResolver {
    pub fn new(registry: MavenCentralRegistry) -> Self {
        Self { registry }
    }

    async fn check(&self, request: GradleRequest) -> Vec<PackageVersion> {
        let mut results = Vec::with_capacity(request.dependencies.len());
        let mut seen = std::collections::HashSet::new();

        for dep in &request.dependencies {
            if !seen.insert((dep.group.clone(), dep.name.clone())) {
                continue;
            }
            let decoration = format!(" ({})", dep.configuration);
            results.push(
                resolve_coordinate(
                    &self.registry,
                    &dep.group,
                    &dep.name,
                    dep.version.as_deref(),
                    Some(&decoration),
                    registry_names::GRADLE,
                )
                .await,
            );
        }

        sort_by_name(&mut results);
        results
    }
}

#[async_trait]
impl ToolHandler for GradleResolver {
    fn name(&self) -> &'static str {
        "check_gradle_versions"
    }

    fn description(&self) -> &'static str {
        "Check latest versions for Gradle dependencies"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "dependencies": {
                    "type": "array",
                    "description": "Gradle dependency declarations to check",
                    "items": {
                        "type": "object",
                        "properties": {
                            "configuration": {"type": "string"},
                            "group": {"type": "string"},
                            "name": {"type": "string"},
                            "version": {"type": "string"}
                        },
                        "required": ["configuration", "group", "name"]
                    }
                }
            },
            "required": ["dependencies"]
        })
    }

    async fn call(&self, args: Value) -> Result<Value> {
        require_field(&args, "dependencies")?;
        let request: GradleRequest = parse_request(args)?;
        let results = self.check(request).await;
        Ok(serde_json::to_value(results)?)
    }
}

async fn resolve_coordinate(
    registry: &MavenCentralRegistry,
    group: &str,
    artifact: &str,
    version: Option<&str>,
    decoration: Option<&str>,
    registry_name: &str,
) -> PackageVersion {
    let name = match decoration {
        Some(decoration) => format!("{group}:{artifact}{decoration}"),
        None => format!("{group}:{artifact}"),
    };
    let current = version.map(|v| clean(v).to_string());

    match registry.get_latest(group, artifact).await {
        Ok(latest) => PackageVersion::resolved(name, current.as_deref(), latest, registry_name),
        Err(e) => {
            tracing::debug!("maven lookup failed for {group}:{artifact}: {e}");
            PackageVersion::skipped(name, current.as_deref(), registry_name, e.to_string())
        }
    }
}
