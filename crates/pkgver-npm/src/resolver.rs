//! The `check_npm_versions` tool.

use crate::registry::{NpmPackageInfo, NpmRegistry};
use async_trait::async_trait;
use pkgver_core::types::{EXCLUDED_BY_CONSTRAINTS, registry_names};
use pkgver_core::version::{clean, compare, parse};
use pkgver_core::{
    Constraints, PackageVersion, Result, ToolHandler, VersionConstraint, parse_request,
    require_field, sort_by_name,
};
use serde::Deserialize;
use serde_json::{Value, json};

#[derive(Debug, Deserialize)]
struct NpmRequest {
    dependencies: serde_json::Map<String, Value>,
    #[serde(default)]
    constraints: Option<Constraints>,
}

/// Resolver for npm dependencies.
pub struct NpmResolver {
    registry: NpmRegistry,
}

impl NpmResolver {
    pub fn new(registry: NpmRegistry) -> Self {
        Self { registry }
    }

    async fn check(&self, request: NpmRequest) -> Vec<PackageVersion> {
        let constraints = request.constraints.unwrap_or_default();
        let mut results = Vec::with_capacity(request.dependencies.len());

        for (name, value) in request.dependencies {
            let current = value.as_str().map(|v| clean(v).to_string());
            let constraint = constraints.get(&name);

            if constraint.is_some_and(|c| c.exclude_package) {
                results.push(PackageVersion::skipped(
                    name,
                    current.as_deref(),
                    registry_names::NPM,
                    EXCLUDED_BY_CONSTRAINTS,
                ));
                continue;
            }

            match self.registry.get_package(&name).await {
                Ok(info) => {
                    let latest = select_latest(&info, constraint);
                    match latest {
                        Some(latest) => results.push(PackageVersion::resolved(
                            name,
                            current.as_deref(),
                            latest,
                            registry_names::NPM,
                        )),
                        None => results.push(PackageVersion::skipped(
                            name,
                            current.as_deref(),
                            registry_names::NPM,
                            "No versions published",
                        )),
                    }
                }
                Err(e) => {
                    tracing::debug!("npm lookup failed for {name}: {e}");
                    results.push(PackageVersion::skipped(
                        name,
                        current.as_deref(),
                        registry_names::NPM,
                        e.to_string(),
                    ));
                }
            }
        }

        sort_by_name(&mut results);
        results
    }
}

/// Applies the npm selection rules: `dist-tags.latest` first, the
/// lexicographic maximum of the version keys as a fallback, and a
/// major-pin re-selection when a constraint caps the major below the
/// chosen latest. A pin with no matching published version retains the
/// original latest.
fn select_latest(info: &NpmPackageInfo, constraint: Option<&VersionConstraint>) -> Option<String> {
    let latest = match &info.latest_tag {
        Some(tag) => tag.clone(),
        None => info.versions.iter().max()?.clone(),
    };

    if let Some(pin) = constraint.and_then(|c| c.major_version)
        && parse(clean(&latest)).is_some_and(|v| v.major > pin)
    {
        let pinned = info
            .versions
            .iter()
            .filter(|v| parse(clean(v)).is_some_and(|p| p.major == pin))
            .max_by(|a, b| compare(clean(a), clean(b)));
        if let Some(pinned) = pinned {
            return Some(pinned.clone());
        }
    }

    Some(latest)
}

#[async_trait]
impl ToolHandler for NpmResolver {
    fn name(&self) -> &'static str {
        "check_npm_versions"
    }

    fn description(&self) -> &'static str {
        "Check latest stable versions for npm packages"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "dependencies": {
                    "type": "object",
                    "description": "Dependencies object from package.json",
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
        let request: NpmRequest = parse_request(args)?;
        let results = self.check(request).await;
        Ok(serde_json::to_value(results)?)
    }
}
