//! The `check_dart_versions` tool.
//!
//! pubspec.yaml dependency values come in several shapes: plain version
//! strings, `sdk: flutter` strings, and tables declaring `sdk`, `git` or
//! `path` sources. SDK and source-declared dependencies have no registry
//! version to resolve, so they surface as skips with sentinel latests.

use crate::registry::PubDevRegistry;
use async_trait::async_trait;
use pkgver_core::types::{
    LATEST_SDK_DEPENDENCY, LATEST_SPECIAL_DEPENDENCY, registry_names,
};
use pkgver_core::version::clean;
use pkgver_core::{
    DependencySet, DependencySpec, PackageVersion, Result, ToolHandler, parse_request,
    require_field, sort_by_name,
};
use serde::Deserialize;
use serde_json::{Value, json};

/// Resolver for Dart/Flutter dependencies.
pub struct DartResolver {
    registry: PubDevRegistry,
}

#[derive(Debug, Deserialize)]
struct DartRequest {
    dependencies: DependencySet,
}

/// Why a dependency cannot be resolved against pub.dev.
enum Unresolvable {
    Sdk(&'static str),
    Special(&'static str),
}

impl DartResolver {
    pub fn new(registry: PubDevRegistry) -> Self {
        Self { registry }
    }

    async fn check(&self, request: DartRequest) -> Vec<PackageVersion> {
        let entries = request.dependencies.entries();
        let mut results = Vec::with_capacity(entries.len());

        for (name, spec) in entries {
            // `sdk: flutter` is a source marker, not a version
            let current = spec
                .version()
                .filter(|v| !v.trim_start().starts_with("sdk:"))
                .map(|v| clean(v).to_string());

            if let Some(unresolvable) = classify(&name, &spec) {
                let (latest, reason) = match unresolvable {
                    Unresolvable::Sdk(reason) => (LATEST_SDK_DEPENDENCY, reason),
                    Unresolvable::Special(reason) => (LATEST_SPECIAL_DEPENDENCY, reason),
                };
                results.push(PackageVersion::skipped_with_latest(
                    name,
                    current.as_deref(),
                    latest,
                    registry_names::PUB_DEV,
                    reason,
                ));
                continue;
            }

            match self.registry.get_latest(&name).await {
                Ok(latest) => results.push(PackageVersion::resolved(
                    name,
                    current.as_deref(),
                    latest,
                    registry_names::PUB_DEV,
                )),
                Err(e) => {
                    tracing::debug!("pub.dev lookup failed for {name}: {e}");
                    results.push(PackageVersion::skipped(
                        name,
                        current.as_deref(),
                        registry_names::PUB_DEV,
                        e.to_string(),
                    ));
                }
            }
        }

        sort_by_name(&mut results);
        results
    }
}

fn classify(name: &str, spec: &DependencySpec) -> Option<Unresolvable> {
    if name == "flutter" || name.starts_with("flutter:") {
        return Some(Unresolvable::Sdk("Flutter SDK dependency"));
    }
    if name == "dart" || name.starts_with("dart:") {
        return Some(Unresolvable::Sdk("Dart SDK dependency"));
    }

    if let DependencySpec::Version(v) = spec
        && v.trim_start().starts_with("sdk:")
    {
        return Some(Unresolvable::Sdk("SDK dependency"));
    }
    if spec.get("sdk").is_some() {
        return Some(Unresolvable::Sdk("SDK dependency"));
    }

    if spec.get("git").is_some() {
        return Some(Unresolvable::Special("Git dependency"));
    }
    if spec.get("path").is_some() {
        return Some(Unresolvable::Special("Path dependency"));
    }

    None
}

#[async_trait]
impl ToolHandler for DartResolver {
    fn name(&self) -> &'static str {
        "check_dart_versions"
    }

    fn description(&self) -> &'static str {
        "Check latest versions for Dart/Flutter packages from pubspec.yaml"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "dependencies": {
                    "type": "object",
                    "description": "Dependencies from pubspec.yaml; values may be version strings or source tables"
                }
            },
            "required": ["dependencies"]
        })
    }

    async fn call(&self, args: Value) -> Result<Value> {
        require_field(&args, "dependencies")?;
        let request: DartRequest = parse_request(args)?;
        let results = self.check(request).await;
        Ok(serde_json::to_value(results)?)
    }
}
