//! The `check_rust_versions` tool.

use crate::registry::CratesIoRegistry;
use async_trait::async_trait;
use pkgver_core::types::registry_names;
use pkgver_core::version::clean;
use pkgver_core::{
    DependencySet, PackageVersion, Result, ToolHandler, parse_request, require_field,
    sort_by_name,
};
use serde::Deserialize;
use serde_json::{Value, json};

/// Resolver for Cargo dependencies.
pub struct CargoResolver {
    registry: CratesIoRegistry,
}

#[derive(Debug, Deserialize)]
struct CargoRequest {
    dependencies: DependencySet,
}

impl CargoResolver {
    pub fn new(registry: CratesIoRegistry) -> Self {
        Self { registry }
    }

    async fn check(&self, request: CargoRequest) -> Vec<PackageVersion> {
        let entries = request.dependencies.entries();
        let mut results = Vec::with_capacity(entries.len());

        for (name, spec) in entries {
            let current = spec.version().map(|v| clean(v).to_string());

            match self.registry.get_latest(&name).await {
                Ok(latest) => results.push(PackageVersion::resolved(
                    name,
                    current.as_deref(),
                    latest,
                    registry_names::CRATES_IO,
                )),
                Err(e) => {
                    tracing::debug!("crates.io lookup failed for {name}: {e}");
                    results.push(PackageVersion::skipped(
                        name,
                        current.as_deref(),
                        registry_names::CRATES_IO,
                        e.to_string(),
                    ));
                }
            }
        }

        sort_by_name(&mut results);
        results
    }
}

#[async_trait]
impl ToolHandler for CargoResolver {
    fn name(&self) -> &'static str {
        "check_rust_versions"
    }

    fn description(&self) -> &'static str {
        "Check latest stable versions for Rust crates from Cargo.toml"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "dependencies": {
                    "type": "object",
                    "description": "Dependencies table from Cargo.toml; values may be version strings or tables with a version key"
                }
            },
            "required": ["dependencies"]
        })
    }

    async fn call(&self, args: Value) -> Result<Value> {
        require_field(&args, "dependencies")?;
        let request: CargoRequest = parse_request(args)?;
        let results = self.check(request).await;
        Ok(serde_json::to_value(results)?)
    }
}
