//! The `check_python_versions` and `check_pyproject_versions` tools.

use crate::parser::{RequirementLine, current_version_from_specifier, parse_requirement_line};
use crate::registry::PypiRegistry;
use async_trait::async_trait;
use pkgver_core::types::registry_names;
use pkgver_core::version::clean;
use pkgver_core::{
    PackageVersion, Result, ToolHandler, parse_request, require_field, sort_by_name,
};
use serde::Deserialize;
use serde_json::{Value, json};

/// Resolver for requirements.txt-style dependency lists.
pub struct PythonRequirementsResolver {
    registry: PypiRegistry,
}

#[derive(Debug, Deserialize)]
struct RequirementsRequest {
    requirements: Vec<String>,
}

impl PythonRequirementsResolver {
    pub fn new(registry: PypiRegistry) -> Self {
        Self { registry }
    }

    async fn check(&self, request: RequirementsRequest) -> Vec<PackageVersion> {
        let mut results = Vec::new();
        let mut seen = std::collections::HashSet::new();

        for line in &request.requirements {
            match parse_requirement_line(line) {
                RequirementLine::Ignored => {}
                RequirementLine::Invalid { raw } => {
                    if seen.insert(raw.clone()) {
                        results.push(PackageVersion::skipped(
                            raw,
                            None,
                            registry_names::PYPI,
                            "Could not parse requirement",
                        ));
                    }
                }
                RequirementLine::Parsed { name, specifier } => {
                    if !seen.insert(name.clone()) {
                        continue;
                    }
                    let current = specifier
                        .as_deref()
                        .and_then(current_version_from_specifier);
                    results.push(
                        resolve_one(&self.registry, &name, current.as_deref(), None).await,
                    );
                }
            }
        }

        sort_by_name(&mut results);
        results
    }
}

#[async_trait]
impl ToolHandler for PythonRequirementsResolver {
    fn name(&self) -> &'static str {
        "check_python_versions"
    }

    fn description(&self) -> &'static str {
        "Check latest stable versions for Python packages from requirements.txt lines"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "requirements": {
                    "type": "array",
                    "description": "Lines from requirements.txt",
                    "items": {"type": "string"}
                }
            },
            "required": ["requirements"]
        })
    }

    async fn call(&self, args: Value) -> Result<Value> {
        require_field(&args, "requirements")?;
        let request: RequirementsRequest = parse_request(args)?;
        let results = self.check(request).await;
        Ok(serde_json::to_value(results)?)
    }
}

/// Resolver for pyproject.toml-shaped dependency groups.
pub struct PyprojectResolver {
    registry: PypiRegistry,
}

#[derive(Debug, Deserialize)]
struct PyprojectRequest {
    dependencies: PyprojectGroups,
}

#[derive(Debug, Default, Deserialize)]
struct PyprojectGroups {
    #[serde(default)]
    dependencies: serde_json::Map<String, Value>,
    #[serde(default, rename = "optional-dependencies")]
    optional_dependencies: serde_json::Map<String, Value>,
    #[serde(default, rename = "dev-dependencies")]
    dev_dependencies: serde_json::Map<String, Value>,
}

impl PyprojectResolver {
    pub fn new(registry: PypiRegistry) -> Self {
        Self { registry }
    }

    async fn check(&self, request: PyprojectRequest) -> Vec<PackageVersion> {
        let groups = request.dependencies;
        let mut results = Vec::new();

        for (name, value) in &groups.dependencies {
            let current = declared_version(value);
            results.push(resolve_one(&self.registry, name, current.as_deref(), None).await);
        }

        for (group, members) in &groups.optional_dependencies {
            let Some(members) = members.as_object() else {
                continue;
            };
            for (name, value) in members {
                let current = declared_version(value);
                results.push(
                    resolve_one(
                        &self.registry,
                        name,
                        current.as_deref(),
                        Some(&format!(" (optional:{group})")),
                    )
                    .await,
                );
            }
        }

        for (name, value) in &groups.dev_dependencies {
            let current = declared_version(value);
            results.push(
                resolve_one(&self.registry, name, current.as_deref(), Some(" (dev)")).await,
            );
        }

        sort_by_name(&mut results);
        results
    }
}

#[async_trait]
impl ToolHandler for PyprojectResolver {
    fn name(&self) -> &'static str {
        "check_pyproject_versions"
    }

    fn description(&self) -> &'static str {
        "Check latest stable versions for Python packages from pyproject.toml dependency groups"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "dependencies": {
                    "type": "object",
                    "description": "Dependency groups from pyproject.toml",
                    "properties": {
                        "dependencies": {"type": "object"},
                        "optional-dependencies": {"type": "object"},
                        "dev-dependencies": {"type": "object"}
                    }
                }
            },
            "required": ["dependencies"]
        })
    }

    async fn call(&self, args: Value) -> Result<Value> {
        require_field(&args, "dependencies")?;
        let request: PyprojectRequest = parse_request(args)?;
        let results = self.check(request).await;
        Ok(serde_json::to_value(results)?)
    }
}

/// Declared version from a scalar or `{version = "…"}` table value.
fn declared_version(value: &Value) -> Option<String> {
    let raw = value
        .as_str()
        .or_else(|| value.get("version").and_then(Value::as_str))?;
    let cleaned = clean(raw);
    if cleaned.is_empty() || cleaned == "*" {
        None
    } else {
        Some(cleaned.to_string())
    }
}

/// Looks up one package, folding failure into a skip descriptor. The
/// registry lookup always uses the bare name; `suffix` decorates the
/// result name only.
async fn resolve_one(
    registry: &PypiRegistry,
    name: &str,
    current: Option<&str>,
    suffix: Option<&str>,
) -> PackageVersion {
    let display = match suffix {
        Some(suffix) => format!("{name}{suffix}"),
        None => name.to_string(),
    };

    match registry.get_latest(name).await {
        Ok(latest) => PackageVersion::resolved(display, current, latest, registry_names::PYPI),
        Err(e) => {
            tracing::debug!("pypi lookup failed for {name}: {e}");
            PackageVersion::skipped(display, current, registry_names::PYPI, e.to_string())
        }
    }
}
