//! The `check_go_versions` tool.
//!
//! Accepts either a go.mod-shaped object (`module`, `require[]`,
//! `replace[]`) or a plain `{path → version}` map. Required modules with
//! a matching `replace` directive are never looked up; they surface as
//! skipped entries pointing at the replacement.

use crate::registry::GoProxyRegistry;
use async_trait::async_trait;
use pkgver_core::types::registry_names;
use pkgver_core::{
    PackageVersion, Result, ToolHandler, parse_request, require_field, sort_by_name,
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::collections::HashMap;

/// Resolver for Go module dependencies.
pub struct GoResolver {
    registry: GoProxyRegistry,
}

#[derive(Debug, Deserialize)]
struct GoRequest {
    dependencies: GoDependencies,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GoDependencies {
    Manifest(GoManifest),
    Simple(serde_json::Map<String, Value>),
}

// deny_unknown_fields keeps the untagged decode honest: a plain
// {path → version} map must fall through to the Simple arm instead of
// matching a manifest with defaulted require/replace lists.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct GoManifest {
    #[serde(default)]
    #[allow(dead_code)]
    module: Option<String>,
    #[serde(default)]
    require: Vec<GoRequire>,
    #[serde(default)]
    replace: Vec<GoReplace>,
}

#[derive(Debug, Deserialize)]
struct GoRequire {
    path: String,
    #[serde(default)]
    version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoReplace {
    old: String,
    new: String,
    #[serde(default)]
    version: Option<String>,
}

impl GoResolver {
    pub fn new(registry: GoProxyRegistry) -> Self {
        Self { registry }
    }

    async fn check(&self, request: GoRequest) -> Vec<PackageVersion> {
        let (requires, replacements) = match request.dependencies {
            GoDependencies::Manifest(manifest) => {
                let replacements: HashMap<String, GoReplace> = manifest
                    .replace
                    .into_iter()
                    .map(|r| (r.old.clone(), r))
                    .collect();
                (manifest.require, replacements)
            }
            GoDependencies::Simple(map) => {
                let requires = map
                    .into_iter()
                    .map(|(path, version)| GoRequire {
                        path,
                        version: version.as_str().map(String::from),
                    })
                    .collect();
                (requires, HashMap::new())
            }
        };

        let mut results = Vec::with_capacity(requires.len());
        let mut seen = std::collections::HashSet::new();

        for require in &requires {
            if !seen.insert(require.path.clone()) {
                continue;
            }
            // Go versions keep their canonical `v` prefix end to end
            let current = require.version.as_deref();

            if let Some(replacement) = replacements.get(&require.path) {
                let target = match replacement.version.as_deref() {
                    Some(version) => format!("{}@{}", replacement.new, version),
                    None => replacement.new.clone(),
                };
                results.push(PackageVersion::skipped_with_latest(
                    require.path.clone(),
                    current,
                    format!("replaced by {target}"),
                    registry_names::GO,
                    "Module is replaced",
                ));
                continue;
            }

            match self.registry.get_latest(&require.path).await {
                Ok(latest) => results.push(PackageVersion::resolved(
                    require.path.clone(),
                    current,
                    latest,
                    registry_names::GO,
                )),
                Err(e) => {
                    tracing::debug!("go lookup failed for {}: {e}", require.path);
                    results.push(PackageVersion::skipped(
                        require.path.clone(),
                        current,
                        registry_names::GO,
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
impl ToolHandler for GoResolver {
    fn name(&self) -> &'static str {
        "check_go_versions"
    }

    fn description(&self) -> &'static str {
        "Check latest versions for Go modules from go.mod"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "dependencies": {
                    "type": "object",
                    "description": "go.mod content: {module, require[], replace[]} or a {path: version} map",
                    "properties": {
                        "module": {"type": "string"},
                        "require": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "properties": {
                                    "path": {"type": "string"},
                                    "version": {"type": "string"}
                                },
                                "required": ["path"]
                            }
                        },
                        "replace": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "properties": {
                                    "old": {"type": "string"},
                                    "new": {"type": "string"},
                                    "version": {"type": "string"}
                                },
                                "required": ["old", "new"]
                            }
                        }
                    }
                }
            },
            "required": ["dependencies"]
        })
    }

    async fn call(&self, args: Value) -> Result<Value> {
        require_field(&args, "dependencies")?;
        let request: GoRequest = parse_request(args)?;
        let results = self.check(request).await;
        Ok(serde_json::to_value(results)?)
    }
}
