//! Tool catalogue and dispatch.

use crate::config::ServerConfig;
use pkgver_core::{HttpClient, ResolveError, Result, ToolHandler, ToolResponse, TtlCache};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// The static tool catalogue.
///
/// Holds every registered tool in registration order (for `tools/list`
/// responses) plus a name index for dispatch.
pub struct ToolCatalog {
    tools: Vec<Arc<dyn ToolHandler>>,
    by_name: HashMap<&'static str, Arc<dyn ToolHandler>>,
}

impl ToolCatalog {
    /// An empty catalogue. Mostly useful in tests; production code goes
    /// through [`ToolCatalog::standard`].
    pub fn new() -> Self {
        Self {
            tools: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    /// Builds the full fourteen-tool catalogue over shared HTTP and
    /// cache state.
    pub fn standard(config: &ServerConfig) -> Self {
        let http = Arc::new(HttpClient::with_config(
            config.http_timeout(),
            &config.user_agent,
        ));
        let ttl = config.cache_ttl();

        // One string-valued cache serves every resolver that only needs
        // a latest-version lookup; keys are ecosystem-namespaced.
        let latest_cache = Arc::new(TtlCache::with_ttl(ttl));

        let mut catalog = Self::new();
        catalog.register(Arc::new(pkgver_npm::NpmResolver::new(
            pkgver_npm::NpmRegistry::new(Arc::clone(&http), Arc::new(TtlCache::with_ttl(ttl))),
        )));

        let pypi = pkgver_pypi::PypiRegistry::new(Arc::clone(&http), Arc::clone(&latest_cache));
        catalog.register(Arc::new(pkgver_pypi::PythonRequirementsResolver::new(
            pypi.clone(),
        )));
        catalog.register(Arc::new(pkgver_pypi::PyprojectResolver::new(pypi)));

        let maven =
            pkgver_maven::MavenCentralRegistry::new(Arc::clone(&http), Arc::clone(&latest_cache));
        catalog.register(Arc::new(pkgver_maven::MavenResolver::new(maven.clone())));
        catalog.register(Arc::new(pkgver_maven::GradleResolver::new(maven)));

        catalog.register(Arc::new(pkgver_go::GoResolver::new(
            pkgver_go::GoProxyRegistry::new(Arc::clone(&http), Arc::clone(&latest_cache)),
        )));
        catalog.register(Arc::new(pkgver_cargo::CargoResolver::new(
            pkgver_cargo::CratesIoRegistry::new(Arc::clone(&http), Arc::clone(&latest_cache)),
        )));
        catalog.register(Arc::new(pkgver_dart::DartResolver::new(
            pkgver_dart::PubDevRegistry::new(Arc::clone(&http), Arc::clone(&latest_cache)),
        )));
        catalog.register(Arc::new(pkgver_swift::SwiftResolver::new(
            pkgver_swift::GitHubReleaseRegistry::new(
                Arc::clone(&http),
                Arc::new(TtlCache::with_ttl(ttl)),
            ),
        )));
        catalog.register(Arc::new(pkgver_composer::ComposerResolver::new(
            pkgver_composer::PackagistRegistry::new(
                Arc::clone(&http),
                Arc::new(TtlCache::with_ttl(ttl)),
            ),
        )));
        catalog.register(Arc::new(pkgver_actions::ActionsResolver::new(
            pkgver_actions::ActionRegistry::new(
                Arc::clone(&http),
                Arc::new(TtlCache::with_ttl(ttl)),
            ),
        )));
        catalog.register(Arc::new(pkgver_docker::DockerResolver::new(
            pkgver_docker::DockerRegistry::new(
                Arc::clone(&http),
                Arc::new(TtlCache::with_ttl(ttl)),
            ),
        )));
        catalog.register(Arc::new(pkgver_bedrock::BedrockResolver::new()));
        catalog.register(Arc::new(pkgver_bedrock::LatestBedrockModelResolver::new()));

        catalog
    }

    /// Registers a tool. Last registration wins on name collision.
    pub fn register(&mut self, handler: Arc<dyn ToolHandler>) {
        self.by_name.insert(handler.name(), Arc::clone(&handler));
        self.tools.push(handler);
    }

    /// All tools in registration order.
    pub fn tools(&self) -> &[Arc<dyn ToolHandler>] {
        &self.tools
    }

    /// Dispatches one tool call and wraps the result in the protocol's
    /// text-content form.
    ///
    /// # Errors
    ///
    /// `UnknownTool` for unregistered names; handler errors propagate
    /// unchanged (the protocol layer reports them as call failures, not
    /// results).
    pub async fn call_tool(&self, name: &str, args: Value) -> Result<ToolResponse> {
        let handler = self
            .by_name
            .get(name)
            .ok_or_else(|| ResolveError::UnknownTool(name.to_string()))?;

        tracing::info!("tool call: {name}");
        let value = handler.call(args).await?;
        ToolResponse::from_value(&value)
    }

    /// Startup self-check over every registered schema.
    ///
    /// Every array-typed property — at any nesting depth — must declare
    /// an `items` object with a non-empty `type` string; protocol-side
    /// validators reject catalogues that violate this, so the server
    /// refuses to start instead.
    pub fn verify_schemas(&self) -> Result<()> {
        for tool in &self.tools {
            let schema = tool.input_schema();
            if schema.get("type").and_then(Value::as_str) != Some("object") {
                return Err(ResolveError::InvalidSchema {
                    tool: tool.name().to_string(),
                    message: "input schema must be object-typed".into(),
                });
            }
            verify_node(tool.name(), &schema, "$")?;
        }
        Ok(())
    }
}

impl Default for ToolCatalog {
    fn default() -> Self {
        Self::new()
    }
}

fn verify_node(tool: &str, node: &Value, path: &str) -> Result<()> {
    let Some(object) = node.as_object() else {
        return Ok(());
    };

    if object.get("type").and_then(Value::as_str) == Some("array") {
        let items = object.get("items").ok_or_else(|| ResolveError::InvalidSchema {
            tool: tool.to_string(),
            message: format!("array property {path} lacks items"),
        })?;
        let item_type = items.get("type").and_then(Value::as_str).unwrap_or("");
        if item_type.is_empty() {
            return Err(ResolveError::InvalidSchema {
                tool: tool.to_string(),
                message: format!("array property {path} lacks a typed items object"),
            });
        }
    }

    if let Some(properties) = object.get("properties").and_then(Value::as_object) {
        for (key, child) in properties {
            verify_node(tool, child, &format!("{path}.{key}"))?;
        }
    }
    if let Some(additional) = object.get("additionalProperties") {
        verify_node(tool, additional, &format!("{path}.*"))?;
    }
    if let Some(items) = object.get("items") {
        verify_node(tool, items, &format!("{path}[]"))?;
    }

    Ok(())
}
