//! The `check_bedrock_models` and `get_latest_bedrock_model` tools.

use crate::catalog::{builtin_models, latest_claude_sonnet, match_rank};
use async_trait::async_trait;
use pkgver_core::{BedrockModel, ResolveError, Result, ToolHandler, parse_request};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

/// Resolver over the Bedrock model catalogue.
///
/// Both tools share one catalogue, the built-in list by default; tests
/// construct the resolver over their own.
#[derive(Clone)]
pub struct BedrockResolver {
    models: Arc<Vec<BedrockModel>>,
}

#[derive(Debug, Deserialize)]
struct BedrockRequest {
    #[serde(default)]
    action: Option<String>,
    #[serde(default)]
    query: Option<String>,
    #[serde(default)]
    provider: Option<String>,
    #[serde(default)]
    region: Option<String>,
    #[serde(default, rename = "modelId")]
    model_id: Option<String>,
}

impl BedrockResolver {
    /// Resolver over the built-in catalogue.
    pub fn new() -> Self {
        Self::with_models(builtin_models().to_vec())
    }

    /// Resolver over an explicit catalogue.
    pub fn with_models(models: Vec<BedrockModel>) -> Self {
        Self {
            models: Arc::new(models),
        }
    }

    fn list(&self) -> Value {
        json!(*self.models)
    }

    fn search(&self, request: &BedrockRequest) -> Value {
        let query = request.query.as_deref().unwrap_or("");
        let provider = request.provider.as_deref().map(str::to_lowercase);
        let region = request.region.as_deref();

        let mut ranked: Vec<(usize, &BedrockModel)> = self
            .models
            .iter()
            .filter(|m| {
                provider
                    .as_deref()
                    .is_none_or(|p| m.provider.to_lowercase().contains(p))
            })
            .filter(|m| {
                region.is_none_or(|r| m.regions_supported.iter().any(|have| have == r))
            })
            .filter_map(|m| match_rank(m, query).map(|rank| (rank, m)))
            .collect();

        ranked.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.model_name.cmp(&b.1.model_name)));

        let models: Vec<&BedrockModel> = ranked.into_iter().map(|(_, m)| m).collect();
        json!(models)
    }

    fn get(&self, request: &BedrockRequest) -> Result<Value> {
        let model_id = request
            .model_id
            .as_deref()
            .ok_or_else(|| ResolveError::invalid_argument("modelId"))?;

        let model = self
            .models
            .iter()
            .find(|m| m.model_id == model_id)
            .ok_or_else(|| ResolveError::NotFound {
                name: model_id.to_string(),
            })?;

        Ok(json!(model))
    }

    fn latest_claude_sonnet(&self) -> Result<Value> {
        let model = latest_claude_sonnet(&self.models).ok_or_else(|| ResolveError::NotFound {
            name: "claude sonnet".to_string(),
        })?;
        Ok(json!(model))
    }
}

impl Default for BedrockResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToolHandler for BedrockResolver {
    fn name(&self) -> &'static str {
        "check_bedrock_models"
    }

    fn description(&self) -> &'static str {
        "List, search or fetch AWS Bedrock model descriptors"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "action": {
                    "type": "string",
                    "enum": ["list", "search", "get", "get_latest_claude_sonnet"],
                    "description": "Catalogue operation (default list)"
                },
                "query": {
                    "type": "string",
                    "description": "Search text matched against model name, id and provider"
                },
                "provider": {"type": "string"},
                "region": {"type": "string"},
                "modelId": {
                    "type": "string",
                    "description": "Exact model id; required for the get action"
                }
            }
        })
    }

    async fn call(&self, args: Value) -> Result<Value> {
        let request: BedrockRequest = parse_request(args)?;

        match request.action.as_deref().unwrap_or("list") {
            "list" => Ok(self.list()),
            "search" => Ok(self.search(&request)),
            "get" => self.get(&request),
            "get_latest_claude_sonnet" => self.latest_claude_sonnet(),
            _ => Err(ResolveError::invalid_argument("action")),
        }
    }
}

/// Dedicated shortcut tool for the newest Claude Sonnet model.
#[derive(Clone)]
pub struct LatestBedrockModelResolver {
    inner: BedrockResolver,
}

impl LatestBedrockModelResolver {
    pub fn new() -> Self {
        Self {
            inner: BedrockResolver::new(),
        }
    }

    pub fn with_models(models: Vec<BedrockModel>) -> Self {
        Self {
            inner: BedrockResolver::with_models(models),
        }
    }
}

impl Default for LatestBedrockModelResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToolHandler for LatestBedrockModelResolver {
    fn name(&self) -> &'static str {
        "get_latest_bedrock_model"
    }

    fn description(&self) -> &'static str {
        "Return the latest Claude Sonnet model available on AWS Bedrock"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn call(&self, _args: Value) -> Result<Value> {
        self.inner.latest_claude_sonnet()
    }
}
