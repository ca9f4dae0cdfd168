//! The `check_docker_tags` tool.

use crate::registry::{DockerRegistry, TagInfo};
use async_trait::async_trait;
use pkgver_core::{
    DockerImageVersion, ResolveError, Result, ToolHandler, parse_request, require_field,
};
use regex::Regex;
use serde::Deserialize;
use serde_json::{Value, json};

const DEFAULT_LIMIT: usize = 10;

/// Resolver for container image tags.
pub struct DockerResolver {
    registry: DockerRegistry,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DockerRequest {
    image: String,
    #[serde(default)]
    registry: Option<String>,
    #[serde(default)]
    custom_registry: Option<String>,
    #[serde(default)]
    limit: Option<usize>,
    #[serde(default)]
    filter_tags: Vec<String>,
    #[serde(default)]
    include_digest: bool,
}

/// Which registry family a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RegistryKind {
    DockerHub,
    Ghcr,
    Custom,
}

impl RegistryKind {
    fn from_arg(value: Option<&str>) -> Result<Self> {
        match value.unwrap_or("dockerhub") {
            "dockerhub" => Ok(Self::DockerHub),
            "ghcr" => Ok(Self::Ghcr),
            "custom" => Ok(Self::Custom),
            _ => Err(ResolveError::invalid_argument("registry")),
        }
    }

    fn tag_name(self) -> &'static str {
        match self {
            Self::DockerHub => "dockerhub",
            Self::Ghcr => "ghcr",
            Self::Custom => "custom",
        }
    }
}

impl DockerResolver {
    pub fn new(registry: DockerRegistry) -> Self {
        Self { registry }
    }

    async fn check(&self, request: DockerRequest) -> Result<Vec<DockerImageVersion>> {
        let kind = RegistryKind::from_arg(request.registry.as_deref())?;
        let limit = request.limit.unwrap_or(DEFAULT_LIMIT);

        let tags = match kind {
            RegistryKind::DockerHub => self.registry.dockerhub_tags(&request.image).await?,
            RegistryKind::Ghcr => self.registry.ghcr_tags(&request.image).await?,
            RegistryKind::Custom => {
                let base = request
                    .custom_registry
                    .as_deref()
                    .ok_or_else(|| ResolveError::invalid_argument("customRegistry"))?;
                self.registry.custom_tags(base, &request.image).await?
            }
        };

        let patterns = compile_patterns(&request.filter_tags);
        let results = tags
            .into_iter()
            .filter(|t| matches_any(&patterns, &t.name))
            .take(limit)
            .map(|t| describe(&request.image, t, kind, request.include_digest))
            .collect();

        Ok(results)
    }
}

/// Compiles the caller's filter patterns; invalid patterns are logged
/// and dropped from the set.
fn compile_patterns(filter_tags: &[String]) -> Vec<Regex> {
    filter_tags
        .iter()
        .filter_map(|pattern| match Regex::new(pattern) {
            Ok(regex) => Some(regex),
            Err(e) => {
                tracing::warn!("ignoring invalid tag filter {pattern:?}: {e}");
                None
            }
        })
        .collect()
}

/// A tag passes when it matches any pattern; an empty pattern set passes
/// everything.
fn matches_any(patterns: &[Regex], tag: &str) -> bool {
    patterns.is_empty() || patterns.iter().any(|p| p.is_match(tag))
}

fn describe(
    image: &str,
    tag: TagInfo,
    kind: RegistryKind,
    include_digest: bool,
) -> DockerImageVersion {
    DockerImageVersion {
        name: image.to_string(),
        tag: tag.name,
        registry: kind.tag_name().to_string(),
        digest: if include_digest { tag.digest } else { None },
        created: tag.created,
        size: tag.size,
    }
}

#[async_trait]
impl ToolHandler for DockerResolver {
    fn name(&self) -> &'static str {
        "check_docker_tags"
    }

    fn description(&self) -> &'static str {
        "List available tags for container images on Docker Hub, GHCR or a custom registry"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "image": {
                    "type": "string",
                    "description": "Image name, e.g. nginx or ghcr.io/owner/app"
                },
                "registry": {
                    "type": "string",
                    "enum": ["dockerhub", "ghcr", "custom"],
                    "description": "Registry to query (default dockerhub)"
                },
                "customRegistry": {
                    "type": "string",
                    "description": "Base URL of a custom V2 registry; required when registry is custom"
                },
                "limit": {
                    "type": "integer",
                    "description": "Maximum number of tags to return (default 10)"
                },
                "filterTags": {
                    "type": "array",
                    "description": "Regex patterns; a tag is kept when it matches any of them",
                    "items": {"type": "string"}
                },
                "includeDigest": {
                    "type": "boolean",
                    "description": "Attach the manifest digest when the registry reports one"
                }
            },
            "required": ["image"]
        })
    }

    async fn call(&self, args: Value) -> Result<Value> {
        require_field(&args, "image")?;
        let request: DockerRequest = parse_request(args)?;
        let results = self.check(request).await?;
        Ok(serde_json::to_value(results)?)
    }
}
