//! The `check_github_actions` tool.
//!
//! Action lookups hit independent repositories, so they fan out in
//! parallel; result order is restored by the common lowercased-name sort.

use crate::registry::ActionRegistry;
use async_trait::async_trait;
use futures::future::join_all;
use pkgver_core::version::{clean, parse};
use pkgver_core::{GitHubActionVersion, Result, ToolHandler, parse_request, require_field};
use serde::Deserialize;
use serde_json::{Value, json};

/// Resolver for GitHub Actions workflow dependencies.
pub struct ActionsResolver {
    registry: ActionRegistry,
}

#[derive(Debug, Deserialize)]
struct ActionsRequest {
    actions: Vec<ActionRef>,
    #[serde(default, rename = "includeDetails")]
    include_details: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ActionRef {
    owner: String,
    repo: String,
    #[serde(default)]
    current_version: Option<String>,
}

impl ActionsResolver {
    pub fn new(registry: ActionRegistry) -> Self {
        Self { registry }
    }

    async fn check(&self, request: ActionsRequest) -> Vec<GitHubActionVersion> {
        let include_details = request.include_details;

        let mut seen = std::collections::HashSet::new();
        let actions: Vec<ActionRef> = request
            .actions
            .into_iter()
            .filter(|a| seen.insert(format!("{}/{}", a.owner, a.repo)))
            .collect();

        let lookups = actions.iter().map(|action| {
            let registry = self.registry.clone();
            async move {
                registry
                    .get_latest_release(&action.owner, &action.repo)
                    .await
            }
        });

        let outcomes = join_all(lookups).await;

        let mut results: Vec<GitHubActionVersion> = actions
            .into_iter()
            .zip(outcomes)
            .map(|(action, outcome)| describe(action, outcome, include_details))
            .collect();

        results.sort_by_key(|r| r.name.to_lowercase());
        results
    }
}

fn describe(
    action: ActionRef,
    outcome: Result<crate::registry::ActionRelease>,
    include_details: bool,
) -> GitHubActionVersion {
    let name = format!("{}/{}", action.owner, action.repo);

    let mut result = GitHubActionVersion {
        owner: action.owner,
        repo: action.repo,
        name,
        current_version: action.current_version,
        latest_version: "unknown".into(),
        published_at: None,
        url: None,
        major: None,
        minor: None,
        patch: None,
    };

    match outcome {
        Ok(release) => {
            result.latest_version = release.tag.clone();
            if include_details {
                result.published_at = release.published_at;
                result.url = release.url;
            }
            if let Some(version) = parse(clean(&release.tag)) {
                result.major = Some(version.major);
                result.minor = Some(version.minor);
                result.patch = Some(version.patch);
            }
        }
        Err(pkgver_core::ResolveError::NotFound { .. }) => {
            result.latest_version = "not found".into();
        }
        Err(e) => {
            tracing::debug!("action lookup failed for {}: {e}", result.name);
            result.latest_version = "error".into();
        }
    }

    result
}

#[async_trait]
impl ToolHandler for ActionsResolver {
    fn name(&self) -> &'static str {
        "check_github_actions"
    }

    fn description(&self) -> &'static str {
        "Check latest release tags for GitHub Actions"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "actions": {
                    "type": "array",
                    "description": "Actions referenced in workflow files",
                    "items": {
                        "type": "object",
                        "properties": {
                            "owner": {"type": "string"},
                            "repo": {"type": "string"},
                            "currentVersion": {"type": "string"}
                        },
                        "required": ["owner", "repo"]
                    }
                },
                "includeDetails": {
                    "type": "boolean",
                    "description": "Include publishedAt and release URL in results"
                }
            },
            "required": ["actions"]
        })
    }

    async fn call(&self, args: Value) -> Result<Value> {
        require_field(&args, "actions")?;
        let request: ActionsRequest = parse_request(args)?;
        let results = self.check(request).await;
        Ok(serde_json::to_value(results)?)
    }
}
