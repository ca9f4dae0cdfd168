//! Decoding helpers for inbound tool-call argument maps.
//!
//! The protocol layer hands every tool an untyped JSON object. Each
//! resolver decodes it into a typed request struct in one step; the
//! helpers here make the two dependency shapes shared across ecosystems
//! (`{name → version-or-table}` and `[{name, version, …}]`) and the
//! invalid-argument mapping uniform.

use crate::error::{ResolveError, Result};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Decodes the full argument map into a typed request.
///
/// A failure means the request as a whole is malformed, so the serde
/// error is surfaced as `InvalidArgument` carrying serde's description of
/// the offending key.
pub fn parse_request<T: DeserializeOwned>(args: Value) -> Result<T> {
    serde_json::from_value(args).map_err(|e| ResolveError::InvalidArgument { key: e.to_string() })
}

/// Pulls a required top-level field out of the argument map before
/// shape-decoding the rest, so the error names the field the caller
/// actually forgot.
pub fn require_field(args: &Value, key: &str) -> Result<Value> {
    args.get(key)
        .cloned()
        .ok_or_else(|| ResolveError::invalid_argument(key))
}

/// A dependency value: either a bare version string or a table with a
/// `version` key plus ecosystem-specific extras (`git`, `path`, `sdk`,
/// `features`, …).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DependencySpec {
    Version(String),
    Table(serde_json::Map<String, Value>),
}

impl DependencySpec {
    /// The declared version requirement, if any.
    pub fn version(&self) -> Option<&str> {
        match self {
            Self::Version(v) => Some(v.as_str()),
            Self::Table(table) => table.get("version").and_then(Value::as_str),
        }
    }

    /// Looks up a key on the table form; `None` for the scalar form.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Self::Version(_) => None,
            Self::Table(table) => table.get(key),
        }
    }
}

/// The two common dependency collection shapes.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DependencySet {
    Map(serde_json::Map<String, Value>),
    List(Vec<NamedDependency>),
}

/// Array-shaped dependency entry.
#[derive(Debug, Clone, Deserialize)]
pub struct NamedDependency {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
}

impl DependencySet {
    /// Flattens either shape into `(name, spec)` pairs, deduplicated by
    /// name (first occurrence wins) so the result count matches the
    /// deduplicated input count.
    ///
    /// Map entries whose value is neither a string nor an object are
    /// dropped with a debug log rather than failing the request.
    pub fn entries(self) -> Vec<(String, DependencySpec)> {
        let mut seen = std::collections::HashSet::new();
        let mut entries = Vec::new();

        match self {
            Self::Map(map) => {
                for (name, value) in map {
                    let spec = match value {
                        Value::String(v) => DependencySpec::Version(v),
                        Value::Object(table) => DependencySpec::Table(table),
                        other => {
                            tracing::debug!("ignoring non-version value for {name}: {other}");
                            continue;
                        }
                    };
                    if seen.insert(name.clone()) {
                        entries.push((name, spec));
                    }
                }
            }
            Self::List(list) => {
                for dep in list {
                    if seen.insert(dep.name.clone()) {
                        let spec = match dep.version {
                            Some(v) => DependencySpec::Version(v),
                            None => DependencySpec::Table(serde_json::Map::new()),
                        };
                        entries.push((dep.name, spec));
                    }
                }
            }
        }

        entries
    }
}
