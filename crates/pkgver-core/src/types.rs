//! Normalised result descriptors produced by all resolvers.
//!
//! Field names serialize camelCase to match the wire shape callers
//! already consume (`currentVersion`, `latestVersion`, `skipReason`, …).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Sentinel `latestVersion` for lookups that failed or were skipped.
pub const LATEST_UNKNOWN: &str = "unknown";
/// Sentinel `latestVersion` for SDK-provided dependencies (Dart/Flutter).
pub const LATEST_SDK_DEPENDENCY: &str = "sdk dependency";
/// Sentinel `latestVersion` for git/path-sourced dependencies.
pub const LATEST_SPECIAL_DEPENDENCY: &str = "special dependency";

/// Registry tags used in [`PackageVersion::registry`]. Docker results
/// carry their own registry family tag (`dockerhub`/`ghcr`/`custom`) on
/// [`DockerImageVersion`].
pub mod registry_names {
    pub const NPM: &str = "npm";
    pub const PYPI: &str = "pypi";
    pub const MAVEN: &str = "maven";
    pub const GRADLE: &str = "gradle";
    pub const GO: &str = "go";
    pub const CRATES_IO: &str = "crates.io";
    pub const PUB_DEV: &str = "pub.dev";
    pub const SWIFT: &str = "swift";
    pub const PACKAGIST: &str = "packagist";
}

/// Normalised version descriptor for one package dependency.
///
/// Invariant: `skipped == true` iff `skip_reason` is non-empty, and a
/// skipped descriptor never carries a resolved version in
/// `latest_version`, only a sentinel (`unknown`, `sdk dependency`,
/// `special dependency`, `replaced by <path>@<ver>`). The constructors
/// below are the only places descriptors are built, which is what keeps
/// the invariant honest.
///
/// # Examples
///
/// ```
/// use pkgver_core::types::{PackageVersion, registry_names};
///
/// let ok = PackageVersion::resolved("react", Some("17.0.2"), "18.2.0", registry_names::NPM);
/// assert!(!ok.skipped);
///
/// let skip = PackageVersion::skipped("leftpad", None, registry_names::NPM, "Package not found");
/// assert!(skip.skipped);
/// assert_eq!(skip.latest_version, "unknown");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageVersion {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_version: Option<String>,
    pub latest_version: String,
    pub registry: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub skipped: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub skip_reason: String,
}

impl PackageVersion {
    /// A successfully resolved dependency.
    pub fn resolved(
        name: impl Into<String>,
        current_version: Option<&str>,
        latest_version: impl Into<String>,
        registry: &str,
    ) -> Self {
        Self {
            name: name.into(),
            current_version: current_version.map(String::from),
            latest_version: latest_version.into(),
            registry: registry.to_string(),
            skipped: false,
            skip_reason: String::new(),
        }
    }

    /// A skipped dependency with `latestVersion = "unknown"`.
    pub fn skipped(
        name: impl Into<String>,
        current_version: Option<&str>,
        registry: &str,
        reason: impl Into<String>,
    ) -> Self {
        Self::skipped_with_latest(name, current_version, LATEST_UNKNOWN, registry, reason)
    }

    /// A skipped dependency carrying a specific sentinel latest value
    /// (`sdk dependency`, `special dependency`, `replaced by …`).
    pub fn skipped_with_latest(
        name: impl Into<String>,
        current_version: Option<&str>,
        latest_version: impl Into<String>,
        registry: &str,
        reason: impl Into<String>,
    ) -> Self {
        let reason = reason.into();
        debug_assert!(!reason.is_empty(), "skip reason must be non-empty");
        Self {
            name: name.into(),
            current_version: current_version.map(String::from),
            latest_version: latest_version.into(),
            registry: registry.to_string(),
            skipped: true,
            skip_reason: reason,
        }
    }
}

/// Sorts a result list ascending by lowercased name (stable).
pub fn sort_by_name(results: &mut [PackageVersion]) {
    results.sort_by_key(|r| r.name.to_lowercase());
}

/// One Docker/OCI tag descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DockerImageVersion {
    pub name: String,
    pub tag: String,
    pub registry: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
    /// RFC 3339 creation/push timestamp, when the upstream reports one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

/// Latest-release descriptor for one GitHub Action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitHubActionVersion {
    pub owner: String,
    pub repo: String,
    /// Always `owner/repo`.
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_version: Option<String>,
    pub latest_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub major: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minor: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<u64>,
}

/// One entry of the AWS Bedrock model catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BedrockModel {
    pub provider: String,
    pub model_name: String,
    pub model_id: String,
    pub regions_supported: Vec<String>,
    pub input_modalities: Vec<String>,
    pub output_modalities: Vec<String>,
    pub streaming_supported: bool,
}

/// Caller-supplied per-package directive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionConstraint {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub major_version: Option<u64>,
    #[serde(default)]
    pub exclude_package: bool,
}

/// Per-package constraint map, keyed by dependency name.
pub type Constraints = HashMap<String, VersionConstraint>;

/// Skip reason used when a constraint excludes a package.
pub const EXCLUDED_BY_CONSTRAINTS: &str = "Package excluded by constraints";
