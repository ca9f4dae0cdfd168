//! Core abstractions for pkgver.
//!
//! This crate provides the substrate shared by every ecosystem resolver:
//!
//! - **HTTP fetcher**: one shared `reqwest` client with timeout, user
//!   agent and structured transport/status errors
//! - **TTL cache**: concurrent key→value map with ecosystem-namespaced
//!   keys and TTL-on-read semantics
//! - **Version utilities**: the shared dotted version grammar
//!   (`clean`/`parse`/`compare`)
//! - **Result model**: the normalised descriptors every resolver emits
//! - **Request helpers**: one-step decoding of the untyped argument maps
//!   the protocol layer delivers
//! - **Tool contract**: the `ToolHandler` trait and text-content result
//!   form the dispatcher works against
//!
//! # Architecture
//!
//! Resolvers never abort a whole request because one dependency failed:
//! transport, status, decode and not-found failures on a single lookup
//! are folded into `skipped` descriptors with a human-readable
//! `skipReason`. Only malformed top-level arguments and unknown tool
//! names escape as errors.

pub mod cache;
pub mod error;
pub mod http;
pub mod request;
pub mod tool;
pub mod types;
pub mod version;

// Re-export commonly used types
pub use cache::TtlCache;
pub use error::{ResolveError, Result};
pub use http::HttpClient;
pub use request::{DependencySet, DependencySpec, NamedDependency, parse_request, require_field};
pub use tool::{TextContent, ToolHandler, ToolResponse};
pub use types::{
    BedrockModel, Constraints, DockerImageVersion, GitHubActionVersion, PackageVersion,
    VersionConstraint, sort_by_name,
};
