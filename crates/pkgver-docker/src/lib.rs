//! Container image tag support for pkgver.
//!
//! Covers Docker Hub, GHCR, and arbitrary V2 registries supplied by the
//! caller. Unlike the package resolvers this tool reports a tag *list*
//! (optionally regex-filtered and digest-enriched), not a single latest
//! version.

pub mod registry;
pub mod resolver;

pub use registry::{DockerRegistry, TagInfo};
pub use resolver::DockerResolver;
