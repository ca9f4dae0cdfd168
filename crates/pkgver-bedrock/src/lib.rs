//! AWS Bedrock model catalogue support for pkgver.
//!
//! Unlike the registry resolvers this one never touches the network:
//! the catalogue ships with the binary as a data asset.

pub mod catalog;
pub mod resolver;

pub use catalog::{builtin_models, latest_claude_sonnet};
pub use resolver::{BedrockResolver, LatestBedrockModelResolver};
