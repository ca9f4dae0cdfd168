//! Tool server assembly for pkgver.
//!
//! Builds the fourteen-tool catalogue over shared HTTP/cache state,
//! validates every tool schema at startup, and adapts the catalogue to
//! a newline-delimited JSON stdio transport. The transport is
//! deliberately thin: a real protocol layer replaces `stdio` without
//! touching the catalogue or any resolver.

pub mod config;
pub mod dispatcher;
pub mod stdio;

pub use config::ServerConfig;
pub use dispatcher::ToolCatalog;
