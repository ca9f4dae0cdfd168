use thiserror::Error;

/// Core error types for pkgver.
///
/// Only two classes of error ever escape a resolver: invalid top-level
/// arguments and dispatch failures. Everything that goes wrong while
/// looking up a single dependency (network, HTTP status, decode, upstream
/// absence) is folded into a `skipped` result descriptor by the resolver
/// and never surfaces as an `Err`.
///
/// # Examples
///
/// ```
/// use pkgver_core::error::{ResolveError, Result};
///
/// fn require_name(args: &serde_json::Value) -> Result<String> {
///     args.get("name")
///         .and_then(|v| v.as_str())
///         .map(String::from)
///         .ok_or_else(|| ResolveError::invalid_argument("name"))
/// }
/// ```
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("missing or invalid argument: {key}")]
    InvalidArgument { key: String },

    #[error("request failed for {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("no versions found for {name}")]
    NotFound { name: String },

    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("invalid tool schema for {tool}: {message}")]
    InvalidSchema { tool: String, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ResolveError {
    /// Shorthand for the invalid-argument case, which every resolver hits
    /// while decoding its request.
    pub fn invalid_argument(key: impl Into<String>) -> Self {
        Self::InvalidArgument { key: key.into() }
    }

    /// Whether this error should be reported to the protocol layer as a
    /// caller mistake rather than a server failure.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument { .. } | Self::UnknownTool(_)
        )
    }
}

/// Convenience type alias for `Result<T, ResolveError>`.
pub type Result<T> = std::result::Result<T, ResolveError>;
