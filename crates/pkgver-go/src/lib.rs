//! Go module ecosystem support for pkgver.
//!
//! Resolves latest module versions through proxy.golang.org, honouring
//! go.mod `replace` directives by emitting replacement pointers instead
//! of registry lookups.

pub mod registry;
pub mod resolver;
pub mod version;

pub use registry::GoProxyRegistry;
pub use resolver::GoResolver;
pub use version::escape_module_path;
