//! npm ecosystem support for pkgver.
//!
//! Resolves latest stable versions for JavaScript/TypeScript dependencies
//! against the npm registry, honouring per-package major pins and
//! exclusions.

pub mod registry;
pub mod resolver;

pub use registry::{NpmPackageInfo, NpmRegistry};
pub use resolver::NpmResolver;
