//! Maven Central ecosystem support for pkgver.
//!
//! The pom and gradle tools share one Solr search client; they differ
//! only in request shape and name decoration.

pub mod registry;
pub mod resolver;

pub use registry::MavenCentralRegistry;
pub use resolver::{GradleResolver, MavenResolver};
