//! PHP Composer/Packagist ecosystem support for pkgver.

pub mod registry;
pub mod resolver;

pub use registry::{ComposerVersion, PackagistRegistry, split_package_name};
pub use resolver::ComposerResolver;
