//! Swift Package Manager ecosystem support for pkgver.
//!
//! Only GitHub-hosted packages are resolvable; everything else surfaces
//! as a skip with `skipReason = "Non-GitHub repository"`.

pub mod registry;
pub mod resolver;

pub use registry::{GitHubReleaseRegistry, ReleaseCandidate};
pub use resolver::{SwiftResolver, parse_github_url};
