//! PyPI ecosystem support for pkgver.
//!
//! Two tools share one registry client: `check_python_versions` takes
//! raw requirements.txt lines, `check_pyproject_versions` takes the
//! three pyproject.toml dependency groups and decorates result names
//! with their group.

pub mod parser;
pub mod registry;
pub mod resolver;

pub use registry::PypiRegistry;
pub use resolver::{PyprojectResolver, PythonRequirementsResolver};
