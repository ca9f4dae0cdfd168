//! requirements.txt line parsing.

use regex::Regex;
use std::sync::LazyLock;

static REQUIREMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9_.-]+)\s*([<>=!~^].*)?$").expect("requirement pattern is valid")
});

/// Outcome of parsing one requirements.txt line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequirementLine {
    /// Blank line or `#` comment; produces no result entry.
    Ignored,
    /// A package name with an optional version specifier.
    Parsed {
        name: String,
        specifier: Option<String>,
    },
    /// A line the grammar does not cover; becomes a skipped entry whose
    /// name is the original text.
    Invalid { raw: String },
}

/// Parses one requirements.txt line.
///
/// # Examples
///
/// ```
/// use pkgver_pypi::parser::{RequirementLine, parse_requirement_line};
///
/// assert_eq!(parse_requirement_line("# deps"), RequirementLine::Ignored);
/// assert_eq!(
///     parse_requirement_line("requests==2.28.1"),
///     RequirementLine::Parsed {
///         name: "requests".into(),
///         specifier: Some("==2.28.1".into()),
///     }
/// );
/// ```
pub fn parse_requirement_line(line: &str) -> RequirementLine {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return RequirementLine::Ignored;
    }

    match REQUIREMENT_RE.captures(line) {
        Some(captures) => RequirementLine::Parsed {
            name: captures[1].to_string(),
            specifier: captures.get(2).map(|m| m.as_str().trim().to_string()),
        },
        None => RequirementLine::Invalid {
            raw: line.to_string(),
        },
    }
}

/// Extracts the current version from a specifier: the first
/// comma-separated clause with its operator characters stripped.
/// `">=2.28.1,<3"` yields `2.28.1`; a bare `*` or empty clause yields
/// `None`.
pub fn current_version_from_specifier(specifier: &str) -> Option<String> {
    let clause = specifier.split(',').next()?;
    let version = pkgver_core::version::clean(clause);
    if version.is_empty() || version == "*" {
        None
    } else {
        Some(version.to_string())
    }
}
