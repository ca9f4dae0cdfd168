//! Version parsing, cleaning and comparison.
//!
//! All ecosystems share one dotted numeric grammar: up to three numeric
//! components, missing minor/patch defaulting to zero. Anything richer
//! (prerelease suffixes, build metadata, epoch markers) fails to parse
//! and sorts below every parseable version.

use std::cmp::Ordering;

/// Characters stripped from the front of a constraint string by [`clean`].
const CONSTRAINT_PREFIX_CHARS: &[char] = &['^', '~', '>', '<', '=', '!', 'v'];

/// A parsed dotted version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

/// Strips constraint operators and a leading `v` from a version string.
///
/// Removes the entire leading run of characters from
/// `{^ ~ > < = ! v}` plus surrounding whitespace, so `^1.2.3`, `>=1.2.3`,
/// `==1.2.3`, `~>1.2.3` and `v1.2.3` all clean to `1.2.3`. Stripping the
/// run (rather than one operator) makes `clean` idempotent:
/// `clean(clean(v)) == clean(v)` for every input.
///
/// # Examples
///
/// ```
/// use pkgver_core::version::clean;
///
/// assert_eq!(clean("^17.0.2"), "17.0.2");
/// assert_eq!(clean(">=2.28.1"), "2.28.1");
/// assert_eq!(clean(" v1.9.1 "), "1.9.1");
/// assert_eq!(clean("1.0.0"), "1.0.0");
/// ```
pub fn clean(v: &str) -> &str {
    v.trim()
        .trim_start_matches(CONSTRAINT_PREFIX_CHARS)
        .trim()
}

/// Parses a dotted numeric version string.
///
/// Accepts at most three components split on `.`; missing minor and patch
/// default to 0. Returns `None` for empty strings, more than three
/// components, or any non-numeric component.
///
/// # Examples
///
/// ```
/// use pkgver_core::version::{Version, parse};
///
/// assert_eq!(parse("1.2.3"), Some(Version { major: 1, minor: 2, patch: 3 }));
/// assert_eq!(parse("4"), Some(Version { major: 4, minor: 0, patch: 0 }));
/// assert_eq!(parse("1.2.3-beta"), None);
/// ```
pub fn parse(v: &str) -> Option<Version> {
    let v = v.trim();
    if v.is_empty() {
        return None;
    }

    let mut components = [0u64; 3];
    let mut count = 0;
    for part in v.split('.') {
        if count == 3 {
            return None;
        }
        components[count] = part.parse().ok()?;
        count += 1;
    }

    Some(Version {
        major: components[0],
        minor: components[1],
        patch: components[2],
    })
}

/// Total order over version strings.
///
/// Both parseable: lexicographic on `(major, minor, patch)`. One
/// parseable: the parseable side is greater, so unparseable strings sort
/// last in descending order. Neither parseable: equal.
///
/// # Examples
///
/// ```
/// use pkgver_core::version::compare;
/// use std::cmp::Ordering;
///
/// assert_eq!(compare("1.2.3", "1.2.3"), Ordering::Equal);
/// assert_eq!(compare("1.10.0", "1.9.9"), Ordering::Greater);
/// assert_eq!(compare("2.0.0-rc.1", "0.0.1"), Ordering::Less);
/// ```
pub fn compare(a: &str, b: &str) -> Ordering {
    match (parse(a), parse(b)) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

/// Picks the greatest version from an iterator of version strings.
///
/// Applies [`clean`] to each candidate before comparison; returns the
/// original (uncleaned) winner. `None` for an empty iterator or when no
/// candidate parses.
pub fn max_version<'a, I>(candidates: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    candidates
        .into_iter()
        .filter(|c| parse(clean(c)).is_some())
        .max_by(|a, b| compare(clean(a), clean(b)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_prefixes() {
        assert_eq!(clean("^1.0.0"), "1.0.0");
        assert_eq!(clean("~2.1"), "2.1");
        assert_eq!(clean(">=1.2.3"), "1.2.3");
        assert_eq!(clean("<=1.2.3"), "1.2.3");
        assert_eq!(clean(">1.2.3"), "1.2.3");
        assert_eq!(clean("<1.2.3"), "1.2.3");
        assert_eq!(clean("=1.2.3"), "1.2.3");
        assert_eq!(clean("==2.28.1"), "2.28.1");
        assert_eq!(clean("!1.0"), "1.0");
        assert_eq!(clean("v1.9.1"), "1.9.1");
        assert_eq!(clean("~>2.0"), "2.0");
    }

    #[test]
    fn test_clean_whitespace() {
        assert_eq!(clean("  1.0.0  "), "1.0.0");
        assert_eq!(clean(">= 1.0.0"), "1.0.0");
    }

    #[test]
    fn test_clean_idempotent() {
        for input in ["^1.0.0", "==2.28.1", "v1.2", "~>3.0", "1.0.0", ""] {
            assert_eq!(clean(clean(input)), clean(input), "input: {input:?}");
        }
    }

    #[test]
    fn test_parse_full() {
        assert_eq!(
            parse("1.2.3"),
            Some(Version {
                major: 1,
                minor: 2,
                patch: 3
            })
        );
    }

    #[test]
    fn test_parse_partial_components() {
        assert_eq!(
            parse("1.2"),
            Some(Version {
                major: 1,
                minor: 2,
                patch: 0
            })
        );
        assert_eq!(
            parse("7"),
            Some(Version {
                major: 7,
                minor: 0,
                patch: 0
            })
        );
    }

    #[test]
    fn test_parse_rejects_non_numeric() {
        assert_eq!(parse("1.2.3-beta"), None);
        assert_eq!(parse("1.x"), None);
        assert_eq!(parse("latest"), None);
        assert_eq!(parse(""), None);
    }

    #[test]
    fn test_parse_rejects_four_components() {
        assert_eq!(parse("1.2.3.4"), None);
    }

    #[test]
    fn test_compare_orders() {
        assert_eq!(compare("1.0.0", "1.0.0"), Ordering::Equal);
        assert_eq!(compare("1.0.1", "1.0.0"), Ordering::Greater);
        assert_eq!(compare("1.0.0", "1.0.1"), Ordering::Less);
        assert_eq!(compare("2.0.0", "1.99.99"), Ordering::Greater);
        assert_eq!(compare("1.10.0", "1.9.0"), Ordering::Greater);
        assert_eq!(compare("1.0", "1.0.0"), Ordering::Equal);
    }

    #[test]
    fn test_compare_antisymmetric() {
        assert_eq!(compare("1.2.0", "1.3.0"), compare("1.3.0", "1.2.0").reverse());
    }

    #[test]
    fn test_compare_unparseable_sorts_last() {
        assert_eq!(compare("0.0.1", "not-a-version"), Ordering::Greater);
        assert_eq!(compare("nightly", "1.0.0"), Ordering::Less);
        assert_eq!(compare("beta", "alpha"), Ordering::Equal);
    }

    #[test]
    fn test_max_version() {
        assert_eq!(
            max_version(["1.0.0", "1.2.0", "0.9.0"]),
            Some("1.2.0")
        );
        assert_eq!(max_version(["v1.0.0", "v1.1.0"]), Some("v1.1.0"));
        assert_eq!(max_version(["garbage", "also-garbage"]), None);
        assert_eq!(max_version([]), None);
    }
}
