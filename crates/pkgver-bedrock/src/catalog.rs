//! The Bedrock model catalogue.
//!
//! The authoritative source is `data/models.json`, embedded at compile
//! time and parsed once. Keeping the list as a data asset (instead of
//! code) lets tests substitute their own catalogue and keeps refreshes
//! to a data edit.

use pkgver_core::BedrockModel;
use pkgver_core::version::{compare, parse};
use std::sync::LazyLock;

static BUILTIN_CATALOG: LazyLock<Vec<BedrockModel>> = LazyLock::new(|| {
    serde_json::from_str(include_str!("../data/models.json"))
        .expect("bundled model catalogue is valid JSON")
});

/// Returns the built-in model catalogue.
pub fn builtin_models() -> &'static [BedrockModel] {
    &BUILTIN_CATALOG
}

/// Case-insensitive substring match over name, id and provider,
/// returning the earliest match position; falls back to an
/// ordered-character (subsequence) match ranked behind every substring
/// match, tighter spans first.
pub fn match_rank(model: &BedrockModel, query: &str) -> Option<usize> {
    let query = query.to_lowercase();
    if query.is_empty() {
        return Some(0);
    }

    let haystacks = [
        model.model_name.to_lowercase(),
        model.model_id.to_lowercase(),
        model.provider.to_lowercase(),
    ];

    if let Some(position) = haystacks.iter().filter_map(|h| h.find(&query)).min() {
        return Some(position);
    }

    haystacks
        .iter()
        .filter_map(|h| subsequence_span(h, &query))
        .min()
        .map(|span| 10_000 + span)
}

/// Length of the shortest window containing the query's characters in
/// order, or `None` when the characters never appear in order.
fn subsequence_span(haystack: &str, needle: &str) -> Option<usize> {
    let haystack: Vec<char> = haystack.chars().collect();
    let needle: Vec<char> = needle.chars().collect();

    let mut best: Option<usize> = None;
    for start in 0..haystack.len() {
        if haystack[start] != needle[0] {
            continue;
        }
        let mut needle_idx = 0;
        for (offset, &c) in haystack[start..].iter().enumerate() {
            if c == needle[needle_idx] {
                needle_idx += 1;
                if needle_idx == needle.len() {
                    let span = offset + 1;
                    best = Some(best.map_or(span, |b| b.min(span)));
                    break;
                }
            }
        }
    }
    best
}

/// Picks the newest Claude Sonnet model: Anthropic-provided, name
/// containing both "claude" and "sonnet", ranked by the dotted version
/// embedded in the name, then by a "v2" marker, then by the
/// lexicographically greatest model id.
pub fn latest_claude_sonnet(models: &[BedrockModel]) -> Option<&BedrockModel> {
    models
        .iter()
        .filter(|m| m.provider.to_lowercase().contains("anthropic"))
        .filter(|m| {
            let name = m.model_name.to_lowercase();
            name.contains("claude") && name.contains("sonnet")
        })
        .max_by(|a, b| {
            let version_a = name_version(&a.model_name);
            let version_b = name_version(&b.model_name);
            compare(&version_a, &version_b)
                .then_with(|| {
                    let v2_a = a.model_name.to_lowercase().contains("v2");
                    let v2_b = b.model_name.to_lowercase().contains("v2");
                    v2_a.cmp(&v2_b)
                })
                .then_with(|| a.model_id.cmp(&b.model_id))
        })
}

/// The first whitespace token of a model name that parses as a dotted
/// version (`Claude 3.5 Sonnet v2` → `3.5`). `v2`-style tokens do not
/// qualify; they are a revision marker, not a version.
fn name_version(name: &str) -> String {
    name.split_whitespace()
        .find(|token| parse(token).is_some())
        .unwrap_or("")
        .to_string()
}
