//! Query suggestions
//!
//! Suggestions come from two local sources, in this order:
//! 1. popular past queries containing the normalized query
//! 2. indexed terms extending the last query token (`reac` → `react`)
//!
//! Output is deduplicated and never contains the query itself.

use crate::history::SearchHistory;
use crate::index::InvertedIndex;
use crate::tokenizer::normalize;

/// Build up to `max` suggestions for `query_text`
pub fn suggest(
    query_text: &str,
    history: &SearchHistory,
    index: &InvertedIndex,
    max: usize,
) -> Vec<String> {
    let normalized = normalize(query_text);
    if normalized.is_empty() || max == 0 {
        return vec![];
    }

    let mut out = Vec::new();
    merge_into(&mut out, &normalized, history.popular_matching(&normalized, max), max);

    if let Some((head, last)) = split_last_token(&normalized) {
        let completions = index
            .terms_with_prefix(last)
            .filter(|term| *term != last)
            .map(|term| format!("{}{}", head, term));
        merge_into(&mut out, &normalized, completions, max);
    }
    out
}

/// Append `extra` to `base` with the same dedup rules, up to `max`
pub fn merge_suggestions(
    base: Vec<String>,
    query_text: &str,
    extra: impl IntoIterator<Item = String>,
    max: usize,
) -> Vec<String> {
    let normalized = normalize(query_text);
    let mut out = base;
    merge_into(&mut out, &normalized, extra, max);
    out
}

fn merge_into<I>(out: &mut Vec<String>, normalized_query: &str, candidates: I, max: usize)
where
    I: IntoIterator<Item = String>,
{
    for candidate in candidates {
        if out.len() >= max {
            break;
        }
        let trimmed = candidate.trim();
        if trimmed.is_empty()
            || normalize(trimmed) == normalized_query
            || out.iter().any(|s| s == trimmed)
        {
            continue;
        }
        out.push(trimmed.to_string());
    }
}

/// Split `"a b c"` into `("a b ", "c")`
fn split_last_token(normalized: &str) -> Option<(&str, &str)> {
    let idx = normalized.rfind(' ').map_or(0, |i| i + 1);
    let last = &normalized[idx..];
    if last.is_empty() {
        None
    } else {
        Some((&normalized[..idx], last))
    }
}
