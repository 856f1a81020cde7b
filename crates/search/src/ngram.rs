//! Character n-gram generation for fuzzy matching
//!
//! N-grams are taken over the normalized text (spaces included), so the same
//! `n` must be used for indexing and for querying.

use crate::tokenizer::normalize;
use std::collections::BTreeSet;

/// Every contiguous window of `n` characters of the normalized text
///
/// Text shorter than `n` (and `n == 0`) yields no n-grams.
///
/// # Example
///
/// ```
/// use sift_search::ngram::ngrams;
///
/// assert_eq!(ngrams("React", 3), vec!["rea", "eac", "act"]);
/// assert!(ngrams("ab", 3).is_empty());
/// ```
pub fn ngrams(text: &str, n: usize) -> Vec<String> {
    if n == 0 {
        return vec![];
    }
    let chars: Vec<char> = normalize(text).chars().collect();
    if chars.len() < n {
        return vec![];
    }
    chars.windows(n).map(|w| w.iter().collect()).collect()
}

/// Distinct n-grams of the normalized text
pub fn ngram_set(text: &str, n: usize) -> BTreeSet<String> {
    ngrams(text, n).into_iter().collect()
}
