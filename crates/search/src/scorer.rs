//! Relevance scoring
//!
//! This module provides:
//! - Scorer trait for pluggable scoring algorithms
//! - KeywordScorer default implementation (exact + partial term matches,
//!   normalized by content length)
//!
//! Scorers work on pre-tokenized input so the engine can tokenize each
//! item once per generation instead of once per query.

use crate::tokenizer::Tokenizer;
use sift_core::SearchConfig;
use std::collections::HashSet;

// ============================================================================
// Scorer Trait
// ============================================================================

/// Pluggable scoring interface
///
/// Scorers take query tokens and content tokens and return a relevance
/// score. Higher scores indicate more relevant content; a score of zero or
/// less excludes the item from results.
///
/// # Thread Safety
///
/// Scorers must be Send + Sync for concurrent search operations.
///
/// # Determinism
///
/// Identical inputs must always produce identical scores.
pub trait Scorer: Send + Sync {
    /// Score content against a query
    fn score(&self, query_tokens: &[String], content_tokens: &[String]) -> f64;

    /// Name for debugging and logging
    fn name(&self) -> &str;
}

// ============================================================================
// KeywordScorer
// ============================================================================

/// Keyword overlap scorer
///
/// # Formula
///
/// For each distinct query token q:
/// - `+exact_weight` if q occurs verbatim in the content
/// - `+partial_weight` for every content token c where q contains c or c
///   contains q
///
/// The sum is divided by `ln(content_token_count + 1)` so long content does
/// not win on volume alone.
///
/// The partial pass is O(|query| × |content|); it only ever runs on the
/// filtered candidate set.
#[derive(Debug, Clone)]
pub struct KeywordScorer {
    exact_weight: f64,
    partial_weight: f64,
}

impl Default for KeywordScorer {
    fn default() -> Self {
        KeywordScorer {
            exact_weight: 2.0,
            partial_weight: 0.5,
        }
    }
}

impl KeywordScorer {
    /// Create a scorer with custom weights
    pub fn new(exact_weight: f64, partial_weight: f64) -> Self {
        KeywordScorer {
            exact_weight,
            partial_weight,
        }
    }

    /// Create a scorer with the weights from configuration
    pub fn from_config(config: &SearchConfig) -> Self {
        Self::new(config.exact_weight, config.partial_weight)
    }

    /// Tokenize and score raw text
    ///
    /// # Example
    ///
    /// ```
    /// use sift_search::scorer::KeywordScorer;
    /// use sift_search::tokenizer::Tokenizer;
    ///
    /// let scorer = KeywordScorer::default();
    /// let tokenizer = Tokenizer::default();
    /// assert!(scorer.score_text(&tokenizer, "spider", "Marvel Spider-Man hero") > 0.0);
    /// assert_eq!(scorer.score_text(&tokenizer, "spider", ""), 0.0);
    /// ```
    pub fn score_text(&self, tokenizer: &Tokenizer, query: &str, content: &str) -> f64 {
        self.score(&tokenizer.tokenize(query), &tokenizer.tokenize(content))
    }
}

impl Scorer for KeywordScorer {
    fn score(&self, query_tokens: &[String], content_tokens: &[String]) -> f64 {
        if query_tokens.is_empty() || content_tokens.is_empty() {
            return 0.0;
        }

        let content_set: HashSet<&str> = content_tokens.iter().map(String::as_str).collect();
        let mut seen = HashSet::new();
        let mut score = 0.0;

        for q in query_tokens.iter().filter(|q| seen.insert(q.as_str())) {
            if content_set.contains(q.as_str()) {
                score += self.exact_weight;
            }
            for c in content_tokens {
                if c.contains(q.as_str()) || q.contains(c.as_str()) {
                    score += self.partial_weight;
                }
            }
        }

        score / (content_tokens.len() as f64 + 1.0).ln()
    }

    fn name(&self) -> &str {
        "keyword"
    }
}
