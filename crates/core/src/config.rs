//! Search engine configuration
//!
//! Every tunable constant of the search pipeline lives here. The defaults
//! reproduce the behavior the engine shipped with; the fuzzy thresholds and
//! scoring weights in particular are uncalibrated and kept configurable so
//! they can be retuned against real query logs.
//!
//! `SearchConfig` deserializes with serde, so a host application can load it
//! from whatever configuration format it already uses. Missing fields fall
//! back to their defaults.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// English stop words dropped by the tokenizer
pub const DEFAULT_STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "from", "has", "have", "if",
    "in", "into", "is", "it", "its", "no", "not", "of", "on", "or", "such", "that", "the",
    "their", "then", "there", "these", "they", "this", "to", "was", "were", "will", "with",
];

/// A synonym rule: when `key` occurs in a query, `terms` are appended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynonymRule {
    /// Lowercase text searched for (substring match) in the query
    pub key: String,
    /// Terms appended to the query when the key matches
    pub terms: Vec<String>,
}

impl SynonymRule {
    /// Create a rule
    pub fn new<S: Into<String>>(key: impl Into<String>, terms: Vec<S>) -> Self {
        SynonymRule {
            key: key.into(),
            terms: terms.into_iter().map(Into::into).collect(),
        }
    }
}

fn default_synonyms() -> Vec<SynonymRule> {
    vec![
        SynonymRule::new("ai", vec!["artificial intelligence", "machine learning"]),
        SynonymRule::new("ml", vec!["machine learning"]),
        SynonymRule::new("js", vec!["javascript"]),
        SynonymRule::new("ts", vec!["typescript"]),
        SynonymRule::new("web", vec!["website", "frontend"]),
        SynonymRule::new("3d", vec!["three dimensional", "modeling"]),
        SynonymRule::new("painting", vec!["artwork", "canvas"]),
    ]
}

/// Configuration for a search engine instance
///
/// # Default Values
///
/// - ngram_size: 3
/// - fuzzy_candidate_threshold: 10
/// - fuzzy_overlap_ratio: 0.3
/// - exact_weight / partial_weight: 2.0 / 0.5
/// - snippet_max_len: 150 chars
/// - cache_ttl_ms: 300000, cache_capacity: 100
/// - history_capacity: 1000, popularity_capacity: 10000
/// - max_tag_facets: 10, default_limit: 20, max_suggestions: 5
/// - enhancement_timeout_ms: 2000, max_inflight_enhancements: 4
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Character n-gram length for the fuzzy index
    pub ngram_size: usize,

    /// Exact candidate count below which fuzzy candidates are added
    pub fuzzy_candidate_threshold: usize,

    /// Minimum share of query n-grams an item must contain to be a fuzzy candidate
    pub fuzzy_overlap_ratio: f64,

    /// Score added per query token found verbatim in the content
    pub exact_weight: f64,

    /// Score added per (query token, content token) pair with substring containment
    pub partial_weight: f64,

    /// Maximum snippet length in characters (before the ellipsis)
    pub snippet_max_len: usize,

    /// Lifetime of a cached response in milliseconds, measured from insertion
    pub cache_ttl_ms: u64,

    /// Maximum number of cached responses
    pub cache_capacity: usize,

    /// Maximum number of history entries kept
    pub history_capacity: usize,

    /// Maximum number of distinct queries tracked for popularity
    pub popularity_capacity: usize,

    /// Maximum number of tag facet values
    pub max_tag_facets: usize,

    /// Page size when a query carries no pagination
    pub default_limit: usize,

    /// Maximum suggestions per response
    pub max_suggestions: usize,

    /// Time allowed for the enhancer before its answer is abandoned
    pub enhancement_timeout_ms: u64,

    /// Enhancer workers allowed to run at once, abandoned ones included
    pub max_inflight_enhancements: usize,

    /// Tokens dropped during tokenization
    pub stop_words: Vec<String>,

    /// Ordered synonym rules used for query expansion
    pub synonyms: Vec<SynonymRule>,

    /// Storage namespace for persisted history
    pub history_namespace: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            ngram_size: 3,
            fuzzy_candidate_threshold: 10,
            fuzzy_overlap_ratio: 0.3,
            exact_weight: 2.0,
            partial_weight: 0.5,
            snippet_max_len: 150,
            cache_ttl_ms: 300_000,
            cache_capacity: 100,
            history_capacity: 1000,
            popularity_capacity: 10_000,
            max_tag_facets: 10,
            default_limit: 20,
            max_suggestions: 5,
            enhancement_timeout_ms: 2_000,
            max_inflight_enhancements: 4,
            stop_words: DEFAULT_STOP_WORDS.iter().map(|s| s.to_string()).collect(),
            synonyms: default_synonyms(),
            history_namespace: "search-history".to_string(),
        }
    }
}

impl SearchConfig {
    /// Cache entry lifetime
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }

    /// Enhancer time box
    pub fn enhancement_timeout(&self) -> Duration {
        Duration::from_millis(self.enhancement_timeout_ms)
    }

    /// Builder: set n-gram size
    pub fn with_ngram_size(mut self, n: usize) -> Self {
        self.ngram_size = n;
        self
    }

    /// Builder: set fuzzy fallback threshold
    pub fn with_fuzzy_threshold(mut self, threshold: usize) -> Self {
        self.fuzzy_candidate_threshold = threshold;
        self
    }

    /// Builder: set fuzzy overlap ratio
    pub fn with_fuzzy_overlap_ratio(mut self, ratio: f64) -> Self {
        self.fuzzy_overlap_ratio = ratio;
        self
    }

    /// Builder: set scoring weights
    pub fn with_weights(mut self, exact: f64, partial: f64) -> Self {
        self.exact_weight = exact;
        self.partial_weight = partial;
        self
    }

    /// Builder: set cache TTL
    ///
    /// Millisecond resolution; anything finer is rounded down.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Builder: set cache capacity
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Builder: set history capacity
    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    /// Builder: set popularity map capacity
    pub fn with_popularity_capacity(mut self, capacity: usize) -> Self {
        self.popularity_capacity = capacity;
        self
    }

    /// Builder: set the number of enhancer workers allowed at once
    pub fn with_max_inflight_enhancements(mut self, max: usize) -> Self {
        self.max_inflight_enhancements = max;
        self
    }

    /// Builder: set enhancer timeout
    pub fn with_enhancement_timeout(mut self, timeout: Duration) -> Self {
        self.enhancement_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Builder: replace stop words
    pub fn with_stop_words<S: Into<String>>(mut self, words: Vec<S>) -> Self {
        self.stop_words = words.into_iter().map(Into::into).collect();
        self
    }

    /// Builder: replace synonym rules
    pub fn with_synonyms(mut self, synonyms: Vec<SynonymRule>) -> Self {
        self.synonyms = synonyms;
        self
    }

    /// Builder: set history namespace
    pub fn with_history_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.history_namespace = namespace.into();
        self
    }

    /// Check that the configuration is usable
    pub fn validate(&self) -> Result<()> {
        if self.ngram_size == 0 {
            return Err(Error::InvalidConfig("ngram_size must be at least 1".into()));
        }
        if !(self.fuzzy_overlap_ratio > 0.0 && self.fuzzy_overlap_ratio <= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "fuzzy_overlap_ratio must be in (0, 1], got {}",
                self.fuzzy_overlap_ratio
            )));
        }
        if self.exact_weight.is_nan()
            || self.exact_weight <= 0.0
            || self.partial_weight.is_nan()
            || self.partial_weight < 0.0
        {
            return Err(Error::InvalidConfig(
                "exact_weight must be positive and partial_weight non-negative".into(),
            ));
        }
        if self.default_limit == 0 {
            return Err(Error::InvalidConfig("default_limit must be at least 1".into()));
        }
        if self.cache_ttl_ms == 0 {
            return Err(Error::InvalidConfig("cache_ttl must be at least 1 ms".into()));
        }
        if self.cache_capacity == 0 || self.history_capacity == 0 || self.popularity_capacity == 0
        {
            return Err(Error::InvalidConfig(
                "cache_capacity, history_capacity and popularity_capacity must be at least 1"
                    .into(),
            ));
        }
        if self.max_inflight_enhancements == 0 {
            return Err(Error::InvalidConfig(
                "max_inflight_enhancements must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = SearchConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.ngram_size, 3);
        assert_eq!(config.fuzzy_candidate_threshold, 10);
        assert_eq!(config.cache_ttl(), Duration::from_secs(300));
        assert_eq!(config.snippet_max_len, 150);
    }

    #[test]
    fn test_zero_ngram_rejected() {
        let config = SearchConfig::default().with_ngram_size(0);
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_overlap_ratio_bounds() {
        assert!(SearchConfig::default()
            .with_fuzzy_overlap_ratio(0.0)
            .validate()
            .is_err());
        assert!(SearchConfig::default()
            .with_fuzzy_overlap_ratio(1.5)
            .validate()
            .is_err());
        assert!(SearchConfig::default()
            .with_fuzzy_overlap_ratio(1.0)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: SearchConfig =
            serde_json::from_str(r#"{"ngram_size": 4, "cache_ttl_ms": 60000}"#).unwrap();
        assert_eq!(config.ngram_size, 4);
        assert_eq!(config.cache_ttl(), Duration::from_secs(60));
        assert_eq!(config.fuzzy_candidate_threshold, 10);
        assert_eq!(config.synonyms, default_synonyms());
    }

    #[test]
    fn test_sub_second_cache_ttl_kept() {
        let config = SearchConfig::default().with_cache_ttl(Duration::from_millis(250));
        assert_eq!(config.cache_ttl(), Duration::from_millis(250));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_cache_ttl_rejected() {
        let config = SearchConfig::default().with_cache_ttl(Duration::from_micros(500));
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_nan_weights_rejected() {
        assert!(SearchConfig::default()
            .with_weights(2.0, f64::NAN)
            .validate()
            .is_err());
        assert!(SearchConfig::default()
            .with_weights(f64::NAN, 0.5)
            .validate()
            .is_err());
    }

    #[test]
    fn test_zero_capacities_rejected() {
        assert!(SearchConfig::default()
            .with_popularity_capacity(0)
            .validate()
            .is_err());
        assert!(SearchConfig::default()
            .with_max_inflight_enhancements(0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_synonym_declaration_order_preserved() {
        let config: SearchConfig = serde_json::from_str(
            r#"{"synonyms": [{"key": "z", "terms": ["last"]}, {"key": "a", "terms": ["first"]}]}"#,
        )
        .unwrap();
        assert_eq!(config.synonyms[0].key, "z");
        assert_eq!(config.synonyms[1].key, "a");
    }
}
