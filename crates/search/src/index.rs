//! Inverted and n-gram indexes
//!
//! This module provides:
//! - InvertedIndex: token → posting set
//! - NgramIndex: character n-gram → posting set, with fuzzy candidate lookup
//!
//! # Architectural Rules
//!
//! - Indexes store document numbers only, never content.
//! - Indexes are built once per generation and never mutated afterwards;
//!   there is no removal. A rebuild replaces the whole structure.
//!
//! Postings are ordered sets, so unions over them come out in insertion
//! order of the items, which is what keeps ranking ties stable.

use crate::ngram::ngram_set;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::ops::Bound;

/// Position of an item within its index generation
pub type DocId = u32;

/// Set of documents associated with one index key
pub type PostingSet = BTreeSet<DocId>;

static EMPTY_POSTINGS: PostingSet = BTreeSet::new();

// ============================================================================
// PostingMap
// ============================================================================

/// Key → posting set storage shared by both indexes
#[derive(Debug, Clone, Default)]
struct PostingMap {
    postings: BTreeMap<String, PostingSet>,
}

impl PostingMap {
    fn insert(&mut self, key: &str, doc: DocId) {
        match self.postings.get_mut(key) {
            Some(set) => {
                set.insert(doc);
            }
            None => {
                self.postings.insert(key.to_string(), BTreeSet::from([doc]));
            }
        }
    }

    fn get(&self, key: &str) -> &PostingSet {
        self.postings.get(key).unwrap_or(&EMPTY_POSTINGS)
    }

    fn len(&self) -> usize {
        self.postings.len()
    }
}

// ============================================================================
// InvertedIndex
// ============================================================================

/// Inverted index for exact token lookup
#[derive(Debug, Clone, Default)]
pub struct InvertedIndex {
    map: PostingMap,
    total_docs: usize,
}

impl InvertedIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Index a document's tokens
    ///
    /// Each distinct token gets the document added to its posting set;
    /// repeated tokens are harmless.
    pub fn add<I, S>(&mut self, doc: DocId, tokens: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for token in tokens {
            self.map.insert(token.as_ref(), doc);
        }
        self.total_docs += 1;
    }

    /// Documents containing a token
    ///
    /// Unknown tokens return the empty set.
    pub fn lookup(&self, token: &str) -> &PostingSet {
        self.map.get(token)
    }

    /// Number of documents containing a token
    pub fn doc_freq(&self, token: &str) -> usize {
        self.lookup(token).len()
    }

    /// Indexed terms starting with `prefix`, in lexicographic order
    pub fn terms_with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.map
            .postings
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(move |(term, _)| term.starts_with(prefix))
            .map(|(term, _)| term.as_str())
    }

    /// Number of distinct terms
    pub fn term_count(&self) -> usize {
        self.map.len()
    }

    /// Number of documents added
    pub fn total_docs(&self) -> usize {
        self.total_docs
    }
}

// ============================================================================
// NgramIndex
// ============================================================================

/// N-gram index for fuzzy candidate lookup
///
/// Only consulted when exact lookup produces too few candidates.
#[derive(Debug, Clone)]
pub struct NgramIndex {
    map: PostingMap,
    n: usize,
}

impl NgramIndex {
    /// Create an empty index for n-grams of length `n`
    pub fn new(n: usize) -> Self {
        NgramIndex {
            map: PostingMap::default(),
            n,
        }
    }

    /// N-gram length this index was built with
    pub fn ngram_size(&self) -> usize {
        self.n
    }

    /// Index every n-gram of `text` for a document
    pub fn add(&mut self, doc: DocId, text: &str) {
        for gram in ngram_set(text, self.n) {
            self.map.insert(&gram, doc);
        }
    }

    /// Documents containing an n-gram
    pub fn lookup(&self, gram: &str) -> &PostingSet {
        self.map.get(gram)
    }

    /// Number of distinct n-grams
    pub fn ngram_count(&self) -> usize {
        self.map.len()
    }

    /// Documents sharing enough n-grams with the query
    ///
    /// A document qualifies when it contains at least
    /// `ceil(query_ngrams.len() * min_overlap)` of the query's distinct
    /// n-grams. A query without n-grams has no fuzzy candidates.
    pub fn fuzzy_candidates(&self, query_ngrams: &BTreeSet<String>, min_overlap: f64) -> PostingSet {
        if query_ngrams.is_empty() {
            return PostingSet::new();
        }
        let required = min_shared_ngrams(query_ngrams.len(), min_overlap);

        let mut shared: HashMap<DocId, usize> = HashMap::new();
        for gram in query_ngrams {
            for &doc in self.lookup(gram) {
                *shared.entry(doc).or_insert(0) += 1;
            }
        }

        shared
            .into_iter()
            .filter(|(_, count)| *count >= required)
            .map(|(doc, _)| doc)
            .collect()
    }
}

/// Shared n-grams required for a fuzzy match (never less than one)
pub fn min_shared_ngrams(query_ngram_count: usize, min_overlap: f64) -> usize {
    ((query_ngram_count as f64 * min_overlap).ceil() as usize).max(1)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ngram::ngram_set;

    #[test]
    fn test_lookup_unknown_token_is_empty() {
        let index = InvertedIndex::new();
        assert!(index.lookup("missing").is_empty());
        assert_eq!(index.doc_freq("missing"), 0);
    }

    #[test]
    fn test_add_and_lookup() {
        let mut index = InvertedIndex::new();
        index.add(0, ["hello", "world"]);
        index.add(1, ["hello", "there"]);

        assert_eq!(index.total_docs(), 2);
        assert_eq!(index.doc_freq("hello"), 2);
        assert_eq!(index.doc_freq("world"), 1);
        assert_eq!(index.lookup("hello").iter().copied().collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn test_repeated_tokens_single_posting() {
        let mut index = InvertedIndex::new();
        index.add(7, ["echo", "echo", "echo"]);
        assert_eq!(index.lookup("echo").len(), 1);
        assert_eq!(index.term_count(), 1);
    }

    #[test]
    fn test_terms_with_prefix() {
        let mut index = InvertedIndex::new();
        index.add(0, ["react", "reactive", "redux", "rust"]);

        let terms: Vec<_> = index.terms_with_prefix("rea").collect();
        assert_eq!(terms, vec!["react", "reactive"]);
        assert_eq!(index.terms_with_prefix("zzz").count(), 0);
    }

    #[test]
    fn test_ngram_lookup() {
        let mut index = NgramIndex::new(3);
        index.add(0, "React");
        assert_eq!(index.lookup("eac").len(), 1);
        assert!(index.lookup("xyz").is_empty());
        assert_eq!(index.ngram_count(), 3);
    }

    #[test]
    fn test_min_shared_ngrams() {
        assert_eq!(min_shared_ngrams(4, 0.3), 2);
        assert_eq!(min_shared_ngrams(10, 0.3), 3);
        assert_eq!(min_shared_ngrams(1, 0.3), 1);
        assert_eq!(min_shared_ngrams(3, 1.0), 3);
    }

    #[test]
    fn test_fuzzy_candidates_typo() {
        let mut index = NgramIndex::new(3);
        index.add(0, "React TypeScript project");
        index.add(1, "Vue JavaScript app");

        let query = ngram_set("reactt", 3);
        let candidates = index.fuzzy_candidates(&query, 0.3);
        assert!(candidates.contains(&0));
        assert!(!candidates.contains(&1));
    }

    #[test]
    fn test_fuzzy_candidates_threshold_respected() {
        let mut index = NgramIndex::new(3);
        // shares only "abc" with the query's four n-grams
        index.add(0, "abc");

        let query = ngram_set("abcdef", 3);
        assert_eq!(query.len(), 4);
        assert!(index.fuzzy_candidates(&query, 0.3).is_empty());
        assert!(index.fuzzy_candidates(&query, 0.25).contains(&0));
    }

    #[test]
    fn test_fuzzy_candidates_empty_query() {
        let mut index = NgramIndex::new(3);
        index.add(0, "anything");
        assert!(index.fuzzy_candidates(&BTreeSet::new(), 0.3).is_empty());
    }
}
