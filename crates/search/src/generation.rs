//! Index generations
//!
//! An `IndexGeneration` bundles the item list with both indexes built over
//! it. A generation is immutable once built; the engine publishes a new one
//! by swapping an `Arc`, so a query always sees one complete generation.

use crate::index::{DocId, InvertedIndex, NgramIndex};
use crate::tokenizer::Tokenizer;
use chrono::{DateTime, Utc};
use sift_core::{IndexStats, RejectedItem, SearchableItem};
use std::collections::HashSet;

/// One complete, immutable index build
#[derive(Debug)]
pub struct IndexGeneration {
    number: u64,
    items: Vec<SearchableItem>,
    tokens: Vec<Vec<String>>,
    inverted: InvertedIndex,
    ngrams: NgramIndex,
    last_updated: DateTime<Utc>,
}

impl IndexGeneration {
    /// A generation with no items
    pub fn empty(number: u64, ngram_size: usize) -> Self {
        IndexGeneration {
            number,
            items: vec![],
            tokens: vec![],
            inverted: InvertedIndex::new(),
            ngrams: NgramIndex::new(ngram_size),
            last_updated: Utc::now(),
        }
    }

    /// Build both indexes over already-validated items
    ///
    /// Each item's `DocId` is its position in `items`.
    pub fn build(
        number: u64,
        items: Vec<SearchableItem>,
        tokenizer: &Tokenizer,
        ngram_size: usize,
    ) -> Self {
        let mut inverted = InvertedIndex::new();
        let mut ngrams = NgramIndex::new(ngram_size);
        let mut tokens = Vec::with_capacity(items.len());

        for (doc, item) in items.iter().enumerate() {
            let doc = doc as DocId;
            let text = item.searchable_text();
            let item_tokens = tokenizer.tokenize(&text);
            inverted.add(doc, &item_tokens);
            ngrams.add(doc, &text);
            tokens.push(item_tokens);
        }

        IndexGeneration {
            number,
            items,
            tokens,
            inverted,
            ngrams,
            last_updated: Utc::now(),
        }
    }

    /// Generation number
    pub fn number(&self) -> u64 {
        self.number
    }

    /// All items, in `DocId` order
    pub fn items(&self) -> &[SearchableItem] {
        &self.items
    }

    /// Item for a document
    pub fn item(&self, doc: DocId) -> Option<&SearchableItem> {
        self.items.get(doc as usize)
    }

    /// Tokens of an item's searchable text
    pub fn tokens(&self, doc: DocId) -> &[String] {
        self.tokens
            .get(doc as usize)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Exact-token index
    pub fn inverted(&self) -> &InvertedIndex {
        &self.inverted
    }

    /// Fuzzy n-gram index
    pub fn ngrams(&self) -> &NgramIndex {
        &self.ngrams
    }

    /// Build time
    pub fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }

    /// Number of items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True if there are no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Summary statistics
    pub fn stats(&self) -> IndexStats {
        IndexStats {
            generation: self.number,
            items: self.items.len(),
            terms: self.inverted.term_count(),
            ngrams: self.ngrams.ngram_count(),
            last_updated: self.last_updated,
        }
    }
}

/// Split a batch into accepted items and rejections
///
/// Items with a blank id are rejected, as is every repeat of an id already
/// seen in the batch (the first occurrence wins).
pub fn validate_items(items: Vec<SearchableItem>) -> (Vec<SearchableItem>, Vec<RejectedItem>) {
    let mut seen = HashSet::new();
    let mut accepted = Vec::with_capacity(items.len());
    let mut rejected = Vec::new();

    for (position, item) in items.into_iter().enumerate() {
        let reason = if item.id.trim().is_empty() {
            Some("empty id")
        } else if !seen.insert(item.id.clone()) {
            Some("duplicate id")
        } else {
            None
        };
        match reason {
            Some(reason) => rejected.push(RejectedItem {
                position,
                id: item.id,
                reason: reason.to_string(),
            }),
            None => accepted.push(item),
        }
    }
    (accepted, rejected)
}
