//! Search infrastructure for sift
//!
//! This crate provides:
//! - Tokenizer and n-gram generation
//! - InvertedIndex and NgramIndex, bundled per build into an IndexGeneration
//! - QueryExpander for synonym expansion
//! - Scorer trait with the KeywordScorer default implementation
//! - Filter, facet, highlight and suggestion stages
//! - QueryCache and SearchHistory, each a single-owner locked structure
//! - HistoryStore persistence (memory and file backed)
//! - SearchEngine, the coordinator that runs the whole pipeline
//!
//! # Usage
//!
//! ```
//! use sift_core::{ItemType, Query, SearchableItem};
//! use sift_search::SearchEngine;
//!
//! let engine = SearchEngine::builder().build().unwrap();
//! engine.index_items(vec![
//!     SearchableItem::new("a", ItemType::Article, "Heroes").with_content("Marvel Spider-Man hero"),
//!     SearchableItem::new("b", ItemType::Article, "Villains").with_content("DC Batman hero"),
//! ]);
//!
//! let response = engine.search(&Query::new("spider"));
//! assert_eq!(response.results[0].item.id, "a");
//! assert_eq!(response.total, 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod cache;
pub mod engine;
pub mod expand;
pub mod facet;
pub mod filter;
pub mod generation;
pub mod highlight;
pub mod history;
pub mod index;
pub mod ngram;
pub mod scorer;
pub mod store;
pub mod suggest;
pub mod tokenizer;

// Re-export commonly used types
pub use adapters::{Artwork, Project};
pub use cache::{CacheStats, QueryCache};
pub use engine::{Candidates, EngineStats, SearchEngine, SearchEngineBuilder};
pub use expand::QueryExpander;
pub use generation::IndexGeneration;
pub use highlight::{Highlight, Highlighter};
pub use history::SearchHistory;
pub use index::{DocId, InvertedIndex, NgramIndex, PostingSet};
pub use scorer::{KeywordScorer, Scorer};
pub use store::{FileHistoryStore, HistoryStore, MemoryHistoryStore};
pub use tokenizer::{normalize, Tokenizer};
