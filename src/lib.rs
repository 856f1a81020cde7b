//! Sift - Embedded full-text search engine
//!
//! Sift indexes heterogeneous content items (projects, artworks, articles)
//! and answers keyword queries with fuzzy fallback, synonym expansion,
//! structured filters, facets, highlighting, suggestions and caching.
//!
//! # Quick Start
//!
//! ```
//! use sift::{ItemType, Query, SearchEngine, SearchableItem};
//!
//! let engine = SearchEngine::builder().build().unwrap();
//! engine.index_items(vec![
//!     SearchableItem::new("p1", ItemType::Project, "Search engine")
//!         .with_content("Inverted index written in Rust")
//!         .with_tags(["rust"]),
//! ]);
//!
//! let response = engine.search(&Query::new("rust index"));
//! assert_eq!(response.total, 1);
//! ```
//!
//! # Architecture
//!
//! - `sift-core`: data model, request and response types, config, errors
//! - `sift-search`: indexes, pipeline stages and the [`SearchEngine`] coordinator
//! - `sift-intelligence`: the optional [`Enhancer`] collaborator
//!
//! Only the types a caller needs are re-exported here; the pipeline stages
//! stay reachable through the member crates.

pub use sift_core::*;
pub use sift_intelligence::{EnhanceError, Enhancement, EnhancementRequest, Enhancer};
pub use sift_search::{
    Artwork, CacheStats, EngineStats, FileHistoryStore, HistoryStore, KeywordScorer,
    MemoryHistoryStore, Project, Scorer, SearchEngine, SearchEngineBuilder,
};
