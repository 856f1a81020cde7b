//! Core types for sift
//!
//! This crate defines the foundational types used throughout the system:
//! - SearchableItem, ItemType, ItemMetadata: the indexed record model
//! - Query, Filters, Sort, Pagination, FacetField: the search request
//! - SearchResponse, SearchResult, AiInsights: the search response
//! - HistoryEntry, HistorySnapshot, SearchAnalytics: query history data
//! - IndexReport, IndexStats: indexing outcomes
//! - SearchConfig: tunable parameters
//! - Error: error type hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod history_types;
pub mod index_types;
pub mod item;
pub mod search_types;

pub use config::{SearchConfig, SynonymRule, DEFAULT_STOP_WORDS};
pub use error::{Error, Result};
pub use history_types::{
    new_session_id, HistoryEntry, HistorySnapshot, PopularQuery, SearchAnalytics,
};
pub use index_types::{IndexReport, IndexStats, RejectedItem};
pub use item::{ArtworkMetadata, ItemMetadata, ItemType, ProjectMetadata, SearchableItem};
pub use search_types::{
    AiInsights, DateRange, FacetField, FacetValue, Filters, MatchedField, Pagination, Query,
    SearchResponse, SearchResult, Sort, SortBy, SortDirection,
};
