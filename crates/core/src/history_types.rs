//! Query history and analytics types
//!
//! These are plain data; the mutable log that owns them lives in the search
//! crate behind a single lock.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Generate a fresh session identifier
pub fn new_session_id() -> String {
    Uuid::new_v4().to_string()
}

/// One executed search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Query text as typed
    pub query: String,
    /// When the search ran
    pub timestamp: DateTime<Utc>,
    /// Total results (before pagination)
    pub results_count: usize,
    /// Result ids the user opened afterwards
    pub clicked_result_ids: Vec<String>,
    /// Wall time spent (microseconds)
    pub processing_time_micros: u64,
    /// Session the search belongs to
    pub session_id: String,
}

impl HistoryEntry {
    /// Create an entry stamped with the current time
    pub fn new(
        query: impl Into<String>,
        results_count: usize,
        processing_time_micros: u64,
        session_id: impl Into<String>,
    ) -> Self {
        HistoryEntry {
            query: query.into(),
            timestamp: Utc::now(),
            results_count,
            clicked_result_ids: vec![],
            processing_time_micros,
            session_id: session_id.into(),
        }
    }
}

/// Serializable state of the history log
///
/// This is what history persistence stores and restores.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistorySnapshot {
    /// Entries, oldest first
    pub entries: Vec<HistoryEntry>,
    /// Normalized query -> number of times searched
    pub popularity: BTreeMap<String, u64>,
}

/// A query and how often it was searched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopularQuery {
    /// Normalized query text
    pub query: String,
    /// Number of searches
    pub count: u64,
}

/// Aggregated search analytics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchAnalytics {
    /// Searches recorded in the history log
    pub total_searches: usize,
    /// Distinct normalized queries ever recorded
    pub unique_queries: usize,
    /// Mean processing time over the log (microseconds)
    pub average_processing_time_micros: u64,
    /// Logged searches that returned nothing
    pub zero_result_searches: usize,
    /// Share of logged searches with at least one click
    pub click_through_rate: f64,
    /// Responses served from the cache
    pub cache_hits: u64,
    /// Searches that had to run the pipeline
    pub cache_misses: u64,
    /// Most frequent queries
    pub top_queries: Vec<PopularQuery>,
}
