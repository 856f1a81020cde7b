//! Search history and analytics
//!
//! `SearchHistory` owns the query log and the popularity map behind one
//! mutex. Nothing else touches either structure directly.
//!
//! Both structures are capped. Once `capacity` entries are held, the oldest
//! log entry is dropped for every new one. Popularity counts survive log
//! pruning but are limited to `popularity_capacity` distinct queries: past
//! that, the query ranked last by `popular_queries` (lowest count, then last
//! alphabetically) is evicted. The query being recorded is never the one
//! evicted.

use crate::tokenizer::normalize;
use parking_lot::Mutex;
use sift_core::{HistoryEntry, HistorySnapshot, PopularQuery, SearchAnalytics};
use std::collections::{BTreeMap, VecDeque};

/// Default limit on distinct queries tracked for popularity
pub const DEFAULT_POPULARITY_CAPACITY: usize = 10_000;

#[derive(Debug, Default)]
struct HistoryState {
    entries: VecDeque<HistoryEntry>,
    popularity: BTreeMap<String, u64>,
}

/// Capped, mutex-guarded query log
#[derive(Debug)]
pub struct SearchHistory {
    capacity: usize,
    popularity_capacity: usize,
    state: Mutex<HistoryState>,
}

impl SearchHistory {
    /// Create an empty history holding at most `capacity` entries
    pub fn new(capacity: usize) -> Self {
        SearchHistory {
            capacity: capacity.max(1),
            popularity_capacity: DEFAULT_POPULARITY_CAPACITY,
            state: Mutex::new(HistoryState::default()),
        }
    }

    /// Builder: limit the number of distinct queries tracked for popularity
    pub fn with_popularity_capacity(mut self, capacity: usize) -> Self {
        self.popularity_capacity = capacity.max(1);
        self
    }

    /// Append an entry
    ///
    /// Returns false (and records nothing) for queries that are empty after
    /// normalization.
    pub fn record(&self, entry: HistoryEntry) -> bool {
        let key = normalize(&entry.query);
        if key.is_empty() {
            return false;
        }

        let mut state = self.state.lock();
        *state.popularity.entry(key.clone()).or_insert(0) += 1;
        prune_popularity(&mut state.popularity, self.popularity_capacity, Some(key.as_str()));
        state.entries.push_back(entry);
        while state.entries.len() > self.capacity {
            state.entries.pop_front();
        }
        true
    }

    /// Attach a click to the most recent entry for `query`
    ///
    /// Returns false if no logged entry matches.
    pub fn record_click(&self, query: &str, result_id: &str) -> bool {
        let key = normalize(query);
        let mut state = self.state.lock();
        match state
            .entries
            .iter_mut()
            .rev()
            .find(|e| normalize(&e.query) == key)
        {
            Some(entry) => {
                if !entry.clicked_result_ids.iter().any(|id| id == result_id) {
                    entry.clicked_result_ids.push(result_id.to_string());
                }
                true
            }
            None => false,
        }
    }

    /// Most frequent normalized queries, ties broken alphabetically
    pub fn popular_queries(&self, limit: usize) -> Vec<PopularQuery> {
        let state = self.state.lock();
        top_queries(&state.popularity, limit)
    }

    /// Popular queries containing `fragment` (normalized), most frequent first
    pub fn popular_matching(&self, fragment: &str, limit: usize) -> Vec<String> {
        let fragment = normalize(fragment);
        if fragment.is_empty() {
            return vec![];
        }
        let state = self.state.lock();
        let mut matching: Vec<(&String, &u64)> = state
            .popularity
            .iter()
            .filter(|(q, _)| q.contains(fragment.as_str()))
            .collect();
        // BTreeMap iteration is alphabetical; a stable sort keeps that for ties
        matching.sort_by(|a, b| b.1.cmp(a.1));
        matching
            .into_iter()
            .take(limit)
            .map(|(q, _)| q.clone())
            .collect()
    }

    /// Most recent entries, newest first
    pub fn recent(&self, limit: usize) -> Vec<HistoryEntry> {
        let state = self.state.lock();
        state.entries.iter().rev().take(limit).cloned().collect()
    }

    /// Number of logged entries
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    /// True if nothing is logged
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop the log and the popularity map
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.entries.clear();
        state.popularity.clear();
    }

    /// Copy of the full state, for persistence
    pub fn snapshot(&self) -> HistorySnapshot {
        let state = self.state.lock();
        HistorySnapshot {
            entries: state.entries.iter().cloned().collect(),
            popularity: state.popularity.clone(),
        }
    }

    /// Replace the state with a snapshot
    ///
    /// Entries beyond capacity are dropped oldest first.
    pub fn restore(&self, snapshot: HistorySnapshot) {
        let mut entries: VecDeque<HistoryEntry> = snapshot.entries.into();
        while entries.len() > self.capacity {
            entries.pop_front();
        }
        let mut popularity = snapshot.popularity;
        prune_popularity(&mut popularity, self.popularity_capacity, None);

        let mut state = self.state.lock();
        state.entries = entries;
        state.popularity = popularity;
    }

    /// Aggregate analytics over the log
    ///
    /// Cache counters are owned by the cache and are left at zero here.
    pub fn analytics(&self, top: usize) -> SearchAnalytics {
        let state = self.state.lock();
        let total = state.entries.len();
        let (time_sum, zero, clicked) =
            state
                .entries
                .iter()
                .fold((0u64, 0usize, 0usize), |(t, z, c), e| {
                    (
                        t.saturating_add(e.processing_time_micros),
                        z + usize::from(e.results_count == 0),
                        c + usize::from(!e.clicked_result_ids.is_empty()),
                    )
                });

        SearchAnalytics {
            total_searches: total,
            unique_queries: state.popularity.len(),
            average_processing_time_micros: if total == 0 { 0 } else { time_sum / total as u64 },
            zero_result_searches: zero,
            click_through_rate: if total == 0 {
                0.0
            } else {
                clicked as f64 / total as f64
            },
            cache_hits: 0,
            cache_misses: 0,
            top_queries: top_queries(&state.popularity, top),
        }
    }
}

/// Evict lowest-ranked queries until at most `capacity` remain, sparing `keep`
fn prune_popularity(popularity: &mut BTreeMap<String, u64>, capacity: usize, keep: Option<&str>) {
    while popularity.len() > capacity {
        let victim = popularity
            .iter()
            .filter(|(query, _)| Some(query.as_str()) != keep)
            .min_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(query, _)| query.clone());
        match victim {
            Some(query) => {
                popularity.remove(&query);
            }
            None => break,
        }
    }
}

fn top_queries(popularity: &BTreeMap<String, u64>, limit: usize) -> Vec<PopularQuery> {
    let mut all: Vec<PopularQuery> = popularity
        .iter()
        .map(|(query, count)| PopularQuery {
            query: query.clone(),
            count: *count,
        })
        .collect();
    all.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.query.cmp(&b.query)));
    all.truncate(limit);
    all
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(query: &str, results: usize, micros: u64) -> HistoryEntry {
        HistoryEntry::new(query, results, micros, "session")
    }

    #[test]
    fn test_record_and_recent() {
        let history = SearchHistory::new(10);
        history.record(entry("rust", 2, 10));
        history.record(entry("react", 1, 10));

        let recent = history.recent(5);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].query, "react", "newest first");
    }

    #[test]
    fn test_blank_query_not_recorded() {
        let history = SearchHistory::new(10);
        assert!(!history.record(entry("   ", 0, 1)));
        assert!(!history.record(entry("?!", 0, 1)));
        assert!(history.is_empty());
        assert!(history.popular_queries(5).is_empty());
    }

    #[test]
    fn test_capacity_prunes_oldest() {
        let history = SearchHistory::new(3);
        for q in ["q1", "q2", "q3", "q4", "q5"] {
            history.record(entry(q, 1, 1));
        }
        let queries: Vec<_> = history.recent(10).into_iter().map(|e| e.query).collect();
        assert_eq!(queries, vec!["q5", "q4", "q3"]);
        // popularity outlives pruning
        assert_eq!(history.popular_queries(10).len(), 5);
    }

    #[test]
    fn test_popularity_capped() {
        let history = SearchHistory::new(3).with_popularity_capacity(4);
        for i in 0..500 {
            history.record(entry(&format!("query {}", i), 1, 1));
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.popular_queries(usize::MAX).len(), 4);
        assert_eq!(history.analytics(10).unique_queries, 4);
    }

    #[test]
    fn test_popularity_evicts_lowest_ranked() {
        let history = SearchHistory::new(10).with_popularity_capacity(3);
        for q in ["rust", "rust", "alpha", "beta"] {
            history.record(entry(q, 1, 1));
        }
        // "beta" ranks last among the single-count queries
        history.record(entry("gamma", 1, 1));

        let names: Vec<_> = history.popular_queries(10).into_iter().map(|p| p.query).collect();
        assert_eq!(names, vec!["rust", "alpha", "gamma"]);
    }

    #[test]
    fn test_restore_trims_popularity() {
        let big = SearchHistory::new(10);
        for q in ["a1", "a2", "a2", "a3"] {
            big.record(entry(q, 1, 1));
        }
        let small = SearchHistory::new(10).with_popularity_capacity(2);
        small.restore(big.snapshot());
        let names: Vec<_> = small.popular_queries(10).into_iter().map(|p| p.query).collect();
        assert_eq!(names, vec!["a2", "a1"]);
    }

    #[test]
    fn test_popularity_normalized() {
        let history = SearchHistory::new(10);
        history.record(entry("Rust", 1, 1));
        history.record(entry("rust!", 1, 1));
        history.record(entry("react", 1, 1));

        let popular = history.popular_queries(10);
        assert_eq!(
            popular[0],
            PopularQuery {
                query: "rust".into(),
                count: 2
            }
        );
        assert_eq!(popular[1].query, "react");
    }

    #[test]
    fn test_popular_ties_alphabetical() {
        let history = SearchHistory::new(10);
        for q in ["zeta", "alpha", "mid"] {
            history.record(entry(q, 1, 1));
        }
        let names: Vec<_> = history.popular_queries(10).into_iter().map(|p| p.query).collect();
        assert_eq!(names, vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn test_popular_matching() {
        let history = SearchHistory::new(10);
        history.record(entry("react hooks", 1, 1));
        history.record(entry("react native", 1, 1));
        history.record(entry("react native", 1, 1));
        history.record(entry("vue", 1, 1));

        assert_eq!(
            history.popular_matching("React", 5),
            vec!["react native", "react hooks"]
        );
        assert!(history.popular_matching("  ", 5).is_empty());
    }

    #[test]
    fn test_record_click_latest_entry() {
        let history = SearchHistory::new(10);
        history.record(entry("rust", 1, 1));
        history.record(entry("rust", 1, 1));

        assert!(history.record_click("RUST", "p1"));
        assert!(history.record_click("rust", "p1"));
        assert!(!history.record_click("unknown", "p1"));

        let recent = history.recent(2);
        assert_eq!(recent[0].clicked_result_ids, vec!["p1"]);
        assert!(recent[1].clicked_result_ids.is_empty());
    }

    #[test]
    fn test_analytics() {
        let history = SearchHistory::new(10);
        history.record(entry("rust", 2, 100));
        history.record(entry("nothing", 0, 300));
        history.record_click("rust", "p1");

        let analytics = history.analytics(5);
        assert_eq!(analytics.total_searches, 2);
        assert_eq!(analytics.unique_queries, 2);
        assert_eq!(analytics.average_processing_time_micros, 200);
        assert_eq!(analytics.zero_result_searches, 1);
        assert!((analytics.click_through_rate - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_analytics_empty() {
        let analytics = SearchHistory::new(10).analytics(5);
        assert_eq!(analytics.total_searches, 0);
        assert_eq!(analytics.average_processing_time_micros, 0);
        assert_eq!(analytics.click_through_rate, 0.0);
    }

    #[test]
    fn test_snapshot_restore() {
        let history = SearchHistory::new(10);
        history.record(entry("rust", 1, 1));
        let snapshot = history.snapshot();

        let other = SearchHistory::new(10);
        other.restore(snapshot.clone());
        assert_eq!(other.snapshot(), snapshot);
    }

    #[test]
    fn test_restore_respects_capacity() {
        let big = SearchHistory::new(10);
        for q in ["a1", "a2", "a3"] {
            big.record(entry(q, 1, 1));
        }
        let small = SearchHistory::new(2);
        small.restore(big.snapshot());
        let queries: Vec<_> = small.recent(10).into_iter().map(|e| e.query).collect();
        assert_eq!(queries, vec!["a3", "a2"]);
    }

    #[test]
    fn test_clear() {
        let history = SearchHistory::new(10);
        history.record(entry("rust", 1, 1));
        history.clear();
        assert!(history.is_empty());
        assert!(history.popular_queries(5).is_empty());
    }
}
