//! Query response cache
//!
//! The cache is the only owner of its map; callers go through `get`/`put`.
//!
//! # Invariants
//!
//! - Keys are the JSON form of `Query::canonical`, so queries that differ in
//!   filters, sort, pagination or facets never share an entry, while queries
//!   that differ only in list order or duplicates always do.
//! - An entry is served only within `ttl` of its insertion, and only for the
//!   index generation it was computed against.
//! - The map never holds more than `capacity` entries. Expired entries are
//!   pruned first, then the oldest insertion.

use parking_lot::Mutex;
use sift_core::{Query, SearchResponse};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Canonical cache key for a query
///
/// Returns `None` if the query cannot be serialized; such queries are never
/// cached.
pub fn cache_key(query: &Query) -> Option<String> {
    match serde_json::to_string(&query.canonical()) {
        Ok(key) => Some(key),
        Err(e) => {
            tracing::debug!(target: "sift::search", error = %e, "Query not cacheable");
            None
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    response: SearchResponse,
    generation: u64,
    inserted_at: Instant,
    seq: u64,
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<String, CacheEntry>,
    next_seq: u64,
    hits: u64,
    misses: u64,
}

/// Hit/miss counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that found nothing usable
    pub misses: u64,
    /// Entries currently held
    pub entries: usize,
}

/// Time-boxed, capacity-bounded cache of full search responses
#[derive(Debug)]
pub struct QueryCache {
    ttl: Duration,
    capacity: usize,
    state: Mutex<CacheState>,
}

impl QueryCache {
    /// Create a cache
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        QueryCache {
            ttl,
            capacity: capacity.max(1),
            state: Mutex::new(CacheState::default()),
        }
    }

    /// Look up a response computed against `generation`
    pub fn get(&self, query: &Query, generation: u64) -> Option<SearchResponse> {
        self.get_at(query, generation, Instant::now())
    }

    /// Look up a response as of `now`
    pub fn get_at(&self, query: &Query, generation: u64, now: Instant) -> Option<SearchResponse> {
        let mut state = self.state.lock();
        let Some(key) = cache_key(query) else {
            state.misses += 1;
            return None;
        };

        let usable = match state.entries.get(&key) {
            Some(entry) => Some(entry.generation == generation && !self.is_expired(entry, now)),
            None => None,
        };

        match usable {
            Some(true) => {
                state.hits += 1;
                state.entries.get(&key).map(|e| e.response.clone())
            }
            Some(false) => {
                state.entries.remove(&key);
                state.misses += 1;
                None
            }
            None => {
                state.misses += 1;
                None
            }
        }
    }

    /// Store a response computed against `generation`
    pub fn put(&self, query: &Query, generation: u64, response: SearchResponse) {
        self.put_at(query, generation, response, Instant::now())
    }

    /// Store a response as of `now`
    pub fn put_at(&self, query: &Query, generation: u64, response: SearchResponse, now: Instant) {
        let Some(key) = cache_key(query) else {
            return;
        };
        let mut state = self.state.lock();

        if !state.entries.contains_key(&key) && state.entries.len() >= self.capacity {
            let ttl = self.ttl;
            state
                .entries
                .retain(|_, e| now.saturating_duration_since(e.inserted_at) < ttl);

            while state.entries.len() >= self.capacity {
                let oldest = state
                    .entries
                    .iter()
                    .min_by_key(|(_, e)| e.seq)
                    .map(|(k, _)| k.clone());
                match oldest {
                    Some(k) => {
                        state.entries.remove(&k);
                    }
                    None => break,
                }
            }
        }

        let seq = state.next_seq;
        state.next_seq += 1;
        state.entries.insert(
            key,
            CacheEntry {
                response,
                generation,
                inserted_at: now,
                seq,
            },
        );
    }

    /// Drop every entry
    ///
    /// Counters are kept.
    pub fn clear(&self) {
        self.state.lock().entries.clear();
    }

    /// Number of entries currently held (expired ones included until pruned)
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    /// True if no entries are held
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Counters snapshot
    pub fn stats(&self) -> CacheStats {
        let state = self.state.lock();
        CacheStats {
            hits: state.hits,
            misses: state.misses,
            entries: state.entries.len(),
        }
    }

    fn is_expired(&self, entry: &CacheEntry, now: Instant) -> bool {
        now.saturating_duration_since(entry.inserted_at) >= self.ttl
    }
}
