//! Search coordinator
//!
//! This module provides:
//! - SearchEngine: owns the live index generation, the query cache and the
//!   search history, and runs the search pipeline
//! - SearchEngineBuilder: explicit construction with injected collaborators
//! - EngineStats: pipeline counters
//!
//! # Architectural Rules
//!
//! - No global state: every engine is built explicitly and owns its state.
//! - Build-then-swap: a rebuild constructs a complete `IndexGeneration`
//!   before publishing it. A query clones the current `Arc` once and uses
//!   that generation throughout, so it never observes a partial index.
//! - The base pipeline is synchronous. Enhancement is an optional,
//!   time-boxed post-step whose failure never fails the search.
//!   Workers left running by abandoned calls are capped by an
//!   `InFlightLimit`; at the cap, enhancement is skipped for that search.
//! - Search never returns an error: failures (and panics) inside the
//!   pipeline are logged and produce an empty response.

use crate::adapters::{Artwork, Project};
use crate::cache::QueryCache;
use crate::expand::QueryExpander;
use crate::facet;
use crate::filter;
use crate::generation::{validate_items, IndexGeneration};
use crate::highlight::Highlighter;
use crate::history::SearchHistory;
use crate::index::PostingSet;
use crate::ngram::ngram_set;
use crate::scorer::{KeywordScorer, Scorer};
use crate::store::HistoryStore;
use crate::suggest;
use crate::tokenizer::Tokenizer;
use parking_lot::{Mutex, RwLock};
use sift_core::{
    new_session_id, Error, FacetField, HistoryEntry, IndexReport, IndexStats, ItemType,
    PopularQuery, Query, Result, SearchAnalytics, SearchConfig, SearchResponse, SearchResult,
    SearchableItem, Sort, SortBy, SortDirection,
};
use sift_intelligence::{
    enhance_with_timeout, is_permutation, EnhancementRequest, Enhancer, InFlightLimit,
};
use std::cmp::Ordering as CmpOrdering;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Number of top queries reported by `analytics`
const ANALYTICS_TOP_QUERIES: usize = 10;

// ============================================================================
// Stats
// ============================================================================

/// Snapshot of the engine's pipeline counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Calls to `search`
    pub searches: u64,
    /// Searches answered from the cache
    pub cache_hits: u64,
    /// Searches that ran the pipeline
    pub cache_misses: u64,
    /// Inverted/n-gram index lookups performed
    pub index_lookups: u64,
    /// Candidate gathers that fell back to fuzzy matching
    pub fuzzy_fallbacks: u64,
    /// Enhancer calls that failed or timed out
    pub enhancement_failures: u64,
}

#[derive(Debug, Default)]
struct Counters {
    searches: AtomicU64,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    index_lookups: AtomicU64,
    fuzzy_fallbacks: AtomicU64,
    enhancement_failures: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64, n: u64) {
        counter.fetch_add(n, Ordering::Relaxed);
    }

    fn snapshot(&self) -> EngineStats {
        EngineStats {
            searches: self.searches.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            index_lookups: self.index_lookups.load(Ordering::Relaxed),
            fuzzy_fallbacks: self.fuzzy_fallbacks.load(Ordering::Relaxed),
            enhancement_failures: self.enhancement_failures.load(Ordering::Relaxed),
        }
    }
}

/// Candidate set gathered for a query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Candidates {
    /// Documents matched by exact token lookup
    pub exact: PostingSet,
    /// Exact and fuzzy candidates together
    pub all: PostingSet,
    /// True if the exact set was too small and fuzzy candidates were added
    pub fuzzy_used: bool,
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`SearchEngine`]
///
/// # Example
///
/// ```
/// use sift_core::SearchConfig;
/// use sift_search::SearchEngine;
///
/// let engine = SearchEngine::builder()
///     .with_config(SearchConfig::default().with_fuzzy_threshold(5))
///     .with_session_id("session-1")
///     .build()
///     .unwrap();
/// assert_eq!(engine.session_id(), "session-1");
/// ```
#[derive(Default)]
pub struct SearchEngineBuilder {
    config: SearchConfig,
    scorer: Option<Arc<dyn Scorer>>,
    enhancer: Option<Arc<dyn Enhancer>>,
    history_store: Option<Arc<dyn HistoryStore>>,
    session_id: Option<String>,
}

impl SearchEngineBuilder {
    /// Create a builder with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set configuration
    pub fn with_config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self
    }

    /// Builder: replace the keyword scorer
    pub fn with_scorer(mut self, scorer: Arc<dyn Scorer>) -> Self {
        self.scorer = Some(scorer);
        self
    }

    /// Builder: attach an enhancer
    pub fn with_enhancer(mut self, enhancer: Arc<dyn Enhancer>) -> Self {
        self.enhancer = Some(enhancer);
        self
    }

    /// Builder: persist history through `store`
    pub fn with_history_store(mut self, store: Arc<dyn HistoryStore>) -> Self {
        self.history_store = Some(store);
        self
    }

    /// Builder: fix the session id recorded in history
    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Validate the configuration and build the engine
    ///
    /// Saved history is loaded from the store, if one is configured. A store
    /// that cannot be read is logged and history starts empty.
    pub fn build(self) -> Result<SearchEngine> {
        self.config.validate()?;
        let config = self.config;

        let history = SearchHistory::new(config.history_capacity)
            .with_popularity_capacity(config.popularity_capacity);
        if let Some(store) = &self.history_store {
            match store.load(&config.history_namespace) {
                Ok(Some(snapshot)) => {
                    tracing::debug!(
                        target: "sift::search",
                        namespace = %config.history_namespace,
                        entries = snapshot.entries.len(),
                        "Loaded search history"
                    );
                    history.restore(snapshot);
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(
                        target: "sift::search",
                        namespace = %config.history_namespace,
                        error = %e,
                        "Failed to load search history, starting empty"
                    );
                }
            }
        }

        let scorer: Arc<dyn Scorer> = match self.scorer {
            Some(scorer) => scorer,
            None => Arc::new(KeywordScorer::from_config(&config)),
        };

        Ok(SearchEngine {
            tokenizer: Tokenizer::from_config(&config),
            expander: QueryExpander::new(config.synonyms.clone()),
            highlighter: Highlighter::new(config.snippet_max_len),
            scorer,
            enhancer: self.enhancer,
            enhance_limit: InFlightLimit::new(config.max_inflight_enhancements),
            history_store: self.history_store,
            session_id: self.session_id.unwrap_or_else(new_session_id),
            current: RwLock::new(Arc::new(IndexGeneration::empty(0, config.ngram_size))),
            build_lock: Mutex::new(()),
            cache: QueryCache::new(config.cache_ttl(), config.cache_capacity),
            history,
            counters: Counters::default(),
            config,
        })
    }
}

// ============================================================================
// SearchEngine
// ============================================================================

/// Embedded full-text search engine
///
/// # Architecture
///
/// ```text
/// Query
///   │
///   ▼
/// QueryCache ──hit──────────────────────────────────────────┐
///   │ miss                                                   │
///   ▼                                                        │
/// Expand → Candidates (exact, fuzzy fallback) → Filter      │
///   → Score/Rank → Sort → Facets → Paginate → Highlight     │
///   → Suggest → [Enhance, time-boxed] → Cache write          │
///   │                                                        │
///   ▼                                                        ▼
/// History ◄──────────────────────────────────────────────────┘
///   │
///   ▼
/// SearchResponse
/// ```
///
/// # Thread Safety
///
/// All methods take `&self`. The live generation sits behind an `RwLock`
/// holding an `Arc`; cache and history each have their own lock. Rebuilds
/// are serialized by a separate mutex so queries keep running during one.
pub struct SearchEngine {
    config: SearchConfig,
    tokenizer: Tokenizer,
    expander: QueryExpander,
    highlighter: Highlighter,
    scorer: Arc<dyn Scorer>,
    enhancer: Option<Arc<dyn Enhancer>>,
    enhance_limit: InFlightLimit,
    history_store: Option<Arc<dyn HistoryStore>>,
    session_id: String,
    current: RwLock<Arc<IndexGeneration>>,
    build_lock: Mutex<()>,
    cache: QueryCache,
    history: SearchHistory,
    counters: Counters,
}

impl SearchEngine {
    /// Start building an engine
    pub fn builder() -> SearchEngineBuilder {
        SearchEngineBuilder::new()
    }

    /// Build an engine with `config` and no collaborators
    pub fn new(config: SearchConfig) -> Result<Self> {
        Self::builder().with_config(config).build()
    }

    /// Engine configuration
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Session id recorded in history entries
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// The live index generation
    pub fn generation(&self) -> Arc<IndexGeneration> {
        Arc::clone(&self.current.read())
    }

    // ========================================================================
    // Indexing
    // ========================================================================

    /// Replace the whole index with `items`
    ///
    /// Invalid items (blank or duplicate id) are skipped and reported; the
    /// rest are indexed. The previous generation keeps serving queries until
    /// the new one is published. The query cache is cleared.
    pub fn index_items(&self, items: Vec<SearchableItem>) -> IndexReport {
        let _build = self.build_lock.lock();
        self.rebuild(items)
    }

    /// Replace all project items, keeping items of other types
    pub fn index_projects(&self, projects: &[Project]) -> IndexReport {
        let items = projects.iter().map(SearchableItem::from).collect();
        self.replace_type(ItemType::Project, items)
    }

    /// Replace all artwork items, keeping items of other types
    pub fn index_artworks(&self, artworks: &[Artwork]) -> IndexReport {
        let items = artworks.iter().map(SearchableItem::from).collect();
        self.replace_type(ItemType::Artwork, items)
    }

    /// Drop every item
    pub fn clear(&self) {
        let _build = self.build_lock.lock();
        self.rebuild(vec![]);
    }

    fn replace_type(&self, item_type: ItemType, mut items: Vec<SearchableItem>) -> IndexReport {
        let _build = self.build_lock.lock();
        let current = self.generation();
        // New items go first so reported positions match the caller's slice
        items.extend(
            current
                .items()
                .iter()
                .filter(|item| item.item_type != item_type)
                .cloned(),
        );
        self.rebuild(items)
    }

    /// Build and publish a new generation. Caller holds `build_lock`.
    fn rebuild(&self, items: Vec<SearchableItem>) -> IndexReport {
        let start = Instant::now();
        let (accepted, rejected) = validate_items(items);
        for r in &rejected {
            tracing::warn!(
                target: "sift::search",
                position = r.position,
                id = %r.id,
                reason = %r.reason,
                "Rejected item"
            );
        }

        let number = self.generation().number() + 1;
        let generation = IndexGeneration::build(
            number,
            accepted,
            &self.tokenizer,
            self.config.ngram_size,
        );
        let stats = generation.stats();

        *self.current.write() = Arc::new(generation);
        self.cache.clear();

        tracing::info!(
            target: "sift::search",
            generation = number,
            items = stats.items,
            rejected = rejected.len(),
            terms = stats.terms,
            ngrams = stats.ngrams,
            elapsed_us = start.elapsed().as_micros() as u64,
            "Index rebuilt"
        );

        IndexReport {
            indexed: stats.items,
            rejected,
        }
    }

    /// Statistics for the live generation
    pub fn index_stats(&self) -> IndexStats {
        self.generation().stats()
    }

    /// Copy of every indexed item
    pub fn items(&self) -> Vec<SearchableItem> {
        self.generation().items().to_vec()
    }

    // ========================================================================
    // Search
    // ========================================================================

    /// Run a search
    ///
    /// # Flow
    ///
    /// 1. Serve from the cache if an entry for this query and generation is
    ///    still fresh
    /// 2. Otherwise run the base pipeline against one generation snapshot
    /// 3. Enhance the page if an enhancer is configured (best effort)
    /// 4. Cache the response
    /// 5. Record the search in history
    ///
    /// Empty or unmatched queries return an empty result list; this is not
    /// an error.
    pub fn search(&self, query: &Query) -> SearchResponse {
        let start = Instant::now();
        Counters::bump(&self.counters.searches, 1);
        let generation = self.generation();

        if let Some(cached) = self.cache.get(query, generation.number()) {
            Counters::bump(&self.counters.cache_hits, 1);
            tracing::debug!(target: "sift::search", query = %query.text, "Cache hit");
            let response = cached.with_processing_time(elapsed_micros(start));
            self.record_search(&query.text, response.total, response.processing_time_micros);
            return response;
        }
        Counters::bump(&self.counters.cache_misses, 1);
        tracing::debug!(target: "sift::search", query = %query.text, "Cache miss");

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.execute(query, &generation)));
        let mut response = match outcome {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                tracing::error!(
                    target: "sift::search",
                    query = %query.text,
                    error = %e,
                    "Search pipeline failed"
                );
                return SearchResponse::empty(query.text.clone())
                    .with_processing_time(elapsed_micros(start));
            }
            Err(payload) => {
                tracing::error!(
                    target: "sift::search",
                    query = %query.text,
                    panic = %panic_message(payload.as_ref()),
                    "Search pipeline panicked"
                );
                return SearchResponse::empty(query.text.clone())
                    .with_processing_time(elapsed_micros(start));
            }
        };

        self.enhance(&mut response);

        response.processing_time_micros = elapsed_micros(start);
        self.cache.put(query, generation.number(), response.clone());
        self.record_search(&query.text, response.total, response.processing_time_micros);
        response
    }

    /// Candidate documents for `text` in the live generation
    ///
    /// Runs the expansion and gathering stages only.
    pub fn candidates(&self, text: &str) -> Candidates {
        let generation = self.generation();
        let expanded = self.expander.expand(text);
        let tokens = self.tokenizer.tokenize_unique(&expanded);
        self.gather(&generation, text, &tokens)
    }

    /// Base pipeline, from expansion through suggestions
    fn execute(&self, query: &Query, generation: &IndexGeneration) -> Result<SearchResponse> {
        let expanded = self.expander.expand(&query.text);
        let query_tokens = self.tokenizer.tokenize_unique(&expanded);
        let candidates = self.gather(generation, &query.text, &query_tokens);

        // Filter
        let mut filtered = Vec::with_capacity(candidates.all.len());
        for &doc in &candidates.all {
            let item = generation.item(doc).ok_or_else(|| {
                Error::Internal(format!(
                    "document {} missing from generation {}",
                    doc,
                    generation.number()
                ))
            })?;
            if filter::matches(item, &query.filters) {
                filtered.push((doc, item));
            }
        }

        // Score / rank
        let mut ranked: Vec<Scored<'_>> = filtered
            .into_iter()
            .map(|(doc, item)| Scored {
                item,
                score: self.scorer.score(&query_tokens, generation.tokens(doc)),
            })
            .filter(|s| s.score > 0.0)
            .collect();
        sort_ranked(&mut ranked, query.sort.unwrap_or_default());

        // Facets over every ranked result, before pagination
        let facet_fields = query.facet_fields.clone().unwrap_or_else(FacetField::all);
        let facets = facet::aggregate(
            ranked.iter().map(|s| s.item),
            &facet_fields,
            self.config.max_tag_facets,
        );

        // Paginate, then highlight the page only
        let (offset, limit) = query
            .pagination
            .map_or((0, self.config.default_limit), |p| (p.offset, p.limit));
        let total = ranked.len();
        let results = ranked
            .iter()
            .skip(offset)
            .take(limit)
            .map(|s| {
                let highlight = self.highlighter.highlight_item(&query_tokens, s.item);
                SearchResult {
                    item: s.item.clone(),
                    score: s.score,
                    highlights: highlight.highlights,
                    matched_fields: self.highlighter.matched_fields(&query_tokens, s.item),
                    snippet: highlight.snippet,
                }
            })
            .collect();

        let suggestions = suggest::suggest(
            &query.text,
            &self.history,
            generation.inverted(),
            self.config.max_suggestions,
        );

        Ok(SearchResponse {
            results,
            total,
            query: query.text.clone(),
            processing_time_micros: 0,
            suggestions,
            facets,
            ai_insights: None,
        })
    }

    /// Exact lookup for every token; fuzzy fallback when that finds too few
    fn gather(&self, generation: &IndexGeneration, original: &str, tokens: &[String]) -> Candidates {
        let mut exact = PostingSet::new();
        for token in tokens {
            exact.extend(generation.inverted().lookup(token).iter().copied());
        }
        Counters::bump(&self.counters.index_lookups, tokens.len() as u64);

        let mut all = exact.clone();
        let mut fuzzy_used = false;
        if exact.len() < self.config.fuzzy_candidate_threshold {
            let grams = ngram_set(original, generation.ngrams().ngram_size());
            if !grams.is_empty() {
                let fuzzy = generation
                    .ngrams()
                    .fuzzy_candidates(&grams, self.config.fuzzy_overlap_ratio);
                Counters::bump(&self.counters.index_lookups, grams.len() as u64);
                Counters::bump(&self.counters.fuzzy_fallbacks, 1);
                tracing::debug!(
                    target: "sift::search",
                    exact = exact.len(),
                    fuzzy = fuzzy.len(),
                    "Fuzzy fallback"
                );
                all.extend(fuzzy);
                fuzzy_used = true;
            }
        }

        Candidates {
            exact,
            all,
            fuzzy_used,
        }
    }

    /// Merge enhancer output into `response`, if an enhancer answers in time
    fn enhance(&self, response: &mut SearchResponse) {
        let Some(enhancer) = &self.enhancer else {
            return;
        };
        if self.tokenizer.tokenize(&response.query).is_empty() {
            return;
        }

        let titles = response.results.iter().map(|r| r.item.title.clone()).collect();
        let request = EnhancementRequest::new(response.query.clone(), titles);
        match enhance_with_timeout(
            Arc::clone(enhancer),
            request,
            self.config.enhancement_timeout(),
            &self.enhance_limit,
        ) {
            Ok(enhancement) => {
                if let Some(order) = enhancement.order {
                    if is_permutation(&order, response.results.len()) {
                        let mut slots: Vec<Option<SearchResult>> =
                            response.results.drain(..).map(Some).collect();
                        response.results = order
                            .iter()
                            .filter_map(|&i| slots.get_mut(i).and_then(Option::take))
                            .collect();
                    } else {
                        tracing::debug!(
                            target: "sift::search",
                            enhancer = enhancer.name(),
                            "Ignored invalid result order"
                        );
                    }
                }
                response.suggestions = suggest::merge_suggestions(
                    std::mem::take(&mut response.suggestions),
                    &response.query,
                    enhancement.suggestions,
                    self.config.max_suggestions,
                );
                response.ai_insights = Some(enhancement.insights);
            }
            Err(e) => {
                Counters::bump(&self.counters.enhancement_failures, 1);
                tracing::warn!(
                    target: "sift::search",
                    enhancer = enhancer.name(),
                    error = %e,
                    "Enhancement failed, returning base results"
                );
            }
        }
    }

    // ========================================================================
    // History & analytics
    // ========================================================================

    fn record_search(&self, text: &str, total: usize, micros: u64) {
        let entry = HistoryEntry::new(text, total, micros, self.session_id.clone());
        if self.history.record(entry) {
            self.persist_history();
        }
    }

    fn persist_history(&self) {
        let Some(store) = &self.history_store else {
            return;
        };
        let namespace = &self.config.history_namespace;
        if let Err(e) = store.save(namespace, &self.history.snapshot()) {
            tracing::warn!(
                target: "sift::search",
                namespace = %namespace,
                error = %e,
                "Failed to save search history"
            );
        }
    }

    /// Record that `result_id` was opened from the results of `query`
    ///
    /// Returns false if `query` is not in the history log.
    pub fn record_click(&self, query: &str, result_id: &str) -> bool {
        let recorded = self.history.record_click(query, result_id);
        if recorded {
            self.persist_history();
        }
        recorded
    }

    /// Most frequent queries
    pub fn popular_queries(&self, limit: usize) -> Vec<PopularQuery> {
        self.history.popular_queries(limit)
    }

    /// Most recent searches, newest first
    pub fn recent_searches(&self, limit: usize) -> Vec<HistoryEntry> {
        self.history.recent(limit)
    }

    /// Forget all history
    pub fn clear_history(&self) {
        self.history.clear();
        self.persist_history();
    }

    /// Aggregated analytics, including cache counters
    pub fn analytics(&self) -> SearchAnalytics {
        let stats = self.counters.snapshot();
        SearchAnalytics {
            cache_hits: stats.cache_hits,
            cache_misses: stats.cache_misses,
            ..self.history.analytics(ANALYTICS_TOP_QUERIES)
        }
    }

    /// Pipeline counters
    pub fn stats(&self) -> EngineStats {
        self.counters.snapshot()
    }
}

// ============================================================================
// Ranking helpers
// ============================================================================

struct Scored<'g> {
    item: &'g SearchableItem,
    score: f64,
}

/// Order ranked results; every sort is stable, so ties keep index order
fn sort_ranked(ranked: &mut [Scored<'_>], sort: Sort) {
    let by_score = |a: &Scored<'_>, b: &Scored<'_>| {
        a.score.partial_cmp(&b.score).unwrap_or(CmpOrdering::Equal)
    };
    let by_date = |a: &Scored<'_>, b: &Scored<'_>| a.item.last_modified.cmp(&b.item.last_modified);
    let by_title = |a: &Scored<'_>, b: &Scored<'_>| {
        a.item
            .title
            .to_lowercase()
            .cmp(&b.item.title.to_lowercase())
    };

    match (sort.by, sort.direction) {
        (SortBy::Relevance, SortDirection::Desc) => ranked.sort_by(|a, b| by_score(b, a)),
        (SortBy::Relevance, SortDirection::Asc) => ranked.sort_by(by_score),
        (SortBy::Date, SortDirection::Desc) => ranked.sort_by(|a, b| by_date(b, a)),
        (SortBy::Date, SortDirection::Asc) => ranked.sort_by(by_date),
        (SortBy::Title, SortDirection::Desc) => ranked.sort_by(|a, b| by_title(b, a)),
        (SortBy::Title, SortDirection::Asc) => ranked.sort_by(by_title),
    }
}

fn elapsed_micros(start: Instant) -> u64 {
    start.elapsed().as_micros() as u64
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

// ============================================================================
// Tests
// ============================================================================
