//! Engine Contract Tests
//!
//! Validates the observable behavior of `SearchEngine`: indexing, the search
//! pipeline, caching, enhancement and history.

use chrono::{TimeZone, Utc};
use sift_core::{
    DateRange, FacetField, FacetValue, Filters, ItemType, Pagination, Query, SearchConfig,
    SearchableItem,
};
use sift_intelligence::MockEnhancer;
use sift_search::{
    Artwork, FileHistoryStore, HistoryStore, MemoryHistoryStore, Project, SearchEngine,
};
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// Test Helpers
// ============================================================================

fn engine() -> SearchEngine {
    SearchEngine::builder()
        .with_session_id("test-session")
        .build()
        .expect("default config is valid")
}

fn article(id: &str, title: &str, content: &str) -> SearchableItem {
    SearchableItem::new(id, ItemType::Article, title).with_content(content)
}

fn ids(engine: &SearchEngine, query: &Query) -> Vec<String> {
    engine
        .search(query)
        .results
        .into_iter()
        .map(|r| r.item.id)
        .collect()
}

// ============================================================================
// Pipeline Scenarios
// ============================================================================

#[test]
fn test_exact_match_excludes_unrelated() {
    let engine = engine();
    engine.index_items(vec![
        article("a", "Heroes", "Marvel Spider-Man hero"),
        article("b", "Heroes", "DC Batman hero"),
    ]);

    let response = engine.search(&Query::new("spider"));
    let found: Vec<_> = response.results.iter().map(|r| r.item.id.as_str()).collect();
    assert!(found.contains(&"a"));
    assert!(!found.contains(&"b"));
    assert!(response.results[0].score > 0.0);
}

#[test]
fn test_typo_found_by_fuzzy_fallback() {
    let engine = engine();
    engine.index_items(vec![article("a", "Frontend", "React TypeScript project")]);

    let candidates = engine.candidates("reactt");
    assert!(candidates.exact.len() < 10);
    assert!(candidates.fuzzy_used, "few exact candidates must trigger the fallback");
    assert_eq!(candidates.all.len(), 1);

    let response = engine.search(&Query::new("reactt"));
    assert_eq!(response.total, 1);
    assert_eq!(response.results[0].item.id, "a");
}

#[test]
fn test_fuzzy_fallback_only_below_threshold() {
    let engine = engine();
    let items = (0..12)
        .map(|i| article(&format!("r{}", i), "Rust notes", "rust"))
        .collect();
    engine.index_items(items);

    let many = engine.candidates("rust");
    assert_eq!(many.exact.len(), 12);
    assert!(!many.fuzzy_used, "12 exact candidates is above the threshold of 10");

    engine.index_items(vec![article("r0", "Rust notes", "rust")]);
    let few = engine.candidates("rust");
    assert_eq!(few.exact.len(), 1);
    assert!(few.fuzzy_used);
    assert!(few.all.is_superset(&few.exact));
}

#[test]
fn test_facets_reflect_filtered_set() {
    let engine = engine();
    engine.index_items(vec![
        article("x1", "Assistant", "neural network project").with_category("AI"),
        article("x2", "Portfolio", "network project").with_category("Web"),
    ]);

    let unfiltered = engine.search(&Query::new("project"));
    assert_eq!(unfiltered.facets[&FacetField::Category].len(), 2);

    let filtered = engine.search(
        &Query::new("project").with_filters(Filters::default().with_categories(vec!["AI"])),
    );
    assert_eq!(
        filtered.facets[&FacetField::Category],
        vec![FacetValue::new("AI", 1)]
    );
    assert_eq!(filtered.total, 1);
}

#[test]
fn test_repeated_query_served_from_cache() {
    let engine = engine();
    engine.index_items(vec![
        article("a", "Rust", "rust ownership"),
        article("b", "Go", "go channels"),
    ]);
    let query = Query::new("rust").with_facets(vec![FacetField::Type]);

    let first = engine.search(&query);
    let lookups = engine.stats().index_lookups;
    let second = engine.search(&query);

    assert_eq!(first.results, second.results);
    assert_eq!(first.total, second.total);
    assert_eq!(first.facets, second.facets);
    assert_eq!(
        engine.stats().index_lookups,
        lookups,
        "cached search must not touch the index"
    );
    assert_eq!(engine.stats().cache_hits, 1);
    assert_eq!(engine.stats().cache_misses, 1);
}

#[test]
fn test_reordered_filter_lists_hit_cache() {
    let engine = engine();
    engine.index_items(vec![
        article("a", "Rust", "rust ownership").with_tags(["a"]),
        article("b", "Rust", "rust borrowing").with_tags(["b"]),
    ]);

    let ab = Query::new("rust").with_filters(Filters::default().with_tags(vec!["a", "b"]));
    let ba = Query::new("rust").with_filters(Filters::default().with_tags(vec!["b", "a"]));
    let first = engine.search(&ab);
    let second = engine.search(&ba);

    assert_eq!(first.results, second.results);
    assert_eq!(engine.stats().cache_hits, 1);
    assert_eq!(engine.stats().cache_misses, 1);
}

#[test]
fn test_rebuild_invalidates_cache() {
    let engine = engine();
    engine.index_items(vec![article("a", "Rust", "rust")]);
    assert_eq!(engine.search(&Query::new("rust")).total, 1);

    engine.index_items(vec![article("a", "Rust", "rust"), article("b", "More", "rust")]);
    assert_eq!(engine.search(&Query::new("rust")).total, 2);
    assert_eq!(engine.stats().cache_hits, 0);
}

#[test]
fn test_empty_query_returns_nothing() {
    let engine = engine();
    engine.index_items(vec![article("a", "Rust", "rust")]);

    for text in ["", "   ", "!!!"] {
        let response = engine.search(&Query::new(text));
        assert!(response.results.is_empty(), "query {:?}", text);
        assert_eq!(response.total, 0);
    }
}

#[test]
fn test_synonyms_broaden_candidates() {
    let config = SearchConfig::default().with_fuzzy_threshold(0);
    let engine = SearchEngine::new(config).unwrap();
    engine.index_items(vec![article("a", "Scripts", "javascript tooling")]);

    assert_eq!(engine.search(&Query::new("js")).total, 1);
}

#[test]
fn test_filters_and_pagination_compose() {
    let engine = engine();
    let mut items = Vec::new();
    for i in 0..6 {
        let ts = Utc.with_ymd_and_hms(2020 + i, 1, 1, 0, 0, 0).unwrap();
        let item_type = if i % 2 == 0 {
            ItemType::Project
        } else {
            ItemType::Article
        };
        items.push(
            SearchableItem::new(format!("i{}", i), item_type, "Rust")
                .with_content("rust")
                .with_last_modified(ts),
        );
    }
    engine.index_items(items);

    let filters = Filters::default()
        .with_types(vec![ItemType::Project])
        .with_date_range(DateRange::new(
            Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        ));
    let query = Query::new("rust")
        .with_filters(filters)
        .with_pagination(Pagination::new(1, 1));

    let response = engine.search(&query);
    assert_eq!(response.total, 2, "i2 and i4 pass both filters");
    assert_eq!(response.results.len(), 1);
    assert_eq!(response.results[0].item.id, "i4");
}

// ============================================================================
// Indexing
// ============================================================================

#[test]
fn test_invalid_items_reported_not_fatal() {
    let engine = engine();
    let report = engine.index_items(vec![
        article("a", "One", "first"),
        article("", "Blank", "second"),
        article("a", "Dup", "third"),
        article("c", "Three", "fourth"),
    ]);

    assert_eq!(report.indexed, 2);
    assert!(!report.is_clean());
    assert_eq!(report.rejected_ids(), vec!["", "a"]);
    assert_eq!(engine.index_stats().items, 2);
}

#[test]
fn test_domain_indexers_keep_other_types() {
    let engine = engine();
    let project = |id: &str, title: &str| Project {
        id: id.into(),
        title: title.into(),
        technologies: vec!["Rust".into()],
        ..Default::default()
    };
    let artwork = Artwork {
        id: "art".into(),
        title: "Sunset".into(),
        medium: Some("oil".into()),
        ..Default::default()
    };

    engine.index_projects(&[project("p1", "Engine")]);
    engine.index_artworks(&[artwork]);
    assert_eq!(engine.items().len(), 2);

    engine.index_projects(&[project("p2", "Parser")]);
    let mut ids: Vec<_> = engine.items().into_iter().map(|i| i.id).collect();
    ids.sort();
    assert_eq!(ids, vec!["art", "p2"]);

    assert_eq!(ids_of_query(&engine, "oil"), vec!["art"]);
    assert_eq!(ids_of_query(&engine, "parser"), vec!["p2"]);
}

fn ids_of_query(engine: &SearchEngine, text: &str) -> Vec<String> {
    ids(engine, &Query::new(text))
}

#[test]
fn test_queries_see_whole_generations() {
    let engine = Arc::new(engine());
    let small: Vec<_> = (0..3).map(|i| article(&format!("s{}", i), "Rust", "rust")).collect();
    let large: Vec<_> = (0..8).map(|i| article(&format!("l{}", i), "Rust", "rust")).collect();
    engine.index_items(small.clone());

    std::thread::scope(|scope| {
        let writer = Arc::clone(&engine);
        scope.spawn(move || {
            for round in 0..20 {
                let items = if round % 2 == 0 { large.clone() } else { small.clone() };
                writer.index_items(items);
            }
        });
        for _ in 0..4 {
            let reader = Arc::clone(&engine);
            scope.spawn(move || {
                for _ in 0..50 {
                    let total = reader.search(&Query::new("rust")).total;
                    assert!(total == 3 || total == 8, "saw partial index: {}", total);
                }
            });
        }
    });
}

// ============================================================================
// Enhancement
// ============================================================================

fn enhanced_engine(enhancer: MockEnhancer) -> SearchEngine {
    let engine = SearchEngine::builder()
        .with_config(SearchConfig::default().with_enhancement_timeout(Duration::from_millis(200)))
        .with_enhancer(Arc::new(enhancer))
        .build()
        .unwrap();
    engine.index_items(vec![
        article("a", "First", "rust"),
        article("b", "Second", "rust rust"),
    ]);
    engine
}

#[test]
fn test_enhancement_merged_when_available() {
    let engine = enhanced_engine(MockEnhancer::new());
    let response = engine.search(&Query::new("rust"));

    let insights = response.ai_insights.expect("insights present");
    assert_eq!(insights.summary, "2 results about rust");
    assert!(response.suggestions.contains(&"rust tutorial".to_string()));
    assert_eq!(engine.stats().enhancement_failures, 0);
}

#[test]
fn test_enhancement_failure_returns_base_results() {
    let baseline = engine();
    baseline.index_items(vec![
        article("a", "First", "rust"),
        article("b", "Second", "rust rust"),
    ]);
    let expected = baseline.search(&Query::new("rust")).results;

    let engine = enhanced_engine(MockEnhancer::failing());
    let response = engine.search(&Query::new("rust"));

    assert!(response.ai_insights.is_none());
    assert_eq!(response.results, expected);
    assert_eq!(engine.stats().enhancement_failures, 1);
}

#[test]
fn test_slow_enhancer_abandoned() {
    let engine = enhanced_engine(MockEnhancer::new().with_delay(Duration::from_secs(2)));
    let response = engine.search(&Query::new("rust"));

    assert!(response.ai_insights.is_none());
    assert_eq!(response.total, 2);
    assert_eq!(engine.stats().enhancement_failures, 1);
}

#[test]
fn test_hung_enhancer_does_not_pile_up_workers() {
    let mock = Arc::new(MockEnhancer::new().with_delay(Duration::from_secs(3)));
    let engine = SearchEngine::builder()
        .with_config(
            SearchConfig::default()
                .with_enhancement_timeout(Duration::from_millis(5))
                .with_max_inflight_enhancements(1),
        )
        .with_enhancer(mock.clone())
        .build()
        .unwrap();
    engine.index_items(vec![article("a", "First", "rust")]);

    for i in 0..30 {
        let response = engine.search(&Query::new(format!("rust {}", i)));
        assert_eq!(response.total, 1);
        assert!(response.ai_insights.is_none());
    }
    assert_eq!(engine.stats().enhancement_failures, 30);

    // The single worker may still be starting up
    for _ in 0..200 {
        if mock.calls() > 0 {
            break;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    assert_eq!(mock.calls(), 1, "only one worker may be started while it hangs");
}

#[test]
fn test_panicking_enhancer_contained() {
    let engine = enhanced_engine(MockEnhancer::panicking());
    let response = engine.search(&Query::new("rust"));
    assert_eq!(response.total, 2);
    assert!(response.ai_insights.is_none());
}

#[test]
fn test_enhancer_reorders_page() {
    let plain = enhanced_engine(MockEnhancer::failing());
    let base: Vec<_> = plain
        .search(&Query::new("rust"))
        .results
        .into_iter()
        .map(|r| r.item.id)
        .collect();

    let engine = enhanced_engine(MockEnhancer::new().reversing());
    let mut reordered: Vec<_> = ids(&engine, &Query::new("rust"));
    reordered.reverse();
    assert_eq!(reordered, base);
}

// ============================================================================
// History
// ============================================================================

#[test]
fn test_history_and_analytics() {
    let engine = engine();
    engine.index_items(vec![article("a", "Rust", "rust")]);

    engine.search(&Query::new("rust"));
    engine.search(&Query::new("Rust"));
    engine.search(&Query::new("cobol"));
    assert!(engine.record_click("rust", "a"));

    let popular = engine.popular_queries(5);
    assert_eq!(popular[0].query, "rust");
    assert_eq!(popular[0].count, 2);

    let recent = engine.recent_searches(1);
    assert_eq!(recent[0].query, "cobol");
    assert_eq!(recent[0].session_id, "test-session");

    let analytics = engine.analytics();
    assert_eq!(analytics.total_searches, 3);
    assert_eq!(analytics.unique_queries, 2);
    assert_eq!(analytics.zero_result_searches, 1);
    assert_eq!(analytics.cache_misses, 3);
    assert!(analytics.click_through_rate > 0.0);

    engine.clear_history();
    assert!(engine.recent_searches(10).is_empty());
}

#[test]
fn test_history_structures_stay_bounded() {
    let engine = SearchEngine::builder()
        .with_config(
            SearchConfig::default()
                .with_history_capacity(3)
                .with_popularity_capacity(10),
        )
        .build()
        .unwrap();

    for i in 0..500 {
        engine.search(&Query::new(format!("query number {}", i)));
    }

    assert_eq!(engine.recent_searches(usize::MAX).len(), 3);
    assert_eq!(engine.popular_queries(usize::MAX).len(), 10);
    assert_eq!(engine.analytics().unique_queries, 10);
}

#[test]
fn test_popular_queries_suggested() {
    let engine = engine();
    engine.index_items(vec![article("a", "React", "react hooks guide")]);
    engine.search(&Query::new("react hooks"));

    let response = engine.search(&Query::new("react"));
    assert_eq!(response.suggestions.first().map(String::as_str), Some("react hooks"));
}

#[test]
fn test_history_persisted_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let store: Arc<dyn HistoryStore> = Arc::new(FileHistoryStore::open(dir.path()).unwrap());

    let first = SearchEngine::builder()
        .with_history_store(Arc::clone(&store))
        .build()
        .unwrap();
    first.search(&Query::new("rust"));
    first.search(&Query::new("rust"));
    drop(first);

    let second = SearchEngine::builder()
        .with_history_store(store)
        .build()
        .unwrap();
    let popular = second.popular_queries(1);
    assert_eq!(popular[0].query, "rust");
    assert_eq!(popular[0].count, 2);
}

#[test]
fn test_unreadable_history_starts_empty() {
    let store = Arc::new(MemoryHistoryStore::new());
    store.set_raw("search-history", "not json");

    let engine = SearchEngine::builder()
        .with_history_store(store)
        .build()
        .expect("a corrupt store must not prevent startup");
    assert!(engine.recent_searches(10).is_empty());
}
