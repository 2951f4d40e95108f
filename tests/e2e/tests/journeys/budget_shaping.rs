//! End-to-end journey: the response shaper's token-budget behavior
//! against a realistic set of observations (spec.md §4.4, §8).

use sdd_memory_core::{shaper, AddObservationParams, DetailLevel, ListFilters, QueryEngine, Scope, Storage, StoreConfig};
use std::sync::Arc;

fn seeded_storage(count: usize) -> (Arc<Storage>, tempfile::TempDir) {
    let dir = tempfile::TempDir::new().unwrap();
    let storage = Arc::new(Storage::open_at(dir.path().join("t.db"), StoreConfig::default()).unwrap());
    for i in 0..count {
        storage
            .add_observation(AddObservationParams {
                session_id: None,
                kind: "discovery".to_string(),
                title: format!("Finding {i}"),
                content: "x".repeat(200),
                project: Some("alpha".to_string()),
                scope: Scope::Project,
                namespace: None,
                topic_key: None,
            })
            .unwrap();
    }
    (storage, dir)
}

#[test]
fn context_with_many_items_and_small_budget_is_capped() {
    let (storage, _dir) = seeded_storage(200);
    let query = QueryEngine::new(storage.clone());
    let mut filters = ListFilters { project: Some("alpha".to_string()), ..Default::default() };
    filters.limit = 200;
    let observations = query.context(&filters).unwrap();
    assert_eq!(observations.len(), 200);

    let rendered = shaper::build_incremental(&observations, DetailLevel::Full, 500, 0);
    assert!(rendered.contains("⚡ Budget-capped"));
    assert!(rendered.contains("~") && rendered.contains("tokens"));

    let estimated = sdd_memory_core::estimate_tokens(&rendered);
    assert!(estimated <= 500 + 20, "shaped response should respect the budget plus a small footer slack");
}

#[test]
fn context_returns_recent_first_ordering() {
    let (storage, _dir) = seeded_storage(10);
    let query = QueryEngine::new(storage.clone());
    let mut filters = ListFilters { project: Some("alpha".to_string()), ..Default::default() };
    filters.limit = 10;
    let observations = query.context(&filters).unwrap();

    assert_eq!(observations.len(), 10);
    let timestamps: Vec<_> = observations.iter().map(|o| o.created_at).collect();
    let mut sorted = timestamps.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(timestamps, sorted, "context() must order recency-first");
}

#[test]
fn unbounded_budget_never_caps() {
    let (storage, _dir) = seeded_storage(20);
    let query = QueryEngine::new(storage.clone());
    let mut filters = ListFilters { project: Some("alpha".to_string()), ..Default::default() };
    filters.limit = 20;
    let observations = query.context(&filters).unwrap();
    let rendered = shaper::build_incremental(&observations, DetailLevel::Standard, 0, 0);
    assert!(!rendered.contains("Budget-capped"));
}
