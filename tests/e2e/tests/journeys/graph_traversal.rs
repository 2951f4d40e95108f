//! End-to-end journey: relate observations into a graph and traverse it
//! with `GraphEngine::build_context`, including the cycle and cascade
//! concrete scenarios (spec.md §8).

use sdd_memory_core::{AddObservationParams, GraphEngine, Scope, Storage, StoreConfig};
use std::sync::Arc;

fn storage() -> (Arc<Storage>, tempfile::TempDir) {
    let dir = tempfile::TempDir::new().unwrap();
    let storage = Arc::new(Storage::open_at(dir.path().join("t.db"), StoreConfig::default()).unwrap());
    (storage, dir)
}

fn add(storage: &Storage, title: &str) -> i64 {
    storage
        .add_observation(AddObservationParams {
            session_id: None,
            kind: "decision".to_string(),
            title: title.to_string(),
            content: "content".to_string(),
            project: Some("alpha".to_string()),
            scope: Scope::Project,
            namespace: None,
            topic_key: None,
        })
        .unwrap()
}

#[test]
fn graph_cycle_visits_each_node_once_at_depth_one() {
    let (storage, _dir) = storage();
    let graph = GraphEngine::new(storage.clone());

    let a = add(&storage, "A");
    let b = add(&storage, "B");
    let c = add(&storage, "C");
    graph.add_relation(a, b, "relates_to", None, false).unwrap();
    graph.add_relation(b, c, "relates_to", None, false).unwrap();
    graph.add_relation(c, a, "relates_to", None, false).unwrap();

    let result = graph.build_context(a, 5).unwrap();
    assert_eq!(result.total_nodes, 2);
    assert_eq!(result.connected.len(), 2);
    assert!(result.connected.iter().all(|n| n.depth == 1));
    let ids: std::collections::HashSet<i64> = result.connected.iter().map(|n| n.id).collect();
    assert_eq!(ids, std::collections::HashSet::from([b, c]));
}

#[test]
fn hard_delete_cascades_relation_removal() {
    let (storage, _dir) = storage();
    let graph = GraphEngine::new(storage.clone());

    let a = add(&storage, "A");
    let b = add(&storage, "B");
    graph.add_relation(a, b, "relates_to", None, true).unwrap();

    storage.delete_observation(a, true).unwrap();

    assert!(graph.get_relations(b).unwrap().is_empty());
    assert!(storage.get_observation(a).is_err());
}

#[test]
fn soft_delete_preserves_edges_but_hides_from_search() {
    let (storage, _dir) = storage();
    let graph = GraphEngine::new(storage.clone());

    let a = add(&storage, "Alpha title");
    let b = add(&storage, "B");
    graph.add_relation(a, b, "relates_to", None, false).unwrap();

    storage.delete_observation(a, false).unwrap();

    let context = graph.build_context(b, 2).unwrap();
    assert_eq!(context.connected.len(), 1);
    assert_eq!(context.connected[0].id, a);
    assert_eq!(context.connected[0].direction, sdd_memory_core::Direction::Incoming);

    let query = sdd_memory_core::QueryEngine::new(storage.clone());
    let mut filters = sdd_memory_core::ListFilters { project: Some("alpha".to_string()), ..Default::default() };
    filters.limit = 10;
    assert!(query.search("Alpha title", &filters).unwrap().is_empty());
    filters.include_deleted = true;
    assert_eq!(query.search("Alpha title", &filters).unwrap().len(), 1);
}

#[test]
fn depth_clamps_outside_valid_bounds() {
    let (storage, _dir) = storage();
    let graph = GraphEngine::new(storage.clone());
    let a = add(&storage, "A");
    let b = add(&storage, "B");
    graph.add_relation(a, b, "relates_to", None, false).unwrap();

    // depth=0 clamps to the default (2), still finds the direct neighbor.
    let result = graph.build_context(a, 0).unwrap();
    assert_eq!(result.connected.len(), 1);
}
