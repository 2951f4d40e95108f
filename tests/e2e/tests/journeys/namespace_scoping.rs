//! End-to-end journey: namespace scoping isolates one agent's
//! observations from another's within the same project, while leaving
//! an un-namespaced query able to see everything (spec.md §4.7, §8).

use sdd_memory_core::{AddObservationParams, ListFilters, QueryEngine, Scope, Storage, StoreConfig};

#[test]
fn namespace_filter_isolates_observations_within_a_project() {
    let dir = tempfile::TempDir::new().unwrap();
    let storage = std::sync::Arc::new(Storage::open_at(dir.path().join("t.db"), StoreConfig::default()).unwrap());
    let query = QueryEngine::new(storage.clone());

    storage
        .add_observation(AddObservationParams {
            session_id: None,
            kind: "discovery".to_string(),
            title: "X".to_string(),
            content: "content x".to_string(),
            project: Some("p".to_string()),
            scope: Scope::Project,
            namespace: Some("subagent/a".to_string()),
            topic_key: None,
        })
        .unwrap();
    storage
        .add_observation(AddObservationParams {
            session_id: None,
            kind: "discovery".to_string(),
            title: "Y".to_string(),
            content: "content y".to_string(),
            project: Some("p".to_string()),
            scope: Scope::Project,
            namespace: Some("subagent/b".to_string()),
            topic_key: None,
        })
        .unwrap();

    let mut filters = ListFilters {
        project: Some("p".to_string()),
        namespace: Some("subagent/a".to_string()),
        ..Default::default()
    };
    filters.limit = 10;
    let scoped = query.search("", &filters).unwrap();
    assert_eq!(scoped.len(), 1);
    assert_eq!(scoped[0].title, "X");

    let mut unscoped = ListFilters { project: Some("p".to_string()), ..Default::default() };
    unscoped.limit = 10;
    let all = query.search("", &unscoped).unwrap();
    assert_eq!(all.len(), 2);
}

#[test]
fn personal_scope_is_distinct_from_project_scope() {
    let dir = tempfile::TempDir::new().unwrap();
    let storage = Storage::open_at(dir.path().join("t.db"), StoreConfig::default()).unwrap();

    let shared = storage
        .add_observation(AddObservationParams {
            session_id: None,
            kind: "discovery".to_string(),
            title: "Shared note".to_string(),
            content: "visible to the team".to_string(),
            project: Some("p".to_string()),
            scope: Scope::Project,
            namespace: None,
            topic_key: None,
        })
        .unwrap();
    let personal = storage
        .add_observation(AddObservationParams {
            session_id: None,
            kind: "discovery".to_string(),
            title: "Personal note".to_string(),
            content: "only for me".to_string(),
            project: Some("p".to_string()),
            scope: Scope::Personal,
            namespace: None,
            topic_key: None,
        })
        .unwrap();

    assert_ne!(shared, personal);
    assert_eq!(storage.get_observation(shared).unwrap().scope, Scope::Project);
    assert_eq!(storage.get_observation(personal).unwrap().scope, Scope::Personal);
}
