//! End-to-end journey: save, search, update, and delete an observation
//! across its full lifecycle, including the topic-key upsert and
//! dedup-window concrete scenarios (spec.md §8).

use sdd_memory_core::{AddObservationParams, ListFilters, QueryEngine, Scope, UpdateObservationFields};

#[test]
fn lifecycle_save_search_update_delete() {
    let dir = tempfile::TempDir::new().unwrap();
    let storage = std::sync::Arc::new(
        sdd_memory_core::Storage::open_at(dir.path().join("t.db"), sdd_memory_core::StoreConfig::default()).unwrap(),
    );
    let query = QueryEngine::new(storage.clone());

    let id = storage
        .add_observation(AddObservationParams {
            session_id: None,
            kind: "decision".to_string(),
            title: "Auth model".to_string(),
            content: "v1".to_string(),
            project: Some("alpha".to_string()),
            scope: Scope::Project,
            namespace: None,
            topic_key: Some("architecture/auth".to_string()),
        })
        .unwrap();

    // Topic-key upsert: saving the same key again replaces content in
    // place and bumps revision_count instead of accumulating a row.
    let id2 = storage
        .add_observation(AddObservationParams {
            session_id: None,
            kind: "decision".to_string(),
            title: "Auth model".to_string(),
            content: "v2".to_string(),
            project: Some("alpha".to_string()),
            scope: Scope::Project,
            namespace: None,
            topic_key: Some("architecture/auth".to_string()),
        })
        .unwrap();
    assert_eq!(id, id2);

    let mut filters = ListFilters { project: Some("alpha".to_string()), ..Default::default() };
    filters.limit = 10;
    let found = query.search("auth", &filters).unwrap();
    assert_eq!(found.len(), 1);
    assert!(found[0].content.contains("v2"));
    assert_eq!(found[0].revision_count, 2);

    // Update a field and confirm the round trip survives.
    storage
        .update_observation(id, UpdateObservationFields { content: Some("v3".to_string()), ..Default::default() })
        .unwrap();
    let observation = storage.get_observation(id).unwrap();
    assert_eq!(observation.content, "v3");
    assert_eq!(observation.revision_count, 3);

    // Soft-delete hides it from default search, include_deleted reveals it.
    storage.delete_observation(id, false).unwrap();
    let hidden = query.search("auth", &filters).unwrap();
    assert!(hidden.is_empty());
    let mut include_deleted = filters.clone();
    include_deleted.include_deleted = true;
    let revealed = query.search("auth", &include_deleted).unwrap();
    assert_eq!(revealed.len(), 1);
}

#[test]
fn dedup_window_returns_same_id_for_matching_saves() {
    let dir = tempfile::TempDir::new().unwrap();
    let storage =
        sdd_memory_core::Storage::open_at(dir.path().join("t.db"), sdd_memory_core::StoreConfig::default()).unwrap();

    let params = || AddObservationParams {
        session_id: None,
        kind: "note".to_string(),
        title: "t".to_string(),
        content: "c".to_string(),
        project: Some("p".to_string()),
        scope: Scope::Project,
        namespace: None,
        topic_key: None,
    };

    let first = storage.add_observation(params()).unwrap();
    let second = storage.add_observation(params()).unwrap();
    assert_eq!(first, second);

    let query = QueryEngine::new(std::sync::Arc::new(storage));
    let mut filters = ListFilters { project: Some("p".to_string()), ..Default::default() };
    filters.limit = 10;
    let rows = query.context(&filters).unwrap();
    assert_eq!(rows.len(), 1);
}
