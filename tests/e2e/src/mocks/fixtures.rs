//! Test Data Factory
//!
//! Builders for realistic `AddObservationParams` scenarios so journey
//! tests read as the story they're exercising rather than a wall of
//! struct literals.

use sdd_memory_core::{observation_types, AddObservationParams, Scope, Storage};

pub struct TestDataFactory;

impl TestDataFactory {
    /// Save a simple observation, returning its id.
    pub fn save(storage: &Storage, project: &str, title: &str, content: &str) -> i64 {
        storage
            .add_observation(AddObservationParams {
                session_id: None,
                kind: observation_types::DISCOVERY.to_string(),
                title: title.to_string(),
                content: content.to_string(),
                project: Some(project.to_string()),
                scope: Scope::Project,
                namespace: None,
                topic_key: None,
            })
            .expect("save observation")
    }

    /// Save an observation of a specific `kind`.
    pub fn save_typed(storage: &Storage, project: &str, kind: &str, title: &str, content: &str) -> i64 {
        storage
            .add_observation(AddObservationParams {
                session_id: None,
                kind: kind.to_string(),
                title: title.to_string(),
                content: content.to_string(),
                project: Some(project.to_string()),
                scope: Scope::Project,
                namespace: None,
                topic_key: None,
            })
            .expect("save observation")
    }

    /// Save an observation upserted by `topic_key`.
    pub fn save_with_topic_key(storage: &Storage, project: &str, topic_key: &str, title: &str, content: &str) -> i64 {
        storage
            .add_observation(AddObservationParams {
                session_id: None,
                kind: observation_types::DECISION.to_string(),
                title: title.to_string(),
                content: content.to_string(),
                project: Some(project.to_string()),
                scope: Scope::Project,
                namespace: None,
                topic_key: Some(topic_key.to_string()),
            })
            .expect("save observation")
    }

    /// Save an observation scoped to a namespace (multi-agent isolation).
    pub fn save_namespaced(storage: &Storage, project: &str, namespace: &str, title: &str, content: &str) -> i64 {
        storage
            .add_observation(AddObservationParams {
                session_id: None,
                kind: observation_types::DISCOVERY.to_string(),
                title: title.to_string(),
                content: content.to_string(),
                project: Some(project.to_string()),
                scope: Scope::Project,
                namespace: Some(namespace.to_string()),
                topic_key: None,
            })
            .expect("save observation")
    }

    /// Generate `count` distinct observation titles/content pairs for
    /// bulk search/budget scenarios.
    pub fn bulk_content(count: usize) -> Vec<(String, String)> {
        (0..count)
            .map(|i| (format!("Bulk observation {i}"), format!("Padding content for observation number {i} to give the shaper something to truncate against repeated filler text.")))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdd_memory_core::{Storage, StoreConfig};
    use tempfile::tempdir;

    fn storage() -> Storage {
        let dir = tempdir().unwrap();
        Storage::open_at(dir.path().join("t.db"), StoreConfig::default()).unwrap()
    }

    #[test]
    fn save_returns_retrievable_id() {
        let storage = storage();
        let id = TestDataFactory::save(&storage, "alpha", "Title", "Content");
        let observation = storage.get_observation(id).unwrap();
        assert_eq!(observation.title, "Title");
    }

    #[test]
    fn bulk_content_is_distinct() {
        let items = TestDataFactory::bulk_content(10);
        assert_eq!(items.len(), 10);
        assert_ne!(items[0].0, items[1].0);
    }
}
