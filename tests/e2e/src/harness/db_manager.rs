//! Test Database Manager
//!
//! Provides isolated `Storage` instances for journey tests: temporary
//! databases that clean up on drop, plus a couple of seeding helpers so
//! journeys don't each hand-roll `AddObservationParams` boilerplate.

use sdd_memory_core::{AddObservationParams, Scope, Storage, StoreConfig};
use std::path::PathBuf;
use tempfile::TempDir;

/// Manager for test databases.
///
/// Creates an isolated `Storage` per test to prevent interference, and
/// cleans up the backing temp directory when dropped.
pub struct TestDatabaseManager {
    pub storage: Storage,
    _temp_dir: TempDir,
    db_path: PathBuf,
}

impl TestDatabaseManager {
    /// Create a new test database in a temporary directory.
    pub fn new_temp() -> Self {
        let temp_dir = TempDir::new().expect("create temp dir");
        let db_path = temp_dir.path().join("test_sdd_memory.db");
        let storage = Storage::open_at(&db_path, StoreConfig::default()).expect("open test storage");

        Self { storage, _temp_dir: temp_dir, db_path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.db_path
    }

    pub fn is_empty(&self) -> bool {
        self.storage
            .export()
            .map(|snapshot| snapshot.observations.is_empty())
            .unwrap_or(true)
    }

    /// Seed `count` plain observations in the given project, returning
    /// their ids in insertion order.
    pub fn seed_observations(&self, project: &str, count: usize) -> Vec<i64> {
        (0..count)
            .map(|i| {
                self.storage
                    .add_observation(AddObservationParams {
                        session_id: None,
                        kind: "discovery".to_string(),
                        title: format!("Observation {i}"),
                        content: format!("Test observation content {i}"),
                        project: Some(project.to_string()),
                        scope: Scope::Project,
                        namespace: None,
                        topic_key: None,
                    })
                    .expect("seed observation")
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_database_starts_empty() {
        let db = TestDatabaseManager::new_temp();
        assert!(db.is_empty());
        assert!(db.path().exists());
    }

    #[test]
    fn seed_observations_creates_distinct_ids() {
        let db = TestDatabaseManager::new_temp();
        let ids = db.seed_observations("alpha", 5);
        assert_eq!(ids.len(), 5);
        assert!(!db.is_empty());
    }
}
