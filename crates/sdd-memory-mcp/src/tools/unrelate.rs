//! `unrelate` tool — remove a relation by id (spec.md §4.3, §6.1).

use sdd_memory_core::GraphEngine;
use serde::Deserialize;
use serde_json::Value;

pub fn schema() -> Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "id": {"type": "integer"}
        },
        "required": ["id"]
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
struct UnrelateArgs {
    id: i64,
}

pub fn execute(graph_engine: &GraphEngine, args: Option<Value>) -> Result<String, String> {
    let args: UnrelateArgs = match args {
        Some(v) => serde_json::from_value(v).map_err(|e| format!("invalid arguments: {e}"))?,
        None => return Err("'id' is required".to_string()),
    };

    graph_engine.remove_relation(args.id).map_err(|e| e.user_message())?;
    Ok(format!("Removed relation #{}", args.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdd_memory_core::{AddObservationParams, Scope, Storage, StoreConfig};
    use std::sync::Arc;

    fn engine() -> (GraphEngine, Arc<Storage>, tempfile::TempDir) {
        let dir = tempfile::TempDir::new().unwrap();
        let storage = Arc::new(Storage::open_at(dir.path().join("t.db"), StoreConfig::default()).unwrap());
        (GraphEngine::new(storage.clone()), storage, dir)
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
    fn missing_id_is_invalid() {
        let (engine, _storage, _dir) = engine();
        assert!(execute(&engine, None).is_err());
    }

    #[test]
    fn removes_existing_relation() {
        let (engine, storage, _dir) = engine();
        let a = add(&storage, "A");
        let b = add(&storage, "B");
        let ids = engine.add_relation(a, b, "relates_to", None, false).unwrap();
        let args = serde_json::json!({"id": ids[0]});
        let result = execute(&engine, Some(args)).unwrap();
        assert!(result.starts_with("Removed relation"));
        assert!(engine.get_relations(a).unwrap().is_empty());
    }
}
