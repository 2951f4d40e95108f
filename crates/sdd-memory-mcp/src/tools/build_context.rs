//! `build_context` tool — breadth-first traversal of the relation graph
//! around a root observation (spec.md §4.3, §6.1).

use sdd_memory_core::GraphEngine;
use serde::Deserialize;
use serde_json::Value;
use std::fmt::Write as _;

pub fn schema() -> Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "observation_id": {"type": "integer"},
            "depth": {"type": "integer", "default": 2, "description": "Clamped to [1, 5]."}
        },
        "required": ["observation_id"]
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
struct BuildContextArgs {
    observation_id: i64,
    depth: Option<i64>,
}

pub fn execute(graph_engine: &GraphEngine, args: Option<Value>) -> Result<String, String> {
    let args: BuildContextArgs = match args {
        Some(v) => serde_json::from_value(v).map_err(|e| format!("invalid arguments: {e}"))?,
        None => return Err("'observation_id' is required".to_string()),
    };

    let result = graph_engine.build_context(args.observation_id, args.depth.unwrap_or(2)).map_err(|e| e.user_message())?;

    let mut out = String::new();
    let _ = writeln!(out, "#{} [{}] {}", result.root.id, result.root.kind, result.root.title);
    let _ = writeln!(out, "{} connected node(s), max depth reached {}", result.total_nodes, result.max_depth_reached);
    for node in &result.connected {
        let arrow = match node.direction {
            sdd_memory_core::Direction::Outgoing => "->",
            sdd_memory_core::Direction::Incoming => "<-",
        };
        let _ = writeln!(out, "  {arrow} [{}] #{} [{}] {} (depth {})", node.relation_type, node.id, node.kind, node.title, node.depth);
    }
    let footer = sdd_memory_core::token_footer(sdd_memory_core::estimate_tokens(&out));
    let _ = write!(out, "\n{footer}");
    Ok(out)
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
    fn missing_observation_id_is_invalid() {
        let (engine, _storage, _dir) = engine();
        assert!(execute(&engine, None).is_err());
    }

    #[test]
    fn unknown_root_is_not_found() {
        let (engine, _storage, _dir) = engine();
        let args = serde_json::json!({"observation_id": 1});
        assert!(execute(&engine, Some(args)).is_err());
    }

    #[test]
    fn traverses_connected_nodes() {
        let (engine, storage, _dir) = engine();
        let a = add(&storage, "A");
        let b = add(&storage, "B");
        engine.add_relation(a, b, "relates_to", None, false).unwrap();
        let args = serde_json::json!({"observation_id": a});
        let result = execute(&engine, Some(args)).unwrap();
        assert!(result.contains("A"));
        assert!(result.contains("B"));
    }
}
