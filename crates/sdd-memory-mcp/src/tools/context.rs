//! `context` tool — recency-ordered Context, no text query (spec.md §4.2, §6.1).

use sdd_memory_core::{QueryEngine, shaper};
use serde::Deserialize;
use serde_json::Value;

use super::common::{parse_detail_level, FilterArgs};

pub fn schema() -> Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "project": {"type": "string"},
            "type": {"type": "string"},
            "scope": {"type": "string", "enum": ["project", "personal"]},
            "namespace": {"type": "string"},
            "limit": {"type": "integer", "default": 20},
            "detail_level": {"type": "string", "enum": ["summary", "standard", "full"], "default": "standard"},
            "max_tokens": {"type": "integer", "default": 0}
        }
    })
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
struct ContextArgs {
    #[serde(flatten)]
    filters: FilterArgs,
    detail_level: Option<String>,
    max_tokens: Option<usize>,
}

pub fn execute(query_engine: &QueryEngine, args: Option<Value>) -> Result<String, String> {
    let args: ContextArgs = match args {
        Some(v) => serde_json::from_value(v).map_err(|e| format!("invalid arguments: {e}"))?,
        None => ContextArgs::default(),
    };

    let level = parse_detail_level(args.detail_level.as_deref())?;
    let max_tokens = args.max_tokens.unwrap_or(0);
    let limit = args.filters.limit.unwrap_or(20);
    let mut filters = args.filters.into_list_filters()?;
    filters.limit = limit;

    let results = query_engine.context(&filters).map_err(|e| e.user_message())?;
    if results.is_empty() {
        return Ok(format!("No recent observations.\n\n{}", sdd_memory_core::token_footer(0)));
    }
    Ok(shaper::build_incremental(&results, level, max_tokens, limit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdd_memory_core::{AddObservationParams, Scope, Storage, StoreConfig};
    use std::sync::Arc;

    fn engine() -> (QueryEngine, Arc<Storage>, tempfile::TempDir) {
        let dir = tempfile::TempDir::new().unwrap();
        let storage = Arc::new(Storage::open_at(dir.path().join("t.db"), StoreConfig::default()).unwrap());
        (QueryEngine::new(storage.clone()), storage, dir)
    }

    #[test]
    fn no_args_defaults_cleanly() {
        let (engine, _storage, _dir) = engine();
        let result = execute(&engine, None).unwrap();
        assert!(result.contains("No recent observations"));
    }

    #[test]
    fn returns_recent_observations_newest_first() {
        let (engine, storage, _dir) = engine();
        for title in ["First", "Second"] {
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
                .unwrap();
        }
        let args = serde_json::json!({"project": "alpha"});
        let result = execute(&engine, Some(args)).unwrap();
        assert!(result.find("Second").unwrap() < result.find("First").unwrap());
    }

    #[test]
    fn budget_capping_emits_marker() {
        let (engine, storage, _dir) = engine();
        for i in 0..50 {
            storage
                .add_observation(AddObservationParams {
                    session_id: None,
                    kind: "decision".to_string(),
                    title: format!("Title {i}"),
                    content: "x".repeat(200),
                    project: Some("alpha".to_string()),
                    scope: Scope::Project,
                    namespace: None,
                    topic_key: None,
                })
                .unwrap();
        }
        let args = serde_json::json!({"project": "alpha", "detail_level": "full", "max_tokens": 500});
        let result = execute(&engine, Some(args)).unwrap();
        assert!(result.contains("Budget-capped"));
    }
}
