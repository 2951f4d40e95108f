//! `relate` tool — create a typed directed edge between two observations
//! (spec.md §4.3, §6.1).

use sdd_memory_core::GraphEngine;
use serde::Deserialize;
use serde_json::Value;

pub fn schema() -> Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "from_id": {"type": "integer"},
            "to_id": {"type": "integer"},
            "relation_type": {"type": "string", "description": "e.g. relates_to, implements, depends_on, caused_by, supersedes, part_of"},
            "note": {"type": "string"},
            "bidirectional": {"type": "boolean", "default": false}
        },
        "required": ["from_id", "to_id", "relation_type"]
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
struct RelateArgs {
    from_id: i64,
    to_id: i64,
    relation_type: String,
    note: Option<String>,
    #[serde(default)]
    bidirectional: bool,
}

pub fn execute(graph_engine: &GraphEngine, args: Option<Value>) -> Result<String, String> {
    let args: RelateArgs = match args {
        Some(v) => serde_json::from_value(v).map_err(|e| format!("invalid arguments: {e}"))?,
        None => return Err("'from_id', 'to_id' and 'relation_type' are required".to_string()),
    };

    let ids = graph_engine
        .add_relation(args.from_id, args.to_id, &args.relation_type, args.note.as_deref(), args.bidirectional)
        .map_err(|e| e.user_message())?;
    Ok(format!("Created relation(s): {ids:?}"))
}
