//! `get_observation` tool — fetch a single observation by id, full detail
//! (spec.md §6.1).

use sdd_memory_core::{shaper, DetailLevel, GraphEngine, Storage};
use serde::Deserialize;
use serde_json::Value;
use std::fmt::Write as _;

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
struct GetObservationArgs {
    id: i64,
}

/// Renders the "Relations" section — outgoing / incoming — omitted
/// entirely when the observation has no edges (spec.md §6.1).
fn render_relations(storage: &Storage, graph: &GraphEngine, id: i64) -> Result<String, String> {
    let relations = graph.get_relations(id).map_err(|e| e.user_message())?;
    if relations.is_empty() {
        return Ok(String::new());
    }

    let mut outgoing = Vec::new();
    let mut incoming = Vec::new();
    for relation in relations {
        let (other_id, bucket) = if relation.from_id == id {
            (relation.to_id, &mut outgoing)
        } else {
            (relation.from_id, &mut incoming)
        };
        let title = storage.get_observation(other_id).map(|o| o.title).unwrap_or_else(|_| "<deleted>".to_string());
        bucket.push(format!("  -[{}]-> #{other_id} {title}", relation.kind));
    }

    let mut out = String::from("\n\nRelations:");
    if !outgoing.is_empty() {
        let _ = write!(out, "\n  Outgoing:\n{}", outgoing.join("\n"));
    }
    if !incoming.is_empty() {
        let _ = write!(out, "\n  Incoming:\n{}", incoming.join("\n"));
    }
    Ok(out)
}

pub fn execute(storage: &Storage, graph: &GraphEngine, args: Option<Value>) -> Result<String, String> {
    let args: GetObservationArgs = match args {
        Some(v) => serde_json::from_value(v).map_err(|e| format!("invalid arguments: {e}"))?,
        None => return Err("'id' is required".to_string()),
    };

    let observation = storage.get_observation(args.id).map_err(|e| e.user_message())?;
    let body = shaper::render_observation(&observation, DetailLevel::Full);
    let relations = render_relations(storage, graph, args.id)?;
    Ok(format!("{body}{relations}"))
}
