//! `update` tool — partial update of an existing observation. `project`
//! and `topic_key` are nullable-settable: omit the key to leave it
//! alone, send `null` to clear it, send a value to replace it
//! (spec.md §4.1, §6.1).

use sdd_memory_core::{Scope, Storage, UpdateObservationFields};
use serde_json::Value;

use super::common::parse_scope;

pub fn schema() -> Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "id": {"type": "integer"},
            "title": {"type": "string"},
            "content": {"type": "string"},
            "type": {"type": "string"},
            "project": {"type": ["string", "null"], "description": "Send null to clear."},
            "topic_key": {"type": ["string", "null"], "description": "Send null to clear."},
            "scope": {"type": "string", "enum": ["project", "personal"]}
        },
        "required": ["id"]
    })
}

fn nullable_field(obj: &serde_json::Map<String, Value>, key: &str) -> Result<Option<Option<String>>, String> {
    match obj.get(key) {
        None => Ok(None),
        Some(Value::Null) => Ok(Some(None)),
        Some(Value::String(s)) => Ok(Some(Some(s.clone()))),
        Some(_) => Err(format!("'{key}' must be a string or null")),
    }
}

fn string_field(obj: &serde_json::Map<String, Value>, key: &str) -> Result<Option<String>, String> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(format!("'{key}' must be a string")),
    }
}

pub fn execute(storage: &Storage, args: Option<Value>) -> Result<String, String> {
    let obj = match args {
        Some(Value::Object(obj)) => obj,
        Some(_) => return Err("arguments must be an object".to_string()),
        None => return Err("'id' is required".to_string()),
    };

    let id = obj
        .get("id")
        .and_then(Value::as_i64)
        .ok_or_else(|| "'id' is required".to_string())?;

    let scope = match obj.get("scope") {
        None => None,
        Some(Value::String(s)) => parse_scope(Some(s))?,
        Some(_) => return Err("'scope' must be a string".to_string()),
    };

    let fields = UpdateObservationFields {
        title: string_field(&obj, "title")?,
        content: string_field(&obj, "content")?,
        kind: string_field(&obj, "type")?,
        project: nullable_field(&obj, "project")?,
        topic_key: nullable_field(&obj, "topic_key")?,
        scope,
    };

    storage.update_observation(id, fields).map_err(|e| e.user_message())?;
    Ok(format!("Updated observation #{id}"))
}
