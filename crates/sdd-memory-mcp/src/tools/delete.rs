//! `delete` tool — soft delete by default, hard delete on request
//! (spec.md §4.1 delete semantics, §6.1).

use sdd_memory_core::Storage;
use serde::Deserialize;
use serde_json::Value;

pub fn schema() -> Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "id": {"type": "integer"},
            "hard": {"type": "boolean", "default": false, "description": "Permanently remove the row and cascade relation deletion instead of soft-deleting."}
        },
        "required": ["id"]
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
struct DeleteArgs {
    id: i64,
    #[serde(default)]
    hard: bool,
}

pub fn execute(storage: &Storage, args: Option<Value>) -> Result<String, String> {
    let args: DeleteArgs = match args {
        Some(v) => serde_json::from_value(v).map_err(|e| format!("invalid arguments: {e}"))?,
        None => return Err("'id' is required".to_string()),
    };

    storage.delete_observation(args.id, args.hard).map_err(|e| e.user_message())?;
    let verb = if args.hard { "Hard-deleted" } else { "Soft-deleted" };
    Ok(format!("{verb} observation #{}", args.id))
}
