//! `save_prompt` tool — captures a user's verbatim ask (spec.md §3 UserPrompt, §6.1).

use sdd_memory_core::{MANUAL_SAVE_SESSION, Storage};
use serde::Deserialize;
use serde_json::Value;

pub fn schema() -> Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "text": {"type": "string", "description": "The user's verbatim request."},
            "session_id": {"type": "string", "default": "manual-save"},
            "namespace": {"type": "string"}
        },
        "required": ["text"]
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
struct SavePromptArgs {
    text: String,
    session_id: Option<String>,
    namespace: Option<String>,
}

pub fn execute(storage: &Storage, args: Option<Value>) -> Result<String, String> {
    let args: SavePromptArgs = match args {
        Some(v) => serde_json::from_value(v).map_err(|e| format!("invalid arguments: {e}"))?,
        None => return Err("'text' is required".to_string()),
    };

    let session_id = args.session_id.unwrap_or_else(|| MANUAL_SAVE_SESSION.to_string());
    let id = storage
        .save_prompt(&session_id, &args.text, args.namespace.as_deref())
        .map_err(|e| e.user_message())?;
    Ok(format!("Saved prompt #{id}\n\n{}", sdd_memory_core::token_footer(sdd_memory_core::estimate_tokens(&args.text))))
}
