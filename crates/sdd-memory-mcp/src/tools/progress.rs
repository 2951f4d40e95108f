//! `progress` tool — a dual read/write document keyed per
//! project+namespace: call with `content` to write, without it to read
//! back the current state (spec.md §4.6, §6.1).

use sdd_memory_core::{shaper, DetailLevel, Storage};
use serde::Deserialize;
use serde_json::Value;

pub fn schema() -> Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "project": {"type": "string"},
            "content": {"type": "string", "description": "Omit to read the current progress document."},
            "namespace": {"type": "string"}
        },
        "required": ["project"]
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
struct ProgressArgs {
    project: String,
    content: Option<String>,
    namespace: Option<String>,
}

pub fn execute(storage: &Storage, args: Option<Value>) -> Result<String, String> {
    let args: ProgressArgs = match args {
        Some(v) => serde_json::from_value(v).map_err(|e| format!("invalid arguments: {e}"))?,
        None => return Err("'project' is required".to_string()),
    };

    let observation = sdd_memory_core::progress(storage, &args.project, args.content.as_deref(), args.namespace.as_deref())
        .map_err(|e| e.user_message())?;

    match observation {
        Some(o) => Ok(shaper::render_observation(&o, DetailLevel::Full)),
        None => Ok(format!("No progress recorded for '{}'.\n\n{}", args.project, sdd_memory_core::token_footer(0))),
    }
}
