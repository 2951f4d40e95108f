//! `suggest_topic_key` tool — derive the canonical topic key a `save`
//! call would need to target the same upsert slot (spec.md §4.1 topic-key
//! upsert, §6.1).

use serde::Deserialize;
use serde_json::Value;

pub fn schema() -> Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "type": {"type": "string"},
            "title": {"type": "string"},
            "project": {"type": "string"}
        },
        "required": ["type", "title"]
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
struct SuggestTopicKeyArgs {
    #[serde(rename = "type")]
    kind: String,
    title: String,
    project: Option<String>,
}

pub fn execute(args: Option<Value>) -> Result<String, String> {
    let args: SuggestTopicKeyArgs = match args {
        Some(v) => serde_json::from_value(v).map_err(|e| format!("invalid arguments: {e}"))?,
        None => return Err("'type' and 'title' are required".to_string()),
    };

    if args.kind.trim().is_empty() || args.title.trim().is_empty() {
        return Err("'type' and 'title' must not be empty".to_string());
    }

    let topic_key = sdd_memory_core::util::suggest_topic_key(&args.kind, &args.title, args.project.as_deref());
    Ok(topic_key)
}
