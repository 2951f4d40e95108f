//! `save` tool — AddObservation (spec.md §4.1, §6.1).

use sdd_memory_core::{AddObservationParams, MANUAL_SAVE_SESSION, Scope, Storage};
use serde::Deserialize;
use serde_json::Value;

use super::common::parse_scope;

pub fn schema() -> Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "type": {"type": "string", "description": "Observation type, e.g. decision, architecture, bugfix, pattern, config, discovery, learning."},
            "title": {"type": "string", "description": "Short, searchable title."},
            "content": {"type": "string", "description": "Free text body, truncated to the configured maximum length."},
            "project": {"type": "string"},
            "scope": {"type": "string", "enum": ["project", "personal"], "default": "project"},
            "namespace": {"type": "string", "description": "Isolation boundary for a sub-agent's observations."},
            "topic_key": {"type": "string", "description": "When present, drives upsert: at most one live observation per (topic_key, project, scope)."},
            "session_id": {"type": "string", "default": "manual-save"}
        },
        "required": ["type", "title", "content"]
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
struct SaveArgs {
    #[serde(rename = "type")]
    kind: String,
    title: String,
    content: String,
    project: Option<String>,
    scope: Option<String>,
    namespace: Option<String>,
    topic_key: Option<String>,
    session_id: Option<String>,
}

pub fn execute(storage: &Storage, args: Option<Value>) -> Result<String, String> {
    let args: SaveArgs = match args {
        Some(v) => serde_json::from_value(v).map_err(|e| format!("invalid arguments: {e}"))?,
        None => return Err("'type', 'title', and 'content' are required".to_string()),
    };

    let scope = parse_scope(args.scope.as_deref())?.unwrap_or(Scope::Project);
    let id = storage
        .add_observation(AddObservationParams {
            session_id: Some(args.session_id.unwrap_or_else(|| MANUAL_SAVE_SESSION.to_string())),
            kind: args.kind,
            title: args.title,
            content: args.content,
            project: args.project,
            scope,
            namespace: args.namespace,
            topic_key: args.topic_key,
        })
        .map_err(|e| e.user_message())?;

    let observation = storage.get_observation(id).map_err(|e| e.user_message())?;
    let revision_note = if observation.revision_count > 1 {
        format!(" (revision {})", observation.revision_count)
    } else {
        String::new()
    };
    Ok(format!(
        "Saved observation #{id}{revision_note}\n\n{}",
        sdd_memory_core::token_footer(sdd_memory_core::estimate_tokens(&observation.content))
    ))
}
