//! `session_start`, `session_end`, `session_summary` tools — the
//! session lifecycle around the always-present `manual-save` session
//! (spec.md §4.6, §6.1).

use sdd_memory_core::SessionLifecycle;
use serde::Deserialize;
use serde_json::Value;

pub fn start_schema() -> Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "project": {"type": "string"},
            "workspace": {"type": "string"}
        }
    })
}

pub fn end_schema() -> Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "session_id": {"type": "string"}
        },
        "required": ["session_id"]
    })
}

pub fn summary_schema() -> Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "session_id": {"type": "string"},
            "content": {"type": "string"}
        },
        "required": ["session_id", "content"]
    })
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
struct StartArgs {
    project: Option<String>,
    workspace: Option<String>,
}

pub fn start(lifecycle: &SessionLifecycle, args: Option<Value>) -> Result<String, String> {
    let args: StartArgs = match args {
        Some(v) => serde_json::from_value(v).map_err(|e| format!("invalid arguments: {e}"))?,
        None => StartArgs::default(),
    };
    let session = lifecycle.start(args.project.as_deref(), args.workspace.as_deref()).map_err(|e| e.user_message())?;
    Ok(format!("Started session {}", session.id))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
struct EndArgs {
    session_id: String,
}

pub fn end(lifecycle: &SessionLifecycle, args: Option<Value>) -> Result<String, String> {
    let args: EndArgs = match args {
        Some(v) => serde_json::from_value(v).map_err(|e| format!("invalid arguments: {e}"))?,
        None => return Err("'session_id' is required".to_string()),
    };
    lifecycle.end(&args.session_id).map_err(|e| e.user_message())?;
    Ok(format!("Ended session {}", args.session_id))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
struct SummaryArgs {
    session_id: String,
    content: String,
}

pub fn summary(lifecycle: &SessionLifecycle, args: Option<Value>) -> Result<String, String> {
    let args: SummaryArgs = match args {
        Some(v) => serde_json::from_value(v).map_err(|e| format!("invalid arguments: {e}"))?,
        None => return Err("'session_id' and 'content' are required".to_string()),
    };
    let id = lifecycle.summary(&args.session_id, &args.content).map_err(|e| e.user_message())?;
    Ok(format!("Recorded summary as observation #{id} for session {}", args.session_id))
}
