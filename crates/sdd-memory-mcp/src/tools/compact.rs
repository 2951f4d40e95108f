//! `compact` tool — list stale-observation candidates, or soft-delete a
//! chosen set and fold them into one summary observation (spec.md §4.2
//! compaction, §6.1).

use sdd_memory_core::{shaper, DetailLevel, QueryEngine, MANUAL_SAVE_SESSION};
use serde::Deserialize;
use serde_json::Value;

pub fn schema() -> Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "older_than_days": {"type": "integer", "default": 90},
            "namespace": {"type": "string"},
            "max": {"type": "integer", "default": 50},
            "compact_ids": {"type": "array", "items": {"type": "integer"}, "description": "Provide to execute compaction on exactly these ids; omit to only list candidates."},
            "summary_title": {"type": "string"},
            "summary_content": {"type": "string"},
            "session_id": {"type": "string", "default": "manual-save"}
        }
    })
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
struct CompactArgs {
    older_than_days: Option<i64>,
    namespace: Option<String>,
    max: Option<usize>,
    compact_ids: Option<Vec<i64>>,
    summary_title: Option<String>,
    summary_content: Option<String>,
    session_id: Option<String>,
}

pub fn execute(query_engine: &QueryEngine, args: Option<Value>) -> Result<String, String> {
    let args: CompactArgs = match args {
        Some(v) => serde_json::from_value(v).map_err(|e| format!("invalid arguments: {e}"))?,
        None => CompactArgs::default(),
    };

    match args.compact_ids {
        Some(ids) => {
            let session_id = args.session_id.unwrap_or_else(|| MANUAL_SAVE_SESSION.to_string());
            let result = query_engine
                .compact_execute(&ids, args.summary_title.as_deref(), args.summary_content.as_deref(), &session_id)
                .map_err(|e| e.user_message())?;
            let summary_note = match result.summary_observation_id {
                Some(id) => format!(" Summary observation #{id} recorded."),
                None => String::new(),
            };
            Ok(format!("Compacted {} observation(s): {:?}.{summary_note}", result.compacted_ids.len(), result.compacted_ids))
        }
        None => {
            let older_than_days = args.older_than_days.unwrap_or(90);
            let max = args.max.unwrap_or(50);
            let candidates = query_engine
                .compact_candidates(older_than_days, args.namespace.as_deref(), max)
                .map_err(|e| e.user_message())?;
            if candidates.is_empty() {
                return Ok(format!("No compaction candidates.\n\n{}", sdd_memory_core::token_footer(0)));
            }
            let rendered = candidates
                .iter()
                .map(|o| shaper::render_observation(o, DetailLevel::Summary))
                .collect::<Vec<_>>()
                .join("\n");
            Ok(format!("{rendered}\n\nPass these ids back under `ids` to execute compaction."))
        }
    }
}
