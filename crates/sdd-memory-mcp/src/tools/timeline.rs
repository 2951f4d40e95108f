//! `timeline` tool — chronological neighborhood around an anchor
//! observation, shaped with the post-hoc truncation strategy
//! (spec.md §4.2, §4.4, §6.1).

use sdd_memory_core::{QueryEngine, shaper};
use serde::Deserialize;
use serde_json::Value;

use super::common::parse_detail_level;

pub fn schema() -> Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "observation_id": {"type": "integer"},
            "window_minutes": {"type": "integer", "default": 60},
            "detail_level": {"type": "string", "enum": ["summary", "standard", "full"], "default": "standard"},
            "max_tokens": {"type": "integer", "default": 0}
        },
        "required": ["observation_id"]
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
struct TimelineArgs {
    observation_id: i64,
    window_minutes: Option<i64>,
    detail_level: Option<String>,
    max_tokens: Option<usize>,
}

pub fn execute(query_engine: &QueryEngine, args: Option<Value>) -> Result<String, String> {
    let args: TimelineArgs = match args {
        Some(v) => serde_json::from_value(v).map_err(|e| format!("invalid arguments: {e}"))?,
        None => return Err("'observation_id' is required".to_string()),
    };

    let level = parse_detail_level(args.detail_level.as_deref())?;
    let max_tokens = args.max_tokens.unwrap_or(0);
    let window = args.window_minutes.unwrap_or(60);

    let results = query_engine
        .timeline(args.observation_id, window)
        .map_err(|e| e.user_message())?;

    if results.is_empty() {
        return Ok(format!("No observations in the window.\n\n{}", sdd_memory_core::token_footer(0)));
    }

    let full_text = results
        .iter()
        .map(|o| sdd_memory_core::shaper::render_observation(o, level))
        .collect::<Vec<_>>()
        .join("\n\n");
    Ok(shaper::build_post_hoc(full_text, level, max_tokens))
}
