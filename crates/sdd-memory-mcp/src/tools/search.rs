//! `search` tool — full-text Search shaped with the incremental budget
//! strategy (spec.md §4.2, §4.4, §6.1).

use sdd_memory_core::{QueryEngine, shaper};
use serde::Deserialize;
use serde_json::Value;

use super::common::{parse_detail_level, FilterArgs};

pub fn schema() -> Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "query": {"type": "string", "description": "Full-text query. Empty means 'structured filters only, most recent first'."},
            "project": {"type": "string"},
            "type": {"type": "string"},
            "scope": {"type": "string", "enum": ["project", "personal"]},
            "namespace": {"type": "string"},
            "session_id": {"type": "string"},
            "since": {"type": "string", "description": "RFC3339 timestamp."},
            "until": {"type": "string", "description": "RFC3339 timestamp."},
            "include_deleted": {"type": "boolean", "default": false},
            "limit": {"type": "integer", "default": 20},
            "detail_level": {"type": "string", "enum": ["summary", "standard", "full"], "default": "standard"},
            "max_tokens": {"type": "integer", "default": 0, "description": "0 means unbounded."}
        },
        "required": ["query"]
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
struct SearchArgs {
    query: String,
    #[serde(flatten)]
    filters: FilterArgs,
    detail_level: Option<String>,
    max_tokens: Option<usize>,
}

pub fn execute(query_engine: &QueryEngine, args: Option<Value>) -> Result<String, String> {
    let args: SearchArgs = match args {
        Some(v) => serde_json::from_value(v).map_err(|e| format!("invalid arguments: {e}"))?,
        None => return Err("'query' is required".to_string()),
    };

    let level = parse_detail_level(args.detail_level.as_deref())?;
    let max_tokens = args.max_tokens.unwrap_or(0);
    let limit = args.filters.limit.unwrap_or(20);
    let mut filters = args.filters.into_list_filters()?;
    filters.limit = limit;

    let results = query_engine.search(&args.query, &filters).map_err(|e| e.user_message())?;
    if results.is_empty() {
        return Ok(format!("No observations matched.\n\n{}", sdd_memory_core::token_footer(0)));
    }
    Ok(shaper::build_incremental(&results, level, max_tokens, limit))
}
