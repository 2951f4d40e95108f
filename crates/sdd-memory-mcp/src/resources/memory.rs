//! `memory://` resources — read-only shortcuts for the same data the
//! `stats` and `context` tools expose, for clients that prefer the
//! MCP resources surface over tool calls.

use sdd_memory_core::{shaper, DetailLevel, ListFilters, QueryEngine};

pub fn read(query_engine: &QueryEngine, uri: &str) -> Result<String, String> {
    let path = uri.strip_prefix("memory://").unwrap_or("");
    match path {
        "stats" => read_stats(query_engine),
        "recent" => read_recent(query_engine),
        _ => Err(format!("Unknown memory resource: {uri}")),
    }
}

fn read_stats(query_engine: &QueryEngine) -> Result<String, String> {
    let stats = query_engine.stats().map_err(|e| e.user_message())?;
    serde_json::to_string_pretty(&stats).map_err(|e| e.to_string())
}

fn read_recent(query_engine: &QueryEngine) -> Result<String, String> {
    let mut filters = ListFilters::default();
    filters.limit = 20;
    let results = query_engine.context(&filters).map_err(|e| e.user_message())?;
    if results.is_empty() {
        return Ok("No recent observations.".to_string());
    }
    Ok(results.iter().map(|o| shaper::render_observation(o, DetailLevel::Summary)).collect::<Vec<_>>().join("\n"))
}
