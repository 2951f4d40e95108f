//! `stats` tool — store-wide counts and breakdowns (spec.md §6.1).

use sdd_memory_core::QueryEngine;
use serde_json::Value;
use std::fmt::Write as _;

pub fn schema() -> Value {
    serde_json::json!({"type": "object", "properties": {}})
}

pub fn execute(query_engine: &QueryEngine, _args: Option<Value>) -> Result<String, String> {
    let stats = query_engine.stats().map_err(|e| e.user_message())?;

    let mut out = String::new();
    let _ = writeln!(out, "Observations: {} live, {} deleted, {} total", stats.live_observations, stats.deleted_observations, stats.total_observations);
    let _ = writeln!(out, "Relations: {}", stats.total_relations);
    let _ = writeln!(out, "Sessions: {}", stats.total_sessions);

    if !stats.by_type.is_empty() {
        let _ = writeln!(out, "\nBy type:");
        for (kind, count) in &stats.by_type {
            let _ = writeln!(out, "  {kind}: {count}");
        }
    }
    if !stats.by_project.is_empty() {
        let _ = writeln!(out, "\nBy project:");
        for (project, count) in &stats.by_project {
            let _ = writeln!(out, "  {}: {count}", project.as_deref().unwrap_or("(none)"));
        }
    }
    if !stats.by_scope.is_empty() {
        let _ = writeln!(out, "\nBy scope:");
        for (scope, count) in &stats.by_scope {
            let _ = writeln!(out, "  {scope}: {count}");
        }
    }

    let footer = sdd_memory_core::token_footer(sdd_memory_core::estimate_tokens(&out));
    let _ = write!(out, "\n{footer}");
    Ok(out)
}
