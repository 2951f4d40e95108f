//! Pipeline → Memory observer bridges.
//!
//! Each bridge subscribes to a pipeline completion event and writes a
//! summary observation via the store's topic-key upsert primitive.
//! Bridges are best-effort: a failed write is logged and swallowed,
//! never propagated, and every entry point is nil-safe so a server
//! without memory configured still runs (spec.md §4.5).

pub mod adr;
pub mod change;
pub mod explore;
pub mod sdd;

use crate::model::{AddObservationParams, Scope};
use crate::storage::Storage;

const SUMMARY_CHARS: usize = 500;

/// First ~500 chars of `artifact`, cut at a line boundary, prefixed
/// with a one-line header.
fn summarize_artifact(header: &str, artifact: &str) -> String {
    let truncated = if artifact.chars().count() <= SUMMARY_CHARS {
        artifact.to_string()
    } else {
        let head: String = artifact.chars().take(SUMMARY_CHARS).collect();
        match head.rfind('\n') {
            Some(idx) => head[..idx].to_string(),
            None => head,
        }
    };
    format!("{header}\n\n{truncated}")
}

/// Writes (or upserts, via `topic_key`) a bridge-originated observation.
/// Any storage error is logged at `warn` and swallowed — the caller's
/// pipeline must never fail because memory did.
fn write_bridge_observation(storage: Option<&Storage>, topic_key: String, title: String, kind: &str, content: String, project: Option<String>) {
    let Some(storage) = storage else {
        return;
    };
    let params = AddObservationParams {
        session_id: None,
        kind: kind.to_string(),
        title,
        content,
        project,
        scope: Scope::Project,
        namespace: None,
        topic_key: Some(topic_key),
    };
    if let Err(err) = storage.add_observation(params) {
        tracing::warn!(error = %err, "bridge write failed, continuing pipeline");
    }
}
