//! SDD stage bridge: one `decision` observation per (project, stage),
//! overwritten on every completion of that stage.

use crate::bridges::{summarize_artifact, write_bridge_observation};
use crate::model::observation_types;
use crate::storage::Storage;
use crate::util::normalize_project;

/// Called when an SDD pipeline stage completes. `artifact` is the
/// stage's rendered output (spec draft, plan, task list, ...).
pub fn on_stage_complete(storage: Option<&Storage>, project: &str, stage: &str, artifact: &str) {
    let normalized = normalize_project(project);
    let topic_key = format!("sdd/{normalized}/{stage}");
    let title = format!("SDD {stage}: {project}");
    let content = summarize_artifact(&format!("{stage} completed"), artifact);
    write_bridge_observation(storage, topic_key, title, observation_types::DECISION, content, Some(project.to_string()));
}
