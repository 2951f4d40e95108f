//! Change stage bridge: same shape as the SDD bridge, but keyed by a
//! caller-supplied `change_id` in addition to project and stage.

use crate::bridges::{summarize_artifact, write_bridge_observation};
use crate::model::observation_types;
use crate::storage::Storage;
use crate::util::normalize_project;

pub fn on_stage_complete(storage: Option<&Storage>, project: &str, change_id: &str, stage: &str, artifact: &str) {
    let normalized = normalize_project(project);
    let topic_key = format!("change/{normalized}/{change_id}/{stage}");
    let title = format!("Change {change_id} {stage}: {project}");
    let content = summarize_artifact(&format!("{stage} completed"), artifact);
    write_bridge_observation(storage, topic_key, title, observation_types::DECISION, content, Some(project.to_string()));
}
