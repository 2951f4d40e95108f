//! Session Lifecycle convenience API and Progress's dual read/write
//! behavior (spec.md §4.6).

use std::sync::Arc;

use crate::error::Result;
use crate::model::{observation_types, AddObservationParams, Observation, Scope, Session};
use crate::storage::Storage;

pub struct SessionLifecycle {
    storage: Arc<Storage>,
}

impl SessionLifecycle {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }

    /// `SessionStart(project?, workspace?) → session_id`.
    pub fn start(&self, project: Option<&str>, workspace: Option<&str>) -> Result<Session> {
        self.storage.create_session(project, workspace)
    }

    /// `SessionEnd(id)` — stamps `ended_at`.
    pub fn end(&self, id: &str) -> Result<()> {
        self.storage.end_session(id)
    }

    /// `SessionSummary(id, content)` — stores a `session_summary`
    /// observation linked to the session, and the summary text on the
    /// session row itself.
    pub fn summary(&self, id: &str, content: &str) -> Result<i64> {
        self.storage.set_session_summary(id, content)?;
        let session = self.storage.get_session(id)?;
        self.storage.add_observation(AddObservationParams {
            session_id: Some(id.to_string()),
            kind: observation_types::SESSION_SUMMARY.to_string(),
            title: format!("Session summary: {id}"),
            content: content.to_string(),
            project: session.project,
            scope: Scope::Project,
            namespace: None,
            topic_key: None,
        })
    }
}

/// Normalized topic_key for a project's progress record, honoring the
/// optional namespace prefix.
fn progress_topic_key(project: &str, namespace: Option<&str>) -> String {
    let project_slug = crate::util::normalize_project(project);
    match namespace {
        Some(ns) if !ns.trim().is_empty() => format!("progress/{ns}/{project_slug}"),
        _ => format!("progress/{project_slug}"),
    }
}

/// `Progress(project, content?)`. No `content` reads the current
/// record; a supplied `content` upserts it. Exactly one live Progress
/// observation exists per (project, namespace) key.
pub fn progress(storage: &Storage, project: &str, content: Option<&str>, namespace: Option<&str>) -> Result<Option<Observation>> {
    let topic_key = progress_topic_key(project, namespace);
    match content {
        None => storage.find_by_topic_key(&topic_key, Some(project), Scope::Project),
        Some(content) => {
            let id = storage.add_observation(AddObservationParams {
                session_id: None,
                kind: observation_types::PROGRESS.to_string(),
                title: format!("Progress: {project}"),
                content: content.to_string(),
                project: Some(project.to_string()),
                scope: Scope::Project,
                namespace: namespace.map(str::to_string),
                topic_key: Some(topic_key),
            })?;
            Ok(Some(storage.get_observation(id)?))
        }
    }
}
