//! Core data model — Observation, Session, UserPrompt, Relation — and
//! the small enums/request shapes the rest of the crate is built around.
//!
//! Observation `type` and Relation `type` are open strings by design
//! (spec.md §9): well-known values are documented here but unknown
//! values must round-trip unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Well-known observation types. Not exhaustive — any non-empty string
/// is a legal `type`; these are just the values the bridges and tool
/// contracts know the names of.
pub mod observation_types {
    pub const DECISION: &str = "decision";
    pub const ARCHITECTURE: &str = "architecture";
    pub const BUGFIX: &str = "bugfix";
    pub const PATTERN: &str = "pattern";
    pub const CONFIG: &str = "config";
    pub const DISCOVERY: &str = "discovery";
    pub const LEARNING: &str = "learning";
    pub const EXPLORE: &str = "explore";
    pub const SESSION_SUMMARY: &str = "session_summary";
    pub const PROGRESS: &str = "progress";
    pub const PROMPT: &str = "prompt";
    pub const COMPACTION_SUMMARY: &str = "compaction_summary";

    /// Types excluded from default Compact candidate selection.
    pub const PINNED: &[&str] = &[DECISION, ARCHITECTURE];
}

/// Well-known relation types. Open strings, not a closed set.
pub mod relation_types {
    pub const RELATES_TO: &str = "relates_to";
    pub const IMPLEMENTS: &str = "implements";
    pub const DEPENDS_ON: &str = "depends_on";
    pub const CAUSED_BY: &str = "caused_by";
    pub const SUPERSEDES: &str = "supersedes";
    pub const PART_OF: &str = "part_of";
}

/// Visibility level of an observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Team/shared visibility (default).
    #[default]
    Project,
    /// Visible only to the owning agent/user.
    Personal,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Project => "project",
            Scope::Personal => "personal",
        }
    }

    pub fn parse(s: &str) -> crate::error::Result<Self> {
        match s {
            "project" => Ok(Scope::Project),
            "personal" => Ok(Scope::Personal),
            other => Err(crate::error::MemoryError::invalid_argument(format!(
                "invalid scope '{other}', expected 'project' or 'personal'"
            ))),
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Verbosity tier of a read response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DetailLevel {
    /// ids/titles/metadata only.
    Summary,
    /// truncated snippets (first ~500 chars at a paragraph boundary).
    #[default]
    Standard,
    /// untruncated content.
    Full,
}

impl DetailLevel {
    pub fn parse(s: &str) -> crate::error::Result<Self> {
        match s {
            "summary" => Ok(DetailLevel::Summary),
            "standard" => Ok(DetailLevel::Standard),
            "full" => Ok(DetailLevel::Full),
            other => Err(crate::error::MemoryError::invalid_argument(format!(
                "invalid detail_level '{other}', expected 'summary', 'standard', or 'full'"
            ))),
        }
    }
}

/// A single memory record — the primary entity of the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    pub id: i64,
    pub session_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub content: String,
    pub project: Option<String>,
    pub scope: Scope,
    pub namespace: Option<String>,
    pub topic_key: Option<String>,
    pub revision_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Observation {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Lifecycle container an Observation's `session_id` always references.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub project: Option<String>,
    pub workspace: Option<String>,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub summary: Option<String>,
}

/// Identity string of the session that always exists, auto-created on
/// first use.
pub const MANUAL_SAVE_SESSION: &str = "manual-save";

/// A user's verbatim ask, captured for "what did the user actually
/// request" recall.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPrompt {
    pub id: i64,
    pub session_id: String,
    pub text: String,
    pub namespace: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Direction of a traversed edge relative to the node it was reached
/// from, as reported by BuildContext.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Outgoing,
    Incoming,
}

/// A directed edge between two Observations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relation {
    pub id: i64,
    pub from_id: i64,
    pub to_id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Parameters accepted by `Store::add_observation`.
#[derive(Debug, Clone, Default)]
pub struct AddObservationParams {
    pub session_id: Option<String>,
    pub kind: String,
    pub title: String,
    pub content: String,
    pub project: Option<String>,
    pub scope: Scope,
    pub namespace: Option<String>,
    pub topic_key: Option<String>,
}

/// Partial update accepted by `Store::update_observation`. `None` means
/// "leave unchanged".
#[derive(Debug, Clone, Default)]
pub struct UpdateObservationFields {
    pub title: Option<String>,
    pub content: Option<String>,
    pub kind: Option<String>,
    pub project: Option<Option<String>>,
    pub topic_key: Option<Option<String>>,
    pub scope: Option<Scope>,
}

/// Filters shared by Search and Context.
#[derive(Debug, Clone, Default)]
pub struct ListFilters {
    pub project: Option<String>,
    pub kind: Option<String>,
    pub scope: Option<Scope>,
    pub namespace: Option<String>,
    pub session_id: Option<String>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub include_deleted: bool,
    pub limit: usize,
}
