//! SQLite storage layer.
//!
//! Owns every row: sessions, observations (+ FTS5 shadow index),
//! user_prompts, relations. Higher layers (Query Engine, Graph Engine,
//! Bridges, Session Lifecycle) hold only values returned from here —
//! spec.md §3 "Ownership".

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{MemoryError, Result};
use crate::model::{
    AddObservationParams, Observation, Relation, Scope, Session, UpdateObservationFields,
    UserPrompt, MANUAL_SAVE_SESSION,
};
use crate::storage::migrations::MIGRATIONS;
use crate::util::content_digest;

/// Options recognized at store construction (spec.md §6.3).
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Directory for the database file. `None` resolves to the
    /// platform data directory via `directories::ProjectDirs`.
    pub data_dir: Option<PathBuf>,
    /// Hard cap on observation content length.
    pub max_observation_length: usize,
    /// Cap on Context's list results.
    pub max_context_results: usize,
    /// Cap on Search's list results.
    pub max_search_results: usize,
    /// Window within which a structurally identical observation is
    /// reused instead of duplicated. Zero disables dedup.
    pub dedupe_window: chrono::Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            max_observation_length: 4_000,
            max_context_results: 200,
            max_search_results: 200,
            dedupe_window: chrono::Duration::zero(),
        }
    }
}

/// Bulk export of every table, id-preserving where possible.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSnapshot {
    pub sessions: Vec<Session>,
    pub observations: Vec<Observation>,
    pub user_prompts: Vec<UserPrompt>,
    pub relations: Vec<Relation>,
}

/// Result of importing a snapshot: how many rows landed, and which
/// observation ids were remapped due to collision.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub sessions_imported: usize,
    pub observations_imported: usize,
    pub user_prompts_imported: usize,
    pub relations_imported: usize,
    pub remapped_observation_ids: Vec<(i64, i64)>,
}

/// Durable embedded store: schema, migration, CRUD for
/// observations/sessions/prompts/relations, soft/hard delete, FTS index
/// maintenance.
///
/// Uses separate reader/writer connections, each behind its own mutex,
/// so a long-running write does not block readers thanks to WAL mode.
/// `Storage` is `Send + Sync`; every method takes `&self`.
pub struct Storage {
    writer: Mutex<Connection>,
    reader: Mutex<Connection>,
    config: StoreConfig,
}

impl Storage {
    fn configure_connection(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;",
        )?;
        Ok(())
    }

    fn resolve_db_path(data_dir: &Option<PathBuf>) -> Result<PathBuf> {
        match data_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir)?;
                Ok(dir.join("sdd-memory.db"))
            }
            None => {
                let proj_dirs = ProjectDirs::from("dev", "sdd", "memory").ok_or_else(|| {
                    MemoryError::internal("could not determine project directories")
                })?;
                let dir = proj_dirs.data_dir();
                std::fs::create_dir_all(dir)?;
                Ok(dir.join("sdd-memory.db"))
            }
        }
    }

    /// Open (creating if absent) the store and run migrations.
    pub fn open(config: StoreConfig) -> Result<Self> {
        let path = Self::resolve_db_path(&config.data_dir)?;
        Self::open_at(path, config)
    }

    /// Open a store at an explicit path — used by tests with a
    /// `tempfile::TempDir`-backed path.
    pub fn open_at(path: impl AsRef<Path>, config: StoreConfig) -> Result<Self> {
        let path = path.as_ref();
        let writer = Connection::open(path)?;
        Self::configure_connection(&writer)?;
        for migration in MIGRATIONS {
            writer.execute_batch(migration.up)?;
        }

        let reader = Connection::open(path)?;
        Self::configure_connection(&reader)?;

        let storage = Self {
            writer: Mutex::new(writer),
            reader: Mutex::new(reader),
            config,
        };
        storage.ensure_manual_save_session()?;
        Ok(storage)
    }

    /// Open an in-memory store — handy for unit tests that don't need
    /// a file on disk.
    #[doc(hidden)]
    pub fn open_in_memory(config: StoreConfig) -> Result<Self> {
        // A second `:memory:` connection would be a distinct, empty
        // database, so the reader and writer share one named in-memory
        // database via SQLite's shared cache.
        let uri = format!("file:sdd-memory-{}?mode=memory&cache=shared", uuid::Uuid::new_v4());
        let writer = Connection::open(&uri)?;
        writer.execute_batch("PRAGMA foreign_keys = ON;")?;
        for migration in MIGRATIONS {
            writer.execute_batch(migration.up)?;
        }
        let reader = Connection::open(&uri)?;
        reader.execute_batch("PRAGMA foreign_keys = ON;")?;
        let storage = Self {
            writer: Mutex::new(writer),
            reader: Mutex::new(reader),
            config,
        };
        storage.ensure_manual_save_session()?;
        Ok(storage)
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub(crate) fn writer(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.writer.lock().expect("writer mutex poisoned")
    }

    pub(crate) fn reader(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.reader.lock().expect("reader mutex poisoned")
    }

    // ========================================================================
    // SESSIONS
    // ========================================================================

    fn ensure_manual_save_session(&self) -> Result<()> {
        let conn = self.writer();
        let exists: Option<String> = conn
            .query_row(
                "SELECT id FROM sessions WHERE id = ?1",
                params![MANUAL_SAVE_SESSION],
                |row| row.get(0),
            )
            .optional()?;
        if exists.is_none() {
            conn.execute(
                "INSERT INTO sessions (id, project, workspace, started_at, ended_at, summary)
                 VALUES (?1, NULL, NULL, ?2, NULL, NULL)",
                params![MANUAL_SAVE_SESSION, Utc::now().to_rfc3339()],
            )?;
        }
        Ok(())
    }

    /// `CreateSession` — `manual-save` aside, every session gets a fresh
    /// uuid v4 identity.
    pub fn create_session(&self, project: Option<&str>, workspace: Option<&str>) -> Result<Session> {
        let id = uuid::Uuid::new_v4().to_string();
        let started_at = Utc::now();
        self.writer().execute(
            "INSERT INTO sessions (id, project, workspace, started_at, ended_at, summary)
             VALUES (?1, ?2, ?3, ?4, NULL, NULL)",
            params![id, project, workspace, started_at.to_rfc3339()],
        )?;
        Ok(Session {
            id,
            project: project.map(str::to_string),
            workspace: workspace.map(str::to_string),
            started_at,
            ended_at: None,
            summary: None,
        })
    }

    pub fn get_session(&self, id: &str) -> Result<Session> {
        self.reader()
            .query_row(
                "SELECT id, project, workspace, started_at, ended_at, summary FROM sessions WHERE id = ?1",
                params![id],
                Self::row_to_session,
            )
            .optional()?
            .ok_or_else(|| MemoryError::not_found(format!("session '{id}'")))
    }

    fn session_exists(&self, id: &str) -> Result<bool> {
        let exists: Option<i64> = self
            .reader()
            .query_row("SELECT 1 FROM sessions WHERE id = ?1", params![id], |row| row.get(0))
            .optional()?;
        Ok(exists.is_some())
    }

    /// Stamps `ended_at`. Idempotent — ending an already-ended session
    /// just refreshes the timestamp.
    pub fn end_session(&self, id: &str) -> Result<()> {
        if !self.session_exists(id)? {
            return Err(MemoryError::not_found(format!("session '{id}'")));
        }
        self.writer().execute(
            "UPDATE sessions SET ended_at = ?1 WHERE id = ?2",
            params![Utc::now().to_rfc3339(), id],
        )?;
        Ok(())
    }

    pub fn set_session_summary(&self, id: &str, summary: &str) -> Result<()> {
        if !self.session_exists(id)? {
            return Err(MemoryError::not_found(format!("session '{id}'")));
        }
        self.writer().execute(
            "UPDATE sessions SET summary = ?1 WHERE id = ?2",
            params![summary, id],
        )?;
        Ok(())
    }

    fn row_to_session(row: &rusqlite::Row) -> rusqlite::Result<Session> {
        let started_at: String = row.get(3)?;
        let ended_at: Option<String> = row.get(4)?;
        Ok(Session {
            id: row.get(0)?,
            project: row.get(1)?,
            workspace: row.get(2)?,
            started_at: parse_rfc3339(&started_at),
            ended_at: ended_at.as_deref().map(parse_rfc3339),
            summary: row.get(5)?,
        })
    }

    /// Ensures `session_id` exists, transparently creating `manual-save`
    /// when it is the id used and absent. Any other missing, explicitly
    /// supplied session id fails `NotFound`.
    fn ensure_session_for_write(&self, session_id: &str) -> Result<()> {
        if session_id == MANUAL_SAVE_SESSION {
            return self.ensure_manual_save_session();
        }
        if self.session_exists(session_id)? {
            return Ok(());
        }
        Err(MemoryError::not_found(format!("session '{session_id}'")))
    }

    // ========================================================================
    // OBSERVATIONS
    // ========================================================================

    fn truncate_content<'a>(&self, content: &'a str) -> std::borrow::Cow<'a, str> {
        if content.chars().count() <= self.config.max_observation_length {
            return std::borrow::Cow::Borrowed(content);
        }
        std::borrow::Cow::Owned(content.chars().take(self.config.max_observation_length).collect())
    }

    /// `AddObservation` — ensures the session exists, truncates content,
    /// applies topic-key upsert, falls back to the dedup window, or
    /// inserts a fresh row. Returns the observation id (new or reused).
    pub fn add_observation(&self, params: AddObservationParams) -> Result<i64> {
        if params.title.trim().is_empty() {
            return Err(MemoryError::invalid_argument("'title' is required"));
        }
        if params.content.trim().is_empty() {
            return Err(MemoryError::invalid_argument("'content' is required"));
        }
        if params.kind.trim().is_empty() {
            return Err(MemoryError::invalid_argument("'type' is required"));
        }

        let session_id = params.session_id.as_deref().unwrap_or(MANUAL_SAVE_SESSION);
        self.ensure_session_for_write(session_id)?;

        let content = self.truncate_content(&params.content).into_owned();
        let scope = params.scope;
        let digest = content_digest(&params.kind, &params.title, &content, params.project.as_deref(), scope.as_str());

        // Topic-key upsert takes priority over the dedup window.
        if let Some(topic_key) = params.topic_key.as_deref().filter(|k| !k.is_empty()) {
            if let Some(existing) = self.find_by_topic_key(topic_key, params.project.as_deref(), scope)? {
                self.overwrite_observation(existing.id, &params.title, &content, &digest)?;
                return Ok(existing.id);
            }
            return self.insert_observation(
                session_id, &params.kind, &params.title, &content, params.project.as_deref(),
                scope, params.namespace.as_deref(), Some(topic_key), &digest,
            );
        }

        if self.config.dedupe_window > chrono::Duration::zero() {
            if let Some(existing_id) = self.find_dedup_match(&digest, params.project.as_deref(), scope)? {
                return Ok(existing_id);
            }
        }

        self.insert_observation(
            session_id, &params.kind, &params.title, &content, params.project.as_deref(),
            scope, params.namespace.as_deref(), None, &digest,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn insert_observation(
        &self,
        session_id: &str,
        kind: &str,
        title: &str,
        content: &str,
        project: Option<&str>,
        scope: Scope,
        namespace: Option<&str>,
        topic_key: Option<&str>,
        digest: &str,
    ) -> Result<i64> {
        let now = Utc::now().to_rfc3339();
        let conn = self.writer();
        conn.execute(
            "INSERT INTO observations
                (session_id, type, title, content, project, scope, namespace, topic_key,
                 revision_count, content_digest, created_at, updated_at, deleted_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 1, ?9, ?10, ?10, NULL)",
            params![session_id, kind, title, content, project, scope.as_str(), namespace, topic_key, digest, now],
        )?;
        let id = conn.last_insert_rowid();
        conn.execute(
            "INSERT INTO observations_fts (rowid, title, content) VALUES (?1, ?2, ?3)",
            params![id, title, content],
        )?;
        Ok(id)
    }

    fn overwrite_observation(&self, id: i64, title: &str, content: &str, digest: &str) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        let conn = self.writer();
        let (old_title, old_content): (String, String) = conn.query_row(
            "SELECT title, content FROM observations WHERE id = ?1",
            params![id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        conn.execute(
            "INSERT INTO observations_fts (observations_fts, rowid, title, content) VALUES ('delete', ?1, ?2, ?3)",
            params![id, old_title, old_content],
        )?;
        conn.execute(
            "UPDATE observations
             SET title = ?1, content = ?2, content_digest = ?3, updated_at = ?4,
                 revision_count = revision_count + 1, deleted_at = NULL
             WHERE id = ?5",
            params![title, content, digest, now, id],
        )?;
        conn.execute(
            "INSERT INTO observations_fts (rowid, title, content) VALUES (?1, ?2, ?3)",
            params![id, title, content],
        )?;
        Ok(())
    }

    fn find_dedup_match(&self, digest: &str, project: Option<&str>, scope: Scope) -> Result<Option<i64>> {
        let cutoff = (Utc::now() - self.config.dedupe_window).to_rfc3339();
        let conn = self.reader();
        let mut stmt = conn.prepare(
            "SELECT id FROM observations
             WHERE content_digest = ?1 AND project IS ?2 AND scope = ?3
               AND deleted_at IS NULL AND created_at >= ?4
             ORDER BY created_at DESC LIMIT 1",
        )?;
        let id: Option<i64> = stmt
            .query_row(params![digest, project, scope.as_str(), cutoff], |row| row.get(0))
            .optional()?;
        Ok(id)
    }

    /// `FindByTopicKey` — at most one live observation per
    /// (topic_key, project, scope).
    pub fn find_by_topic_key(&self, topic_key: &str, project: Option<&str>, scope: Scope) -> Result<Option<Observation>> {
        let conn = self.reader();
        conn.query_row(
            "SELECT id, session_id, type, title, content, project, scope, namespace, topic_key,
                    revision_count, created_at, updated_at, deleted_at
             FROM observations
             WHERE topic_key = ?1 AND project IS ?2 AND scope = ?3 AND deleted_at IS NULL",
            params![topic_key, project, scope.as_str()],
            Self::row_to_observation,
        )
        .optional()
        .map_err(MemoryError::from)
    }

    /// `GetObservation` — returned regardless of soft-delete; caller
    /// decides visibility.
    pub fn get_observation(&self, id: i64) -> Result<Observation> {
        self.reader()
            .query_row(
                "SELECT id, session_id, type, title, content, project, scope, namespace, topic_key,
                        revision_count, created_at, updated_at, deleted_at
                 FROM observations WHERE id = ?1",
                params![id],
                Self::row_to_observation,
            )
            .optional()?
            .ok_or_else(|| MemoryError::not_found(format!("observation {id}")))
    }

    /// Partial update of title/content/type/project/topic_key/scope;
    /// increments `revision_count`; refreshes the FTS index.
    pub fn update_observation(&self, id: i64, fields: UpdateObservationFields) -> Result<()> {
        let existing = self.get_observation(id)?;
        if existing.is_deleted() {
            return Err(MemoryError::not_found(format!("observation {id}")));
        }

        let old_title = existing.title.clone();
        let old_content = existing.content.clone();
        let title = fields.title.unwrap_or(existing.title);
        let content = fields.content.map(|c| self.truncate_content(&c).into_owned()).unwrap_or(existing.content);
        let kind = fields.kind.unwrap_or(existing.kind);
        let project = fields.project.unwrap_or(existing.project);
        let topic_key = fields.topic_key.unwrap_or(existing.topic_key);
        let scope = fields.scope.unwrap_or(existing.scope);

        if title.trim().is_empty() {
            return Err(MemoryError::invalid_argument("'title' cannot be empty"));
        }
        if content.trim().is_empty() {
            return Err(MemoryError::invalid_argument("'content' cannot be empty"));
        }

        // A topic_key change must not collide with another live observation.
        if let Some(ref key) = topic_key {
            if let Some(collision) = self.find_by_topic_key(key, project.as_deref(), scope)? {
                if collision.id != id {
                    return Err(MemoryError::already_exists(format!(
                        "topic_key '{key}' already in use by observation {}",
                        collision.id
                    )));
                }
            }
        }

        let digest = content_digest(&kind, &title, &content, project.as_deref(), scope.as_str());
        let now = Utc::now().to_rfc3339();
        {
            let conn = self.writer();
            conn.execute(
                "UPDATE observations
                 SET title = ?1, content = ?2, type = ?3, project = ?4, topic_key = ?5,
                     scope = ?6, content_digest = ?7, updated_at = ?8, revision_count = revision_count + 1
                 WHERE id = ?9",
                params![title, content, kind, project, topic_key, scope.as_str(), digest, now, id],
            )?;
            conn.execute(
                "INSERT INTO observations_fts (observations_fts, rowid, title, content) VALUES ('delete', ?1, ?2, ?3)",
                params![id, old_title, old_content],
            )?;
            conn.execute(
                "INSERT INTO observations_fts (rowid, title, content) VALUES (?1, ?2, ?3)",
                params![id, title, content],
            )?;
        }
        Ok(())
    }

    /// Soft delete sets `deleted_at` and removes the FTS row. Hard
    /// delete removes the row outright, cascading relation deletion via
    /// the foreign key.
    pub fn delete_observation(&self, id: i64, hard: bool) -> Result<()> {
        let existing = self.get_observation(id)?;
        if hard {
            let conn = self.writer();
            conn.execute("DELETE FROM observations_fts WHERE rowid = ?1", params![id]).ok();
            let affected = conn.execute("DELETE FROM observations WHERE id = ?1", params![id])?;
            if affected == 0 {
                return Err(MemoryError::not_found(format!("observation {id}")));
            }
            return Ok(());
        }

        if existing.is_deleted() {
            return Ok(());
        }
        let conn = self.writer();
        conn.execute(
            "UPDATE observations SET deleted_at = ?1 WHERE id = ?2",
            params![Utc::now().to_rfc3339(), id],
        )?;
        conn.execute("DELETE FROM observations_fts WHERE rowid = ?1", params![id])?;
        Ok(())
    }

    pub(crate) fn row_to_observation(row: &rusqlite::Row) -> rusqlite::Result<Observation> {
        let scope: String = row.get(6)?;
        let created_at: String = row.get(10)?;
        let updated_at: String = row.get(11)?;
        let deleted_at: Option<String> = row.get(12)?;
        Ok(Observation {
            id: row.get(0)?,
            session_id: row.get(1)?,
            kind: row.get(2)?,
            title: row.get(3)?,
            content: row.get(4)?,
            project: row.get(5)?,
            scope: Scope::parse(&scope).unwrap_or_default(),
            namespace: row.get(7)?,
            topic_key: row.get(8)?,
            revision_count: row.get(9)?,
            created_at: parse_rfc3339(&created_at),
            updated_at: parse_rfc3339(&updated_at),
            deleted_at: deleted_at.as_deref().map(parse_rfc3339),
        })
    }

    // ========================================================================
    // USER PROMPTS
    // ========================================================================

    pub fn save_prompt(&self, session_id: &str, text: &str, namespace: Option<&str>) -> Result<i64> {
        if text.trim().is_empty() {
            return Err(MemoryError::invalid_argument("'text' is required"));
        }
        let session_id = if session_id.is_empty() { MANUAL_SAVE_SESSION } else { session_id };
        self.ensure_session_for_write(session_id)?;
        let now = Utc::now().to_rfc3339();
        let conn = self.writer();
        conn.execute(
            "INSERT INTO user_prompts (session_id, text, namespace, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![session_id, text, namespace, now],
        )?;
        Ok(conn.last_insert_rowid())
    }

    // ========================================================================
    // RELATIONS
    // ========================================================================

    /// Inserts `(from, to, type)`, and — atomically, in the same
    /// transaction — the reverse edge when `bidirectional` is set.
    /// Returns the id(s) created.
    pub fn add_relation(&self, from: i64, to: i64, kind: &str, note: Option<&str>, bidirectional: bool) -> Result<Vec<i64>> {
        if from == to {
            return Err(MemoryError::invalid_argument("a relation cannot link an observation to itself"));
        }
        if kind.trim().is_empty() {
            return Err(MemoryError::invalid_argument("'relation_type' is required"));
        }

        let mut conn = self.writer();
        let tx = conn.transaction()?;

        for id in [from, to] {
            let live: Option<i64> = tx
                .query_row("SELECT 1 FROM observations WHERE id = ?1", params![id], |r| r.get(0))
                .optional()?;
            if live.is_none() {
                return Err(MemoryError::not_found(format!("observation {id}")));
            }
        }

        let now = Utc::now().to_rfc3339();
        let mut ids = Vec::with_capacity(2);

        let insert_one = |tx: &rusqlite::Transaction, from: i64, to: i64| -> Result<i64> {
            let dup: Option<i64> = tx
                .query_row(
                    "SELECT id FROM relations WHERE from_id = ?1 AND to_id = ?2 AND type = ?3",
                    params![from, to, kind],
                    |r| r.get(0),
                )
                .optional()?;
            if dup.is_some() {
                return Err(MemoryError::already_exists(format!(
                    "relation {from} -[{kind}]-> {to} already exists"
                )));
            }
            tx.execute(
                "INSERT INTO relations (from_id, to_id, type, note, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![from, to, kind, note, now],
            )?;
            Ok(tx.last_insert_rowid())
        };

        ids.push(insert_one(&tx, from, to)?);
        if bidirectional {
            ids.push(insert_one(&tx, to, from)?);
        }

        tx.commit()?;
        Ok(ids)
    }

    /// Hard delete of a single relation row.
    pub fn remove_relation(&self, id: i64) -> Result<()> {
        let affected = self.writer().execute("DELETE FROM relations WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(MemoryError::not_found(format!("relation {id}")));
        }
        Ok(())
    }

    /// All relations incident to `observation_id`, either endpoint.
    pub fn get_relations(&self, observation_id: i64) -> Result<Vec<Relation>> {
        let conn = self.reader();
        let mut stmt = conn.prepare(
            "SELECT id, from_id, to_id, type, note, created_at FROM relations
             WHERE from_id = ?1 OR to_id = ?1",
        )?;
        let rows = stmt.query_map(params![observation_id], Self::row_to_relation)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn row_to_relation(row: &rusqlite::Row) -> rusqlite::Result<Relation> {
        let created_at: String = row.get(5)?;
        Ok(Relation {
            id: row.get(0)?,
            from_id: row.get(1)?,
            to_id: row.get(2)?,
            kind: row.get(3)?,
            note: row.get(4)?,
            created_at: parse_rfc3339(&created_at),
        })
    }

    // ========================================================================
    // EXPORT / IMPORT
    // ========================================================================

    pub fn export(&self) -> Result<ExportSnapshot> {
        let conn = self.reader();

        let mut sessions = Vec::new();
        let mut stmt = conn.prepare("SELECT id, project, workspace, started_at, ended_at, summary FROM sessions")?;
        let rows = stmt.query_map([], Self::row_to_session)?;
        for row in rows {
            sessions.push(row?);
        }

        let mut observations = Vec::new();
        let mut stmt = conn.prepare(
            "SELECT id, session_id, type, title, content, project, scope, namespace, topic_key,
                    revision_count, created_at, updated_at, deleted_at FROM observations",
        )?;
        let rows = stmt.query_map([], Self::row_to_observation)?;
        for row in rows {
            observations.push(row?);
        }

        let mut user_prompts = Vec::new();
        let mut stmt = conn.prepare("SELECT id, session_id, text, namespace, created_at FROM user_prompts")?;
        let rows = stmt.query_map([], |row| {
            let created_at: String = row.get(4)?;
            Ok(UserPrompt {
                id: row.get(0)?,
                session_id: row.get(1)?,
                text: row.get(2)?,
                namespace: row.get(3)?,
                created_at: parse_rfc3339(&created_at),
            })
        })?;
        for row in rows {
            user_prompts.push(row?);
        }

        let mut relations = Vec::new();
        let mut stmt = conn.prepare("SELECT id, from_id, to_id, type, note, created_at FROM relations")?;
        let rows = stmt.query_map([], Self::row_to_relation)?;
        for row in rows {
            relations.push(row?);
        }

        Ok(ExportSnapshot { sessions, observations, user_prompts, relations })
    }

    /// Bulk JSON round-trip. Preserves observation ids where free;
    /// on collision, remaps the id and rewrites incident relations.
    pub fn import(&self, snapshot: ExportSnapshot) -> Result<ImportReport> {
        let mut report = ImportReport::default();
        let mut id_map: std::collections::HashMap<i64, i64> = std::collections::HashMap::new();

        for session in &snapshot.sessions {
            if !self.session_exists(&session.id)? {
                self.writer().execute(
                    "INSERT INTO sessions (id, project, workspace, started_at, ended_at, summary)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        session.id, session.project, session.workspace,
                        session.started_at.to_rfc3339(),
                        session.ended_at.map(|d| d.to_rfc3339()),
                        session.summary,
                    ],
                )?;
            }
            report.sessions_imported += 1;
        }

        for obs in &snapshot.observations {
            let taken: Option<i64> = self
                .reader()
                .query_row("SELECT id FROM observations WHERE id = ?1", params![obs.id], |r| r.get(0))
                .optional()?;
            let digest = content_digest(&obs.kind, &obs.title, &obs.content, obs.project.as_deref(), obs.scope.as_str());
            let new_id = if taken.is_none() {
                let conn = self.writer();
                conn.execute(
                    "INSERT INTO observations
                        (id, session_id, type, title, content, project, scope, namespace, topic_key,
                         revision_count, content_digest, created_at, updated_at, deleted_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
                    params![
                        obs.id, obs.session_id, obs.kind, obs.title, obs.content, obs.project,
                        obs.scope.as_str(), obs.namespace, obs.topic_key, obs.revision_count, digest,
                        obs.created_at.to_rfc3339(), obs.updated_at.to_rfc3339(),
                        obs.deleted_at.map(|d| d.to_rfc3339()),
                    ],
                )?;
                if obs.deleted_at.is_none() {
                    conn.execute(
                        "INSERT INTO observations_fts (rowid, title, content) VALUES (?1, ?2, ?3)",
                        params![obs.id, obs.title, obs.content],
                    )?;
                }
                obs.id
            } else {
                let new_id = self.insert_observation(
                    &obs.session_id, &obs.kind, &obs.title, &obs.content, obs.project.as_deref(),
                    obs.scope, obs.namespace.as_deref(), obs.topic_key.as_deref(), &digest,
                )?;
                id_map.insert(obs.id, new_id);
                report.remapped_observation_ids.push((obs.id, new_id));
                new_id
            };
            let _ = new_id;
            report.observations_imported += 1;
        }

        for prompt in &snapshot.user_prompts {
            self.writer().execute(
                "INSERT INTO user_prompts (session_id, text, namespace, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![prompt.session_id, prompt.text, prompt.namespace, prompt.created_at.to_rfc3339()],
            )?;
            report.user_prompts_imported += 1;
        }

        for relation in &snapshot.relations {
            let from = *id_map.get(&relation.from_id).unwrap_or(&relation.from_id);
            let to = *id_map.get(&relation.to_id).unwrap_or(&relation.to_id);
            let result = self.writer().execute(
                "INSERT OR IGNORE INTO relations (from_id, to_id, type, note, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![from, to, relation.kind, relation.note, relation.created_at.to_rfc3339()],
            );
            if result.is_ok() {
                report.relations_imported += 1;
            }
        }

        Ok(report)
    }
}

pub(crate) fn parse_rfc3339(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).map(|d| d.with_timezone(&Utc)).unwrap_or_else(|_| Utc::now())
}
