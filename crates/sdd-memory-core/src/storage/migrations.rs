//! Database Migrations
//!
//! Schema migration definitions for the storage layer. Migrations use
//! `CREATE TABLE IF NOT EXISTS` / `CREATE INDEX IF NOT EXISTS` so that
//! running the full set against a fresh database or a fully-migrated
//! one both leave the schema in the same state (spec.md §4.1, testable
//! property 7).

/// Migration definitions, applied in order on every `Storage::open`.
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "Initial schema: sessions, observations, user_prompts, FTS index",
        up: MIGRATION_V1_UP,
    },
    Migration {
        version: 2,
        description: "Relation graph: directed typed edges with cascade delete",
        up: MIGRATION_V2_UP,
    },
];

/// A single database migration.
#[derive(Debug, Clone)]
pub struct Migration {
    pub version: u32,
    pub description: &'static str,
    pub up: &'static str,
}

const MIGRATION_V1_UP: &str = r#"
CREATE TABLE IF NOT EXISTS sessions (
    id TEXT PRIMARY KEY,
    project TEXT,
    workspace TEXT,
    started_at TEXT NOT NULL,
    ended_at TEXT,
    summary TEXT
);

CREATE TABLE IF NOT EXISTS observations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    session_id TEXT NOT NULL REFERENCES sessions(id),
    type TEXT NOT NULL,
    title TEXT NOT NULL,
    content TEXT NOT NULL,
    project TEXT,
    scope TEXT NOT NULL DEFAULT 'project',
    namespace TEXT,
    topic_key TEXT,
    revision_count INTEGER NOT NULL DEFAULT 1,
    content_digest TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    deleted_at TEXT
);

CREATE INDEX IF NOT EXISTS idx_observations_topic_key
    ON observations(topic_key, project, scope);
CREATE INDEX IF NOT EXISTS idx_observations_project_created
    ON observations(project, created_at DESC);
CREATE INDEX IF NOT EXISTS idx_observations_type ON observations(type);
CREATE INDEX IF NOT EXISTS idx_observations_digest
    ON observations(content_digest, project, scope, created_at DESC);

CREATE VIRTUAL TABLE IF NOT EXISTS observations_fts USING fts5(
    title,
    content,
    content='observations',
    content_rowid='id',
    tokenize='porter unicode61'
);

CREATE TABLE IF NOT EXISTS user_prompts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    session_id TEXT NOT NULL REFERENCES sessions(id),
    text TEXT NOT NULL,
    namespace TEXT,
    created_at TEXT NOT NULL
);
"#;

const MIGRATION_V2_UP: &str = r#"
CREATE TABLE IF NOT EXISTS relations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    from_id INTEGER NOT NULL REFERENCES observations(id) ON DELETE CASCADE,
    to_id INTEGER NOT NULL REFERENCES observations(id) ON DELETE CASCADE,
    type TEXT NOT NULL,
    note TEXT,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_relations_from ON relations(from_id);
CREATE INDEX IF NOT EXISTS idx_relations_to ON relations(to_id);
CREATE INDEX IF NOT EXISTS idx_relations_type ON relations(type);
CREATE UNIQUE INDEX IF NOT EXISTS idx_relations_unique
    ON relations(from_id, to_id, type);
"#;
