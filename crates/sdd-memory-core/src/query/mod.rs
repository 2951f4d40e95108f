//! Query Engine.
//!
//! Read-heavy operations layered on top of `Storage`: full-text search,
//! recency-filtered context, time-windowed timeline, stats, and the
//! two-phase compaction workflow. Every method here is read-only except
//! `Compact`'s execute phase, which is the one write the Query Engine
//! performs directly (spec.md §4.2).

use std::sync::Arc;

use chrono::Utc;
use rusqlite::params;

use crate::error::{MemoryError, Result};
use crate::model::{observation_types, ListFilters, Observation, Scope};
use crate::storage::Storage;

/// `Stats()` breakdown.
#[derive(Debug, Clone, Default, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_observations: i64,
    pub live_observations: i64,
    pub deleted_observations: i64,
    pub total_relations: i64,
    pub total_sessions: i64,
    pub by_type: Vec<(String, i64)>,
    pub by_project: Vec<(Option<String>, i64)>,
    pub by_scope: Vec<(String, i64)>,
}

/// Outcome of `Compact`'s execute phase.
#[derive(Debug, Clone)]
pub struct CompactResult {
    pub compacted_ids: Vec<i64>,
    pub summary_observation_id: Option<i64>,
}

pub struct QueryEngine {
    storage: Arc<Storage>,
}

/// Strips FTS5 operator punctuation and wraps each remaining token in
/// double quotes so a title like `fix: auth/login` cannot be parsed as
/// an FTS5 query expression. An all-punctuation input sanitizes to an
/// empty string, which callers treat as "no text filter".
pub fn sanitize_fts_query(raw: &str) -> String {
    raw.split_whitespace()
        .map(|tok| {
            let cleaned: String = tok
                .chars()
                .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-')
                .collect();
            cleaned
        })
        .filter(|tok| !tok.is_empty())
        .map(|tok| format!("\"{tok}\""))
        .collect::<Vec<_>>()
        .join(" ")
}

impl QueryEngine {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }

    fn build_filter_clause(filters: &ListFilters, params_out: &mut Vec<Box<dyn rusqlite::ToSql>>) -> String {
        let mut clauses = Vec::new();
        if !filters.include_deleted {
            clauses.push("deleted_at IS NULL".to_string());
        }
        if let Some(project) = &filters.project {
            clauses.push(format!("project = ?{}", params_out.len() + 1));
            params_out.push(Box::new(project.clone()));
        }
        if let Some(kind) = &filters.kind {
            clauses.push(format!("type = ?{}", params_out.len() + 1));
            params_out.push(Box::new(kind.clone()));
        }
        if let Some(scope) = filters.scope {
            clauses.push(format!("scope = ?{}", params_out.len() + 1));
            params_out.push(Box::new(scope.as_str().to_string()));
        }
        if let Some(namespace) = &filters.namespace {
            clauses.push(format!("namespace = ?{}", params_out.len() + 1));
            params_out.push(Box::new(namespace.clone()));
        }
        if let Some(session_id) = &filters.session_id {
            clauses.push(format!("session_id = ?{}", params_out.len() + 1));
            params_out.push(Box::new(session_id.clone()));
        }
        if let Some(since) = filters.since {
            clauses.push(format!("created_at >= ?{}", params_out.len() + 1));
            params_out.push(Box::new(since.to_rfc3339()));
        }
        if let Some(until) = filters.until {
            clauses.push(format!("created_at <= ?{}", params_out.len() + 1));
            params_out.push(Box::new(until.to_rfc3339()));
        }
        if clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", clauses.join(" AND "))
        }
    }

    /// `Search(query, options)`. An empty sanitized query degrades to
    /// `Context`'s recency ordering over the same structured filters.
    ///
    /// Soft delete removes the row's `observations_fts` entry (§3(ii)),
    /// so a deleted observation can never be reached through the FTS
    /// MATCH clause. When `include_deleted` is set, those rows are
    /// pulled back in through a plain `LIKE` scan over title/content,
    /// unioned after the live FTS hits and always ranked behind them
    /// (FTS5's `bm25()` is non-positive, so `0.0` sorts last ascending).
    pub fn search(&self, query: &str, filters: &ListFilters) -> Result<Vec<Observation>> {
        let sanitized = sanitize_fts_query(query);
        if sanitized.is_empty() {
            return self.context(filters);
        }

        let limit = self.effective_limit(filters.limit, self.storage.config().max_search_results);
        let conn = self.storage.reader();

        let mut sql_params: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(sanitized)];
        let mut shared_clauses = Vec::new();
        if let Some(project) = &filters.project {
            shared_clauses.push(format!("o.project = ?{}", sql_params.len() + 1));
            sql_params.push(Box::new(project.clone()));
        }
        if let Some(kind) = &filters.kind {
            shared_clauses.push(format!("o.type = ?{}", sql_params.len() + 1));
            sql_params.push(Box::new(kind.clone()));
        }
        if let Some(scope) = filters.scope {
            shared_clauses.push(format!("o.scope = ?{}", sql_params.len() + 1));
            sql_params.push(Box::new(scope.as_str().to_string()));
        }
        if let Some(namespace) = &filters.namespace {
            shared_clauses.push(format!("o.namespace = ?{}", sql_params.len() + 1));
            sql_params.push(Box::new(namespace.clone()));
        }
        if let Some(session_id) = &filters.session_id {
            shared_clauses.push(format!("o.session_id = ?{}", sql_params.len() + 1));
            sql_params.push(Box::new(session_id.clone()));
        }
        if let Some(since) = filters.since {
            shared_clauses.push(format!("o.created_at >= ?{}", sql_params.len() + 1));
            sql_params.push(Box::new(since.to_rfc3339()));
        }
        if let Some(until) = filters.until {
            shared_clauses.push(format!("o.created_at <= ?{}", sql_params.len() + 1));
            sql_params.push(Box::new(until.to_rfc3339()));
        }
        let shared: String =
            shared_clauses.iter().map(|c| format!(" AND {c}")).collect();

        let live_select = format!(
            "SELECT o.id, o.session_id, o.type, o.title, o.content, o.project, o.scope, o.namespace,
                    o.topic_key, o.revision_count, o.created_at, o.updated_at, o.deleted_at,
                    bm25(observations_fts) AS rank
             FROM observations o
             WHERE o.deleted_at IS NULL
               AND o.id IN (SELECT rowid FROM observations_fts WHERE observations_fts MATCH ?1){shared}"
        );

        let sql = if filters.include_deleted {
            let like_idx = sql_params.len() + 1;
            sql_params.push(Box::new(format!("%{}%", query.trim())));
            format!(
                "{live_select}
                 UNION ALL
                 SELECT o.id, o.session_id, o.type, o.title, o.content, o.project, o.scope, o.namespace,
                        o.topic_key, o.revision_count, o.created_at, o.updated_at, o.deleted_at,
                        0.0 AS rank
                 FROM observations o
                 WHERE o.deleted_at IS NOT NULL
                   AND (o.title LIKE ?{like_idx} OR o.content LIKE ?{like_idx}){shared}
                 ORDER BY rank ASC, created_at DESC
                 LIMIT {limit}"
            )
        } else {
            format!("{live_select} ORDER BY rank ASC, created_at DESC LIMIT {limit}")
        };

        let mut stmt = conn.prepare(&sql)?;
        let param_refs: Vec<&dyn rusqlite::ToSql> = sql_params.iter().map(|b| b.as_ref()).collect();
        let rows = stmt.query_map(param_refs.as_slice(), Storage::row_to_observation)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// `Context(options)` — same filters as Search, no text query,
    /// ordered by recency, capped by `limit` and `MaxContextResults`.
    pub fn context(&self, filters: &ListFilters) -> Result<Vec<Observation>> {
        let limit = self.effective_limit(filters.limit, self.storage.config().max_context_results);
        let conn = self.storage.reader();
        let mut sql_params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();
        let where_clause = Self::build_filter_clause(filters, &mut sql_params);
        let sql = format!(
            "SELECT id, session_id, type, title, content, project, scope, namespace, topic_key,
                    revision_count, created_at, updated_at, deleted_at
             FROM observations
             {where_clause}
             ORDER BY created_at DESC
             LIMIT {limit}"
        );
        let mut stmt = conn.prepare(&sql)?;
        let param_refs: Vec<&dyn rusqlite::ToSql> = sql_params.iter().map(|b| b.as_ref()).collect();
        let rows = stmt.query_map(param_refs.as_slice(), Storage::row_to_observation)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn effective_limit(&self, requested: usize, configured_max: usize) -> usize {
        if requested == 0 {
            configured_max
        } else {
            requested.min(configured_max)
        }
    }

    /// `Timeline(anchor_id, window)` — chronological neighborhood around
    /// the anchor's `created_at`, project-scoped, namespace-blind.
    pub fn timeline(&self, anchor_id: i64, window_minutes: i64) -> Result<Vec<Observation>> {
        let anchor = self.storage.get_observation(anchor_id)?;
        let window = chrono::Duration::minutes(window_minutes.max(0));
        let from = (anchor.created_at - window).to_rfc3339();
        let to = (anchor.created_at + window).to_rfc3339();

        let conn = self.storage.reader();
        let sql = "SELECT id, session_id, type, title, content, project, scope, namespace, topic_key,
                          revision_count, created_at, updated_at, deleted_at
                   FROM observations
                   WHERE deleted_at IS NULL AND project IS ?1 AND created_at BETWEEN ?2 AND ?3
                   ORDER BY created_at ASC";
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params![anchor.project, from, to], Storage::row_to_observation)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// `FindByTopicKey(key, project, scope)`.
    pub fn find_by_topic_key(&self, topic_key: &str, project: Option<&str>, scope: Scope) -> Result<Option<Observation>> {
        self.storage.find_by_topic_key(topic_key, project, scope)
    }

    /// `Stats()`.
    pub fn stats(&self) -> Result<Stats> {
        let conn = self.storage.reader();

        let total_observations: i64 = conn.query_row("SELECT COUNT(*) FROM observations", [], |r| r.get(0))?;
        let live_observations: i64 =
            conn.query_row("SELECT COUNT(*) FROM observations WHERE deleted_at IS NULL", [], |r| r.get(0))?;
        let total_relations: i64 = conn.query_row("SELECT COUNT(*) FROM relations", [], |r| r.get(0))?;
        let total_sessions: i64 = conn.query_row("SELECT COUNT(*) FROM sessions", [], |r| r.get(0))?;

        let mut by_type = Vec::new();
        let mut stmt = conn.prepare(
            "SELECT type, COUNT(*) FROM observations WHERE deleted_at IS NULL GROUP BY type ORDER BY COUNT(*) DESC",
        )?;
        let rows = stmt.query_map([], |r| Ok((r.get::<_, String>(0)?, r.get::<_, i64>(1)?)))?;
        for row in rows {
            by_type.push(row?);
        }

        let mut by_project = Vec::new();
        let mut stmt = conn.prepare(
            "SELECT project, COUNT(*) FROM observations WHERE deleted_at IS NULL GROUP BY project ORDER BY COUNT(*) DESC",
        )?;
        let rows = stmt.query_map([], |r| Ok((r.get::<_, Option<String>>(0)?, r.get::<_, i64>(1)?)))?;
        for row in rows {
            by_project.push(row?);
        }

        let mut by_scope = Vec::new();
        let mut stmt = conn.prepare(
            "SELECT scope, COUNT(*) FROM observations WHERE deleted_at IS NULL GROUP BY scope ORDER BY COUNT(*) DESC",
        )?;
        let rows = stmt.query_map([], |r| Ok((r.get::<_, String>(0)?, r.get::<_, i64>(1)?)))?;
        for row in rows {
            by_scope.push(row?);
        }

        Ok(Stats {
            total_observations,
            live_observations,
            deleted_observations: total_observations - live_observations,
            total_relations,
            total_sessions,
            by_type,
            by_project,
            by_scope,
        })
    }

    /// Identify phase of `Compact`: up to `max` stale candidates, oldest
    /// first, excluding pinned types unless the unpinned pool is empty.
    pub fn compact_candidates(&self, older_than_days: i64, namespace: Option<&str>, max: usize) -> Result<Vec<Observation>> {
        let cutoff = (Utc::now() - chrono::Duration::days(older_than_days.max(0))).to_rfc3339();
        let conn = self.storage.reader();

        let pinned_placeholders: Vec<String> =
            observation_types::PINNED.iter().enumerate().map(|(i, _)| format!("?{}", i + 2)).collect();
        let mut sql = format!(
            "SELECT id, session_id, type, title, content, project, scope, namespace, topic_key,
                    revision_count, created_at, updated_at, deleted_at
             FROM observations
             WHERE deleted_at IS NULL AND created_at <= ?1 AND type NOT IN ({})",
            pinned_placeholders.join(", ")
        );
        if namespace.is_some() {
            sql.push_str(&format!(" AND namespace = ?{}", pinned_placeholders.len() + 2));
        }
        sql.push_str(" ORDER BY created_at ASC");

        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(cutoff.clone())];
        for pinned in observation_types::PINNED {
            params_vec.push(Box::new(pinned.to_string()));
        }
        if let Some(ns) = namespace {
            params_vec.push(Box::new(ns.to_string()));
        }

        let mut stmt = conn.prepare(&sql)?;
        let param_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|b| b.as_ref()).collect();
        let rows = stmt.query_map(param_refs.as_slice(), Storage::row_to_observation)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
            if out.len() >= max {
                break;
            }
        }

        if out.is_empty() {
            // Unpinned pool exhausted; fall back to pinned types too.
            drop(stmt);
            let mut sql2 = "SELECT id, session_id, type, title, content, project, scope, namespace, topic_key,
                                    revision_count, created_at, updated_at, deleted_at
                             FROM observations WHERE deleted_at IS NULL AND created_at <= ?1"
                .to_string();
            let mut params2: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(cutoff)];
            if let Some(ns) = namespace {
                sql2.push_str(" AND namespace = ?2");
                params2.push(Box::new(ns.to_string()));
            }
            sql2.push_str(" ORDER BY created_at ASC");
            let mut stmt2 = conn.prepare(&sql2)?;
            let refs2: Vec<&dyn rusqlite::ToSql> = params2.iter().map(|b| b.as_ref()).collect();
            let rows2 = stmt2.query_map(refs2.as_slice(), Storage::row_to_observation)?;
            for row in rows2 {
                out.push(row?);
                if out.len() >= max {
                    break;
                }
            }
        }

        Ok(out)
    }

    /// Execute phase of `Compact`: soft-deletes `ids` in one
    /// transaction and, when a summary is supplied, inserts one
    /// `compaction_summary` observation referencing the deleted set.
    pub fn compact_execute(
        &self,
        ids: &[i64],
        summary_title: Option<&str>,
        summary_content: Option<&str>,
        session_id: &str,
    ) -> Result<CompactResult> {
        if ids.is_empty() {
            return Err(MemoryError::invalid_argument("compact execute requires at least one id"));
        }

        {
            let conn = self.storage.writer();
            let now = Utc::now().to_rfc3339();
            for id in ids {
                conn.execute(
                    "UPDATE observations SET deleted_at = ?1 WHERE id = ?2 AND deleted_at IS NULL",
                    params![now, id],
                )?;
                conn.execute("DELETE FROM observations_fts WHERE rowid = ?1", params![id])?;
            }
        }

        let summary_observation_id = if let (Some(title), Some(content)) = (summary_title, summary_content) {
            let refs = ids.iter().map(|id| id.to_string()).collect::<Vec<_>>().join(", ");
            let full_content = format!("{content}\n\nCompacted observations: [{refs}]");
            let params = crate::model::AddObservationParams {
                session_id: Some(session_id.to_string()),
                kind: observation_types::COMPACTION_SUMMARY.to_string(),
                title: title.to_string(),
                content: full_content,
                project: None,
                scope: Scope::Project,
                namespace: None,
                topic_key: None,
            };
            Some(self.storage.add_observation(params)?)
        } else {
            None
        };

        Ok(CompactResult { compacted_ids: ids.to_vec(), summary_observation_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AddObservationParams, Scope};
    use crate::storage::StoreConfig;
    use std::sync::Arc;

    fn engine() -> (QueryEngine, Arc<Storage>, tempfile::TempDir) {
        let dir = tempfile::TempDir::new().unwrap();
        let storage = Arc::new(Storage::open_at(dir.path().join("t.db"), StoreConfig::default()).unwrap());
        (QueryEngine::new(storage.clone()), storage, dir)
    }

    fn add(storage: &Storage, title: &str, content: &str, kind: &str) -> i64 {
        storage
            .add_observation(AddObservationParams {
                session_id: None,
                kind: kind.to_string(),
                title: title.to_string(),
                content: content.to_string(),
                project: Some("alpha".to_string()),
                scope: Scope::Project,
                namespace: None,
                topic_key: None,
            })
            .unwrap()
    }

    #[test]
    fn sanitize_strips_fts_punctuation() {
        assert_eq!(sanitize_fts_query("fix: auth/login"), "\"fix\" \"auth\" \"login\"");
        assert_eq!(sanitize_fts_query("***"), "");
    }

    #[test]
    fn empty_search_query_degrades_to_context() {
        let (engine, storage, _dir) = engine();
        add(&storage, "Auth", "content one", "decision");
        let results = engine.search("", &ListFilters::default()).unwrap();
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn search_matches_fts_tokens() {
        let (engine, storage, _dir) = engine();
        add(&storage, "Auth model", "uses JWT tokens", "decision");
        add(&storage, "Unrelated", "database indexing strategy", "pattern");
        let results = engine.search("JWT", &ListFilters::default()).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "Auth model");
    }

    #[test]
    fn search_excludes_soft_deleted_by_default_but_reveals_with_include_deleted() {
        let (engine, storage, _dir) = engine();
        let id = add(&storage, "Auth model", "uses JWT tokens", "decision");
        storage.delete_observation(id, false).unwrap();

        let mut filters = ListFilters::default();
        let hidden = engine.search("JWT", &filters).unwrap();
        assert!(hidden.is_empty());

        filters.include_deleted = true;
        let revealed = engine.search("JWT", &filters).unwrap();
        assert_eq!(revealed.len(), 1);
        assert_eq!(revealed[0].id, id);
    }

    #[test]
    fn search_with_include_deleted_ranks_live_matches_before_deleted() {
        let (engine, storage, _dir) = engine();
        let deleted = add(&storage, "Old auth note", "JWT v1", "decision");
        storage.delete_observation(deleted, false).unwrap();
        let live = add(&storage, "New auth note", "JWT v2", "decision");

        let mut filters = ListFilters::default();
        filters.include_deleted = true;
        let results = engine.search("JWT", &filters).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, live);
        assert_eq!(results[1].id, deleted);
    }

    #[test]
    fn timeline_returns_chronological_window() {
        let (engine, storage, _dir) = engine();
        let anchor = add(&storage, "Anchor", "content", "decision");
        let results = engine.timeline(anchor, 60).unwrap();
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn compact_candidates_excludes_pinned_types_by_default() {
        let (engine, storage, _dir) = engine();
        add(&storage, "D", "decision content", observation_types::DECISION);
        add(&storage, "P", "pattern content", observation_types::PATTERN);
        let candidates = engine.compact_candidates(0, None, 10).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].kind, observation_types::PATTERN);
    }

    #[test]
    fn compact_execute_soft_deletes_and_writes_summary() {
        let (engine, storage, _dir) = engine();
        let id = add(&storage, "Old", "stale content", observation_types::PATTERN);
        let result = engine
            .compact_execute(&[id], Some("Compaction"), Some("summary text"), crate::model::MANUAL_SAVE_SESSION)
            .unwrap();
        assert_eq!(result.compacted_ids, vec![id]);
        assert!(result.summary_observation_id.is_some());
        let obs = storage.get_observation(id).unwrap();
        assert!(obs.is_deleted());
    }

    #[test]
    fn stats_counts_live_and_deleted() {
        let (engine, storage, _dir) = engine();
        let id = add(&storage, "A", "content", "decision");
        storage.delete_observation(id, false).unwrap();
        let stats = engine.stats().unwrap();
        assert_eq!(stats.total_observations, 1);
        assert_eq!(stats.live_observations, 0);
        assert_eq!(stats.deleted_observations, 1);
    }
}
