//! Shared argument parsing for the tool contract layer.
//!
//! Every tool deserializes its own `serde::Deserialize` args struct,
//! then reaches here for the bits every read tool needs: scope/detail
//! level parsing and building a `ListFilters` from the shared set of
//! `search`/`context` parameters (spec.md §6.1).

use chrono::{DateTime, Utc};
use sdd_memory_core::{DetailLevel, ListFilters, Scope};

pub fn parse_scope(scope: Option<&str>) -> Result<Option<Scope>, String> {
    match scope {
        None => Ok(None),
        Some(s) => Scope::parse(s).map(Some).map_err(|e| e.user_message()),
    }
}

pub fn parse_detail_level(level: Option<&str>) -> Result<DetailLevel, String> {
    match level {
        None => Ok(DetailLevel::default()),
        Some(s) => DetailLevel::parse(s).map_err(|e| e.user_message()),
    }
}

pub fn parse_rfc3339(label: &str, value: Option<&str>) -> Result<Option<DateTime<Utc>>, String> {
    match value {
        None => Ok(None),
        Some(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .map_err(|e| format!("invalid '{label}': {e}")),
    }
}

/// Common filter arguments shared by `search` and `context`.
#[derive(Debug, Default, serde::Deserialize)]
pub struct FilterArgs {
    pub project: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub scope: Option<String>,
    pub namespace: Option<String>,
    pub session_id: Option<String>,
    pub since: Option<String>,
    pub until: Option<String>,
    #[serde(default)]
    pub include_deleted: bool,
    pub limit: Option<usize>,
}

impl FilterArgs {
    pub fn into_list_filters(self) -> Result<ListFilters, String> {
        let scope = parse_scope(self.scope.as_deref())?;
        let since = parse_rfc3339("since", self.since.as_deref())?;
        let until = parse_rfc3339("until", self.until.as_deref())?;
        Ok(ListFilters {
            project: self.project,
            kind: self.kind,
            scope,
            namespace: self.namespace,
            session_id: self.session_id,
            since,
            until,
            include_deleted: self.include_deleted,
            limit: self.limit.unwrap_or(0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_scope_none_is_unfiltered() {
        assert!(parse_scope(None).unwrap().is_none());
    }

    #[test]
    fn parse_scope_rejects_unknown_value() {
        assert!(parse_scope(Some("bogus")).is_err());
    }

    #[test]
    fn parse_detail_level_defaults_to_standard() {
        assert_eq!(parse_detail_level(None).unwrap(), DetailLevel::Standard);
    }

    #[test]
    fn parse_rfc3339_rejects_malformed_input() {
        assert!(parse_rfc3339("since", Some("not-a-date")).is_err());
    }
}
