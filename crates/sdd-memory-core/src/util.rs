//! Small pure helpers shared across the Query Engine, the Bridges, and
//! the Tool Contract layer.

use sha2::{Digest, Sha256};

/// Lowercase, trim, spaces to hyphens, drop anything outside
/// `[a-z0-9_-]`. Used for every topic_key path the bridges construct.
pub fn normalize_project(name: &str) -> String {
    let lower = name.trim().to_lowercase().replace(' ', "-");
    lower
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_' || *c == '-')
        .collect()
}

/// Slugify a free-form title the same way, for use in topic_key paths
/// that key off a title rather than a project (e.g. the explore bridge).
pub fn slugify(title: &str) -> String {
    normalize_project(title)
}

/// Stable content digest used by the dedup window to detect structurally
/// identical observations without storing the full content twice.
pub fn content_digest(kind: &str, title: &str, content: &str, project: Option<&str>, scope: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(kind.as_bytes());
    hasher.update(b"\0");
    hasher.update(title.as_bytes());
    hasher.update(b"\0");
    hasher.update(content.as_bytes());
    hasher.update(b"\0");
    hasher.update(project.unwrap_or("").as_bytes());
    hasher.update(b"\0");
    hasher.update(scope.as_bytes());
    hex::encode(hasher.finalize())
}

/// Suggest a normalized topic key for a new observation, the same
/// `type/project/slug(title)` shape the bridges use internally. Exposed
/// as its own helper because the `suggest_topic_key` tool contract and
/// the bridges both need exactly this logic (spec.md §4.5, §6.1).
pub fn suggest_topic_key(kind: &str, title: &str, project: Option<&str>) -> String {
    let kind_slug = slugify(kind);
    let title_slug = slugify(title);
    match project {
        Some(p) if !p.trim().is_empty() => {
            format!("{kind_slug}/{}/{title_slug}", normalize_project(p))
        }
        _ => format!("{kind_slug}/{title_slug}"),
    }
}
