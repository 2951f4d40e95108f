//! Graph Engine.
//!
//! Thin mutation wrappers over `Storage`'s relation table plus the one
//! piece of real graph logic: `BuildContext`'s breadth-first traversal
//! (spec.md §4.3).

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::Result;
use crate::model::{Direction, Relation};
use crate::storage::Storage;

const DEFAULT_DEPTH: u32 = 2;
const MAX_DEPTH: u32 = 5;

/// Light metadata for a node reached during traversal — deliberately
/// thin; callers fetch full content via `GetObservation`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextNode {
    pub id: i64,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub project: Option<String>,
    pub created_at: DateTime<Utc>,
    pub relation_type: String,
    pub direction: Direction,
    pub depth: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextResult {
    pub root: i64,
    pub connected: Vec<ContextNode>,
    pub total_nodes: usize,
    pub max_depth_reached: u32,
}

pub struct GraphEngine {
    storage: Arc<Storage>,
}

impl GraphEngine {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }

    pub fn add_relation(&self, from: i64, to: i64, kind: &str, note: Option<&str>, bidirectional: bool) -> Result<Vec<i64>> {
        self.storage.add_relation(from, to, kind, note, bidirectional)
    }

    pub fn remove_relation(&self, id: i64) -> Result<()> {
        self.storage.remove_relation(id)
    }

    pub fn get_relations(&self, observation_id: i64) -> Result<Vec<Relation>> {
        self.storage.get_relations(observation_id)
    }

    /// Clamps depth ≤ 0 to the default and depth > 5 to the max, per
    /// spec.md §4.3.
    fn clamp_depth(depth: i64) -> u32 {
        if depth <= 0 {
            DEFAULT_DEPTH
        } else if depth as u32 > MAX_DEPTH {
            MAX_DEPTH
        } else {
            depth as u32
        }
    }

    /// Breadth-first traversal from `root`. Soft-deleted endpoints stay
    /// visible — the graph preserves historical structure even after
    /// the observation itself is gone from live views.
    pub fn build_context(&self, root: i64, depth: i64) -> Result<ContextResult> {
        // Confirm the root exists at all (hard-deleted roots are NotFound).
        self.storage.get_observation(root)?;

        let max_depth = Self::clamp_depth(depth);
        let mut visited: HashSet<i64> = HashSet::new();
        visited.insert(root);
        let mut queue: VecDeque<(i64, u32)> = VecDeque::new();
        queue.push_back((root, 0));
        let mut connected = Vec::new();
        let mut max_depth_reached = 0;

        while let Some((node, d)) = queue.pop_front() {
            if d >= max_depth {
                continue;
            }
            let relations = self.storage.get_relations(node)?;
            for relation in relations {
                let (other, direction) = if relation.from_id == node {
                    (relation.to_id, Direction::Outgoing)
                } else {
                    (relation.from_id, Direction::Incoming)
                };

                if visited.contains(&other) {
                    continue;
                }
                visited.insert(other);
                let node_depth = d + 1;
                let observation = self.storage.get_observation(other)?;
                connected.push(ContextNode {
                    id: other,
                    title: observation.title,
                    kind: observation.kind,
                    project: observation.project,
                    created_at: observation.created_at,
                    relation_type: relation.kind.clone(),
                    direction,
                    depth: node_depth,
                });
                max_depth_reached = max_depth_reached.max(node_depth);
                queue.push_back((other, node_depth));
            }
        }

        Ok(ContextResult {
            root,
            total_nodes: connected.len(),
            connected,
            max_depth_reached,
        })
    }
}
