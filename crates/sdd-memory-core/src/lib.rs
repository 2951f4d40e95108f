//! # SDD Memory Core
//!
//! Persistent cross-session memory engine for a spec-driven-development
//! assistant: a durable observation store, a typed relation graph, and
//! progressive-disclosure read contracts.
//!
//! An `Observation` is the primary unit of memory — a decision, an
//! architecture note, a bug fix, a discovery — written once and read
//! back across sessions. Observations can be linked into a directed
//! `Relation` graph, traversed breadth-first via `GraphEngine`. Reads
//! go through `QueryEngine` (search, recency context, time-windowed
//! timeline, stats, compaction) and are shaped by `shaper` into one of
//! three detail levels with an explicit token budget.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use sdd_memory_core::{AddObservationParams, Scope, Storage, StoreConfig};
//!
//! # fn main() -> sdd_memory_core::Result<()> {
//! let storage = Storage::open(StoreConfig::default())?;
//! let id = storage.add_observation(AddObservationParams {
//!     session_id: None,
//!     kind: "decision".to_string(),
//!     title: "Use SQLite for the memory store".to_string(),
//!     content: "Embedded, zero-ops, FTS5 gives us search for free.".to_string(),
//!     project: Some("sdd-memory".to_string()),
//!     scope: Scope::Project,
//!     namespace: None,
//!     topic_key: Some("architecture/sdd-memory/storage".to_string()),
//! })?;
//! let observation = storage.get_observation(id)?;
//! assert_eq!(observation.revision_count, 1);
//! # Ok(())
//! # }
//! ```

pub mod bridges;
pub mod error;
pub mod graph;
pub mod model;
pub mod query;
pub mod session;
pub mod shaper;
pub mod storage;
pub mod tokens;
pub mod util;

pub use error::{MemoryError, Result};
pub use graph::{ContextNode, ContextResult, GraphEngine};
pub use model::{
    observation_types, relation_types, AddObservationParams, Direction, ListFilters, Observation,
    Relation, Scope, Session, UpdateObservationFields, UserPrompt, DetailLevel, MANUAL_SAVE_SESSION,
};
pub use query::{CompactResult, QueryEngine, Stats};
pub use session::{progress, SessionLifecycle};
pub use storage::{ExportSnapshot, ImportReport, StoreConfig, Storage};
pub use tokens::{estimate_tokens, token_footer};

/// Crate version, surfaced by the MCP server's `--version` flag.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Convenient imports for the common path: open a store, wrap it in
/// the three engines that read/write it.
pub mod prelude {
    pub use crate::{
        AddObservationParams, DetailLevel, GraphEngine, ListFilters, MANUAL_SAVE_SESSION,
        MemoryError, Observation, QueryEngine, Relation, Result, Scope, Session, SessionLifecycle,
        Storage, StoreConfig,
    };
}
