//! Storage layer.
//!
//! SQLite-based durable store: schema migrations, FTS5-backed text
//! index, and the `Storage` type that owns every row.

mod migrations;
mod sqlite;

pub use migrations::{Migration, MIGRATIONS};
pub use sqlite::{ExportSnapshot, ImportReport, StoreConfig, Storage};
