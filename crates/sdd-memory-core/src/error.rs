//! Error types for the memory engine.

/// Result type returned by every memory-engine operation.
pub type Result<T> = std::result::Result<T, MemoryError>;

/// Error kinds the core uses. Propagation policy: CRUD methods return
/// these; bridges catch and log every variant (they never propagate);
/// tool contracts translate them into user-visible text.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
    /// Caller's fault — missing/empty required field, unknown detail level,
    /// malformed id, unsanitizable query.
    #[error("{0}")]
    InvalidArgument(String),

    /// The row does not exist, or exists but is hard-deleted.
    #[error("not found: {0}")]
    NotFound(String),

    /// Unique constraint violation: duplicate relation, or a topic-key
    /// upsert landing on a mismatched scope.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// Underlying storage error, message preserved verbatim.
    #[error("internal error: {0}")]
    Internal(String),

    /// Database error, converted to `Internal` at the tool-contract
    /// boundary but kept distinct here so storage code can `?` it.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl MemoryError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn already_exists(msg: impl Into<String>) -> Self {
        Self::AlreadyExists(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// A one-line, human-readable message distinguishing a caller
    /// mistake from an internal failure, per spec.md §7.
    pub fn user_message(&self) -> String {
        match self {
            MemoryError::InvalidArgument(m) => m.clone(),
            MemoryError::NotFound(m) => format!("not found: {m}"),
            MemoryError::AlreadyExists(m) => format!("already exists: {m}"),
            MemoryError::Internal(m) => format!("could not complete request: {m}"),
            MemoryError::Database(e) => format!("could not complete request: {e}"),
            MemoryError::Io(e) => format!("could not complete request: {e}"),
        }
    }
}
