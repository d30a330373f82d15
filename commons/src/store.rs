//! Storage-fault vocabulary shared by every per-service store.
//!
//! Stores translate their backend's failures into these variants; the
//! services then map them onto their own caller-facing error taxonomy
//! (persistence fault, not-found, conflict).

use thiserror::Error;

/// Faults a store can raise.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing database reported a failure
    #[error("database error: {0}")]
    Database(String),

    /// No active row matched the lookup key
    #[error("row not found")]
    RowNotFound,

    /// A version-conditional update matched no row: the row changed (or was
    /// deactivated) between lookup and mutation
    #[error("version conflict: row was modified concurrently")]
    VersionConflict,

    /// A uniqueness constraint was violated
    #[error("duplicate key: {0}")]
    DuplicateKey(String),
}

impl StoreError {
    /// Maps a sqlx error onto the store vocabulary.
    ///
    /// Unique-constraint violations become [`StoreError::DuplicateKey`];
    /// `RowNotFound` keeps its meaning; everything else is an opaque
    /// [`StoreError::Database`].
    #[must_use]
    pub fn from_sqlx(err: &sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::RowNotFound,
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Self::DuplicateKey(db.constraint().unwrap_or("unknown").to_string())
            },
            other => Self::Database(other.to_string()),
        }
    }
}
