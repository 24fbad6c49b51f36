// Error types shared by the entity and the store.

use std::path::PathBuf;
use thiserror::Error;

/// Input rejected while constructing or updating a `TaxPayer`.
///
/// Always raised before any write is attempted, so stored state is never
/// affected by it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("title cannot be empty")]
    EmptyTitle,

    #[error("'{0}' is not a valid tax number (VKN or TCKN)")]
    InvalidTaxNumber(String),
}

/// Failure reported by the taxpayer store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The entity handed to a write did not pass validation
    #[error("refusing to store invalid taxpayer: {0}")]
    Validation(#[from] ValidationError),

    /// SQLite failure: locked/busy file, constraint, schema problems
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored row no longer satisfies the entity rules
    #[error("stored taxpayer '{tax_number}' is corrupt: {source}")]
    CorruptRow {
        tax_number: String,
        #[source]
        source: ValidationError,
    },

    #[error("unreadable last-update timestamp '{0}'")]
    InvalidTimestamp(String),

    #[error("backup file already exists: {0}")]
    BackupExists(PathBuf),
}

pub type StoreResult<T> = Result<T, StoreError>;
