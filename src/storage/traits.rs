//! Storage traits and error types
//!
//! This module defines the trait interface for collection stores and the
//! associated error types.

use crate::model::Collection;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for collection store implementations
///
/// A store holds exactly one `Collection`. Every `save` replaces the whole
/// persisted collection; there is no append log and no partial update.
/// Stores assume a single writer.
pub trait PostStore: Send {
    /// Loads the persisted collection
    ///
    /// A store that has never been written loads as an empty collection.
    /// Unreadable contents are also reported as an empty collection; only
    /// failures to reach the store at all are errors.
    fn load(&mut self) -> StorageResult<Collection>;

    /// Replaces the persisted collection
    ///
    /// The written `total` always equals the number of posts written.
    fn save(&mut self, collection: &Collection) -> StorageResult<()>;

    /// Human readable location of the store, for logs and reports
    fn location(&self) -> String;
}
