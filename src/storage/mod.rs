//! Storage module for persisting the post collection
//!
//! This module handles everything between the crawler and disk:
//! - The `PostStore` trait and its JSON file and SQLite backends
//! - Merging newly scraped posts into a stored collection by slug
//! - Picking the configured backend

mod json;
mod merge;
mod schema;
mod sqlite;
mod traits;

pub use json::JsonFileStore;
pub use merge::merge;
pub use sqlite::SqliteStore;
pub use traits::{PostStore, StorageError, StorageResult};

use crate::config::{OutputConfig, StoreBackend};

/// Opens the store selected by the output configuration
///
/// # Arguments
///
/// * `output` - The output section of the configuration
///
/// # Returns
///
/// * `Ok(Box<dyn PostStore>)` - The opened store
/// * `Err(StorageError)` - The SQLite database could not be opened
pub fn open_store(output: &OutputConfig) -> StorageResult<Box<dyn PostStore>> {
    let path = output.collection_path();
    match output.backend {
        StoreBackend::Json => Ok(Box::new(JsonFileStore::new(path))),
        StoreBackend::Sqlite => Ok(Box::new(SqliteStore::new(&path)?)),
    }
}
