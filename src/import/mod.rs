//! Database import
//!
//! An alternate post source: rows from an existing site database are mapped
//! to draft posts and merged into the store like freshly scraped ones.

mod credentials;
mod mysql;

pub use credentials::{
    load_credentials, save_credentials, DbCredentials, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_TABLE,
};
pub use mysql::{fetch_posts, ImportedRow};

use crate::model::Post;
use crate::storage::{merge, PostStore, StorageResult};
use tracing::info;

/// Outcome of merging imported posts into a store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportOutcome {
    /// Posts read from the source
    pub fetched: usize,
    /// Posts whose slug was new to the store
    pub added: usize,
    /// Collection size after the import
    pub total: usize,
}

/// Merges imported posts into a store and saves it
///
/// # Arguments
///
/// * `store` - The collection store
/// * `posts` - Imported posts
/// * `source_url` - Recorded as the collection source when the store is new
pub fn import_into_store(
    store: &mut dyn PostStore,
    posts: Vec<Post>,
    source_url: &str,
) -> StorageResult<ImportOutcome> {
    let fetched = posts.len();
    let existing = store.load()?;
    let before = existing.len();
    let keep_source = if existing.source_url.is_empty() {
        source_url.to_string()
    } else {
        existing.source_url.clone()
    };

    let mut merged = merge(existing, posts);
    merged.stamp(&keep_source);
    store.save(&merged)?;

    let outcome = ImportOutcome {
        fetched,
        added: merged.len() - before,
        total: merged.len(),
    };
    info!(
        fetched = outcome.fetched,
        added = outcome.added,
        total = outcome.total,
        location = %store.location(),
        "Imported posts"
    );
    Ok(outcome)
}
