//! SQLite collection store
//!
//! Posts are stored one row each, serialized as JSON, with their position in
//! the collection. Saving rewrites every row inside a single transaction.

use crate::model::{Collection, Post, COLLECTION_VERSION};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{PostStore, StorageResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// SQLite storage backend
pub struct SqliteStore {
    conn: Connection,
    path: Option<PathBuf>,
}

impl SqliteStore {
    /// Opens or creates a store database
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStore)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;
        initialize_schema(&conn)?;

        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn, path: None })
    }

    fn meta(&self, key: &str) -> StorageResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM collection_meta WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }
}

impl PostStore for SqliteStore {
    fn load(&mut self) -> StorageResult<Collection> {
        let mut stmt = self
            .conn
            .prepare("SELECT slug, data FROM posts ORDER BY position ASC")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        drop(stmt);

        let mut posts = Vec::with_capacity(rows.len());
        for (slug, data) in rows {
            match serde_json::from_str::<Post>(&data) {
                Ok(post) => posts.push(post),
                Err(e) => warn!(slug = %slug, error = %e, "Skipping unreadable post row"),
            }
        }

        let mut collection = Collection {
            version: self
                .meta("version")?
                .unwrap_or_else(|| COLLECTION_VERSION.to_string()),
            scraped_at: self.meta("scraped_at")?.unwrap_or_default(),
            source_url: self.meta("source_url")?.unwrap_or_default(),
            total: 0,
            posts,
        };
        collection.dedup();

        debug!(location = %self.location(), posts = collection.len(), "Loaded collection");
        Ok(collection)
    }

    fn save(&mut self, collection: &Collection) -> StorageResult<()> {
        let tx = self.conn.transaction()?;

        tx.execute("DELETE FROM posts", [])?;
        {
            let mut insert = tx.prepare(
                "INSERT OR IGNORE INTO posts (slug, position, data) VALUES (?1, ?2, ?3)",
            )?;
            for (position, post) in collection.posts.iter().enumerate() {
                let data = serde_json::to_string(post)?;
                insert.execute(params![post.slug, position as i64, data])?;
            }

            let mut meta = tx.prepare(
                "INSERT OR REPLACE INTO collection_meta (key, value) VALUES (?1, ?2)",
            )?;
            meta.execute(params!["version", collection.version])?;
            meta.execute(params!["scraped_at", collection.scraped_at])?;
            meta.execute(params!["source_url", collection.source_url])?;
        }
        tx.commit()?;

        debug!(location = %self.location(), posts = collection.len(), "Saved collection");
        Ok(())
    }

    fn location(&self) -> String {
        match &self.path {
            Some(path) => path.display().to_string(),
            None => ":memory:".to_string(),
        }
    }
}
