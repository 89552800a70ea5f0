//! JSON document store
//!
//! The whole collection lives in one pretty-printed JSON file that is
//! rewritten on every save. Writes go to a sibling temporary file which is
//! then renamed over the target, so an interrupted save leaves the previous
//! collection intact.

use crate::model::{Collection, Post};
use crate::storage::traits::{PostStore, StorageResult};
use serde::Serialize;
use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

/// On-disk layout of the collection; `total` is always derived
#[derive(Serialize)]
struct CollectionFile<'a> {
    version: &'a str,
    scraped_at: &'a str,
    source_url: &'a str,
    total: usize,
    posts: &'a [Post],
}

impl<'a> From<&'a Collection> for CollectionFile<'a> {
    fn from(collection: &'a Collection) -> Self {
        Self {
            version: &collection.version,
            scraped_at: &collection.scraped_at,
            source_url: &collection.source_url,
            total: collection.posts.len(),
            posts: &collection.posts,
        }
    }
}

/// Collection store backed by a single JSON file
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(suffix);
        PathBuf::from(name)
    }

    /// Moves an unreadable collection file aside so the next save cannot
    /// overwrite it
    fn quarantine(&self) -> StorageResult<PathBuf> {
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        let target = self.sibling(&format!(".corrupt-{}", stamp));
        fs::rename(&self.path, &target)?;
        Ok(target)
    }
}

impl PostStore for JsonFileStore {
    fn load(&mut self) -> StorageResult<Collection> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No collection file yet");
                return Ok(Collection::default());
            }
            Err(e) => return Err(e.into()),
        };

        if raw.trim().is_empty() {
            return Ok(Collection::default());
        }

        match serde_json::from_str::<Collection>(&raw) {
            Ok(mut collection) => {
                collection.dedup();
                debug!(path = %self.path.display(), posts = collection.len(), "Loaded collection");
                Ok(collection)
            }
            Err(e) => {
                let moved_to = self.quarantine()?;
                warn!(
                    path = %self.path.display(),
                    moved_to = %moved_to.display(),
                    error = %e,
                    "Collection file is malformed; starting from an empty collection"
                );
                Ok(Collection::default())
            }
        }
    }

    fn save(&mut self, collection: &Collection) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(&CollectionFile::from(collection))?;
        let temp = self.sibling(".tmp");
        fs::write(&temp, json)?;
        fs::rename(&temp, &self.path)?;

        debug!(path = %self.path.display(), posts = collection.len(), "Saved collection");
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
