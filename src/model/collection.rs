//! The persisted post collection
//!
//! `Collection` is the whole payload written by a store: a small header plus
//! the ordered post list. `total` always mirrors `posts.len()` when written.

use crate::model::Post;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Format version written into every collection
pub const COLLECTION_VERSION: &str = "1.0";

fn default_version() -> String {
    COLLECTION_VERSION.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default)]
    pub scraped_at: String,

    #[serde(default)]
    pub source_url: String,

    #[serde(default)]
    pub total: usize,

    #[serde(default)]
    pub posts: Vec<Post>,
}

impl Default for Collection {
    fn default() -> Self {
        Self::empty("")
    }
}

impl Collection {
    /// An empty collection for the given listing
    pub fn empty(source_url: impl Into<String>) -> Self {
        Self {
            version: default_version(),
            scraped_at: String::new(),
            source_url: source_url.into(),
            total: 0,
            posts: Vec::new(),
        }
    }

    /// Slugs currently held, in no particular order
    pub fn slugs(&self) -> HashSet<String> {
        self.posts.iter().map(|p| p.slug.clone()).collect()
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.posts.iter().any(|p| p.slug == slug)
    }

    pub fn get(&self, slug: &str) -> Option<&Post> {
        self.posts.iter().find(|p| p.slug == slug)
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// Stamps the collection for writing: fresh timestamp, `total` recomputed
    pub fn stamp(&mut self, source_url: &str) {
        self.scraped_at = Utc::now().to_rfc3339();
        if !source_url.is_empty() {
            self.source_url = source_url.to_string();
        }
        self.total = self.posts.len();
    }

    /// Drops later posts whose slug was already seen, keeping first occurrences
    pub fn dedup(&mut self) {
        let mut seen = HashSet::new();
        self.posts.retain(|p| seen.insert(p.slug.clone()));
        self.total = self.posts.len();
    }
}
