//! Post record definitions
//!
//! A `Post` is created by the listing extractor without a body, completed by
//! the detail fetcher and never modified once it joins a collection.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator used when tags are folded into `meta_keywords`
pub const KEYWORD_SEPARATOR: &str = ", ";

/// Publication status of a post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Draft,
    Published,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_kind() -> String {
    "post".to_string()
}

/// A single blog post
///
/// Field names serialize in snake_case, matching the collection file format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    #[serde(default)]
    pub title: String,

    /// Identity key across the whole collection
    #[serde(default)]
    pub slug: String,

    /// Absolute URL of the detail page; empty when it could not be discovered
    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub excerpt: String,

    /// ISO-8601 timestamp; always `None` for drafts
    #[serde(default)]
    pub published_at: Option<String>,

    #[serde(default)]
    pub author: String,

    /// Path relative to the output directory, e.g. `images/my-post.jpg`
    #[serde(default)]
    pub thumbnail_path: Option<String>,

    #[serde(default)]
    pub categories: Vec<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    /// Sanitized HTML
    #[serde(default)]
    pub body: String,

    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,

    #[serde(default)]
    pub status: PostStatus,

    #[serde(default)]
    pub is_featured: bool,

    #[serde(default)]
    pub price: Option<f64>,

    #[serde(default)]
    pub og_image: Option<String>,

    #[serde(default)]
    pub redirect_url: Option<String>,

    #[serde(default)]
    pub meta_title: Option<String>,

    #[serde(default)]
    pub meta_description: Option<String>,

    #[serde(default)]
    pub meta_keywords: Option<String>,
}

impl Post {
    /// Creates an empty post with the given identity
    pub fn new(title: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            slug: slug.into(),
            url: String::new(),
            excerpt: String::new(),
            published_at: None,
            author: String::new(),
            thumbnail_path: None,
            categories: Vec::new(),
            tags: Vec::new(),
            body: String::new(),
            kind: default_kind(),
            status: PostStatus::Draft,
            is_featured: false,
            price: None,
            og_image: None,
            redirect_url: None,
            meta_title: None,
            meta_description: None,
            meta_keywords: None,
        }
    }

    /// Fills the derived fields and enforces the record invariants
    ///
    /// - `og_image` falls back to `thumbnail_path`
    /// - `meta_title` / `meta_description` come from title / excerpt
    /// - `meta_keywords` is the joined tag list, or `None` without tags
    /// - drafts never carry `published_at`
    pub fn finalize(mut self) -> Self {
        if self.og_image.is_none() {
            self.og_image = self.thumbnail_path.clone();
        }
        self.meta_title = Some(self.title.clone());
        self.meta_description = Some(self.excerpt.clone());
        self.meta_keywords = if self.tags.is_empty() {
            None
        } else {
            Some(self.tags.join(KEYWORD_SEPARATOR))
        };
        self.enforce_status();
        self
    }

    /// Clears `published_at` for drafts
    pub fn enforce_status(&mut self) {
        if self.status == PostStatus::Draft {
            self.published_at = None;
        }
    }

    pub fn has_body(&self) -> bool {
        !self.body.trim().is_empty()
    }
}
