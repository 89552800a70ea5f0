//! MySQL import source
//!
//! Reads the `post` rows of an existing site database and maps them to the
//! scraped `Post` shape. Imported posts are always drafts.

use crate::import::credentials::DbCredentials;
use crate::model::{Post, PostStatus};
use crate::url::slugify;
use sqlx::mysql::MySqlPoolOptions;
use sqlx::FromRow;
use std::time::Duration;
use tracing::{debug, info, warn};

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);

/// One row of the source table
///
/// Numeric columns are cast in the query so their decoded types do not
/// depend on the column definitions of a particular schema.
#[derive(Debug, Clone, Default, FromRow)]
pub struct ImportedRow {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    pub body: Option<String>,
    pub price: Option<f64>,
    pub thumbnail_path: Option<String>,
    pub og_image: Option<String>,
    pub is_featured: i64,
    pub redirect_url: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_keywords: Option<String>,
}

impl ImportedRow {
    /// Maps the row to a draft post
    ///
    /// A missing slug is derived from the title; rows with neither are
    /// skipped. Categories and tags are not imported.
    pub fn into_post(self) -> Option<Post> {
        let title = self.title.unwrap_or_default().trim().to_string();
        let slug = self
            .slug
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| slugify(&title));
        if slug.is_empty() {
            return None;
        }

        let mut post = Post::new(title, slug);
        post.excerpt = self.excerpt.unwrap_or_default();
        post.body = self.body.unwrap_or_default();
        post.price = self.price;
        post.thumbnail_path = self.thumbnail_path;
        post.og_image = self.og_image;
        post.is_featured = self.is_featured != 0;
        post.redirect_url = self.redirect_url;
        post.meta_title = self.meta_title;
        post.meta_description = self.meta_description;
        post.meta_keywords = self.meta_keywords;
        post.status = PostStatus::Draft;
        post.published_at = None;
        Some(post)
    }
}

fn select_posts_query(table_name: &str) -> String {
    format!(
        "SELECT title, slug, excerpt, body, \
                CAST(price AS DOUBLE) AS price, thumbnail_path, og_image, \
                CAST(COALESCE(is_featured, 0) AS SIGNED) AS is_featured, \
                redirect_url, meta_title, meta_description, meta_keywords \
         FROM {} \
         WHERE type = 'post' \
         ORDER BY created_at DESC",
        table_name
    )
}

/// Fetches every post row, newest first
///
/// Credentials are validated before any connection is attempted.
///
/// # Returns
///
/// * `Ok(Vec<Post>)` - The mapped posts
/// * `Err(HarvestError::Config)` - Incomplete or unsafe credentials
/// * `Err(HarvestError::Import)` - Connection or query failure
pub async fn fetch_posts(credentials: &DbCredentials) -> crate::Result<Vec<Post>> {
    credentials.validate()?;

    info!(
        host = %credentials.host,
        database = %credentials.database,
        table = %credentials.table_name,
        "Connecting to import database"
    );
    let pool = MySqlPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect_with(credentials.connect_options())
        .await?;

    let query = select_posts_query(&credentials.table_name);
    debug!(query = %query, "Selecting posts");
    let rows = sqlx::query_as::<_, ImportedRow>(&query)
        .fetch_all(&pool)
        .await;
    pool.close().await;
    let rows = rows?;

    let fetched = rows.len();
    let posts: Vec<Post> = rows.into_iter().filter_map(ImportedRow::into_post).collect();
    if posts.len() < fetched {
        warn!(skipped = fetched - posts.len(), "Skipped rows without title or slug");
    }

    info!(posts = posts.len(), "Fetched posts from database");
    Ok(posts)
}
