//! Statistics over a stored collection
//!
//! This module backs the `--stats` command: it summarizes what the store
//! currently holds without touching the network.

use crate::model::{Collection, PostStatus};
use std::collections::HashMap;

/// How many categories and tags are listed
const TOP_LABELS: usize = 10;

/// Collection statistics summary
#[derive(Debug, Clone, Default)]
pub struct CollectionStats {
    pub total: usize,

    pub with_body: usize,

    pub without_body: usize,

    pub with_thumbnail: usize,

    /// Posts without a detail URL
    pub without_url: usize,

    pub by_status: HashMap<PostStatus, usize>,

    /// Most frequent categories, most frequent first
    pub top_categories: Vec<(String, usize)>,

    /// Most frequent tags, most frequent first
    pub top_tags: Vec<(String, usize)>,

    pub scraped_at: String,

    pub source_url: String,
}

impl CollectionStats {
    /// Computes statistics for a collection
    pub fn from_collection(collection: &Collection) -> Self {
        let mut stats = Self {
            total: collection.len(),
            scraped_at: collection.scraped_at.clone(),
            source_url: collection.source_url.clone(),
            ..Default::default()
        };

        let mut categories: HashMap<&str, usize> = HashMap::new();
        let mut tags: HashMap<&str, usize> = HashMap::new();

        for post in &collection.posts {
            if post.has_body() {
                stats.with_body += 1;
            } else {
                stats.without_body += 1;
            }
            if post.thumbnail_path.is_some() {
                stats.with_thumbnail += 1;
            }
            if post.url.is_empty() {
                stats.without_url += 1;
            }
            *stats.by_status.entry(post.status).or_insert(0) += 1;

            for category in &post.categories {
                *categories.entry(category.as_str()).or_insert(0) += 1;
            }
            for tag in &post.tags {
                *tags.entry(tag.as_str()).or_insert(0) += 1;
            }
        }

        stats.top_categories = most_frequent(categories);
        stats.top_tags = most_frequent(tags);
        stats
    }
}

/// Sorts by count descending, then by name, keeping the first `TOP_LABELS`
fn most_frequent(counts: HashMap<&str, usize>) -> Vec<(String, usize)> {
    let mut sorted: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(label, count)| (label.to_string(), count))
        .collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    sorted.truncate(TOP_LABELS);
    sorted
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CollectionStats) {
    println!("=== Collection Statistics ===\n");

    println!("Overview:");
    println!("  Source: {}", display_or_dash(&stats.source_url));
    println!("  Last scraped: {}", display_or_dash(&stats.scraped_at));
    println!("  Total posts: {}", stats.total);
    println!();

    println!("Content:");
    println!(
        "  With body: {} ({:.1}%)",
        stats.with_body,
        percentage(stats.with_body, stats.total)
    );
    println!("  Without body: {}", stats.without_body);
    println!("  With thumbnail: {}", stats.with_thumbnail);
    if stats.without_url > 0 {
        println!("  Without URL: {}", stats.without_url);
    }
    println!();

    println!("Posts by Status:");
    for status in [PostStatus::Draft, PostStatus::Published] {
        let count = stats.by_status.get(&status).copied().unwrap_or(0);
        println!("  {}: {}", status, count);
    }
    println!();

    if !stats.top_categories.is_empty() {
        println!("Top Categories:");
        for (label, count) in &stats.top_categories {
            println!("  - {} ({})", label, count);
        }
        println!();
    }

    if !stats.top_tags.is_empty() {
        println!("Top Tags:");
        for (label, count) in &stats.top_tags {
            println!("  - {} ({})", label, count);
        }
        println!();
    }
}

fn percentage(part: usize, total: usize) -> f64 {
    if total > 0 {
        (part as f64 / total as f64) * 100.0
    } else {
        0.0
    }
}

fn display_or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}
