use crate::model::{Collection, Post};

/// Unions a collection with incoming posts by slug
///
/// Existing posts keep their position and win every slug conflict; incoming
/// posts with unseen slugs are appended in their incoming order. Duplicate
/// slugs within either side keep only their first occurrence.
///
/// # Arguments
///
/// * `existing` - The collection as last persisted
/// * `incoming` - Newly completed posts
///
/// # Returns
///
/// The merged collection with `total` recomputed
pub fn merge(existing: Collection, incoming: impl IntoIterator<Item = Post>) -> Collection {
    let mut merged = existing;
    merged.dedup();

    let mut known = merged.slugs();
    for post in incoming {
        if known.insert(post.slug.clone()) {
            merged.posts.push(post);
        }
    }

    merged.total = merged.posts.len();
    merged
}
