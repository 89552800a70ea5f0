//! URL handling for the listing crawl
//!
//! This module resolves hrefs found in listing and detail pages, recognises
//! which links belong to the listing, builds pagination URLs and derives
//! post slugs.

mod matcher;
mod normalize;
mod pagination;
mod slug;

pub use matcher::ListingPaths;
pub use normalize::{
    is_non_navigational, last_path_segment, resolve_link, resolve_post_url,
    strip_query_and_fragment,
};
pub use pagination::{alt_page_url, page_url};
pub use slug::{derive_slug, slugify};
