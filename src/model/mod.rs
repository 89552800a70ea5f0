//! Data model shared by the extractor, the stores and the import path

mod collection;
mod post;

pub use collection::{Collection, COLLECTION_VERSION};
pub use post::{Post, PostStatus, KEYWORD_SEPARATOR};
