//! Vocabulary of markup that never belongs to a post body

use scraper::node::Element;

/// Class tokens marking advertising, sharing, comment, navigation and meta blocks
pub const NOISE_CLASSES: &[&str] = &[
    "ad",
    "ads",
    "advertisement",
    "related",
    "share",
    "share-buttons",
    "comment",
    "comments",
    "sidebar",
    "widget",
    "social-share",
    "author-box",
    "post-meta",
    "breadcrumb",
    "pagination",
    "navigation",
    "tags",
    "categories",
];

/// Page chrome that surrounds, but is never part of, the article text
pub const STRUCTURAL_TAGS: &[&str] = &["nav", "header", "footer", "aside"];

/// Elements whose text content is code or markup rather than prose
pub const SCRIPT_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// True when any class token of the element is in the noise vocabulary
pub fn has_noise_class(element: &Element) -> bool {
    element
        .classes()
        .any(|class| NOISE_CLASSES.contains(&class.to_ascii_lowercase().as_str()))
}

/// True for elements dropped before measuring a candidate content region
pub fn is_region_noise(element: &Element) -> bool {
    let name = element.name();
    STRUCTURAL_TAGS.contains(&name) || SCRIPT_TAGS.contains(&name) || has_noise_class(element)
}
