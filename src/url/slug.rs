use crate::url::last_path_segment;
use regex::Regex;
use std::sync::LazyLock;

static NON_SLUG_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s-]").expect("hardcoded regex pattern is valid"));
static SEPARATOR_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-\s]+").expect("hardcoded regex pattern is valid"));

/// Converts a title into a URL-safe slug
///
/// Lower-cases the text, strips everything but word characters, whitespace
/// and hyphens, collapses runs of whitespace/hyphens into a single hyphen and
/// trims hyphens from both ends.
///
/// ```
/// use blog_harvest::url::slugify;
///
/// assert_eq!(slugify("Hello, World!"), "hello-world");
/// assert_eq!(slugify("  Tips & Tricks -- 2024 "), "tips-tricks-2024");
/// ```
pub fn slugify(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped = NON_SLUG_CHARS.replace_all(&lowered, "");
    let collapsed = SEPARATOR_RUNS.replace_all(&stripped, "-");
    collapsed.trim_matches('-').to_string()
}

/// Derives a slug from a post URL's trailing path segment, falling back to
/// the slugified title
pub fn derive_slug(url: &str, title: &str) -> String {
    last_path_segment(url)
        .map(|segment| segment.trim_matches('/').to_string())
        .filter(|segment| !segment.is_empty())
        .unwrap_or_else(|| slugify(title))
}
