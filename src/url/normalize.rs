use url::Url;

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - fragment-only links
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
///
/// # Examples
///
/// ```
/// use blog_harvest::url::resolve_link;
/// use url::Url;
///
/// let base = Url::parse("https://example.com/blog").unwrap();
/// assert_eq!(
///     resolve_link("/blog/hello", &base).as_deref(),
///     Some("https://example.com/blog/hello")
/// );
/// assert_eq!(resolve_link("javascript:void(0)", &base), None);
/// ```
pub fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || is_non_navigational(href) {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) => {
            if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
                Some(absolute_url.to_string())
            } else {
                None
            }
        }
        Err(_) => None,
    }
}

/// True for hrefs that never lead to a document: anchors and script/contact schemes
pub fn is_non_navigational(href: &str) -> bool {
    let href = href.trim();
    href.starts_with('#')
        || href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
}

/// Strips the query string and fragment from an href
///
/// ```
/// use blog_harvest::url::strip_query_and_fragment;
///
/// assert_eq!(strip_query_and_fragment(" /blog/a?utm=1#top "), "/blog/a");
/// ```
pub fn strip_query_and_fragment(href: &str) -> &str {
    let end = href.find(['?', '#']).unwrap_or(href.len());
    href[..end].trim()
}

/// Resolves a post link the way listing URLs are recorded: query and
/// fragment dropped, then made absolute against the listing URL
pub fn resolve_post_url(href: &str, base_url: &Url) -> Option<String> {
    let cleaned = strip_query_and_fragment(href);
    if cleaned.is_empty() {
        return None;
    }
    resolve_link(cleaned, base_url)
}

/// Returns the last non-empty path segment of an absolute URL
pub fn last_path_segment(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    parsed
        .path_segments()?
        .filter(|segment| !segment.is_empty())
        .last()
        .map(|segment| segment.to_string())
}
