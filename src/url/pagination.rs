use url::Url;

/// Builds the URL of a listing page using the path convention
///
/// Page 1 is the bare listing URL; later pages append `/page/<n>`.
///
/// ```
/// use blog_harvest::url::page_url;
///
/// assert_eq!(page_url("https://example.com/blog", 1), "https://example.com/blog");
/// assert_eq!(page_url("https://example.com/blog/", 3), "https://example.com/blog/page/3");
/// ```
pub fn page_url(base_url: &str, page: u32) -> String {
    if page <= 1 {
        return base_url.to_string();
    }
    format!("{}/page/{}", base_url.trim_end_matches('/'), page)
}

/// Builds the URL of a listing page using the `?page=<n>` query convention
///
/// Only consulted when the path convention yields no posts.
pub fn alt_page_url(base_url: &str, page: u32) -> String {
    match Url::parse(base_url) {
        Ok(mut url) => {
            url.query_pairs_mut()
                .append_pair("page", &page.to_string());
            url.to_string()
        }
        Err(_) => format!("{}?page={}", base_url, page),
    }
}
