use regex::Regex;
use url::Url;

/// Path rules derived from the listing URL
///
/// A listing at `https://example.com/blog` has the prefix `/blog`; post
/// links look like `/blog/<slug>` while `/blog/page/2`, `/blog/category/x`
/// and `/blog/tag/y` are navigation.
#[derive(Debug, Clone)]
pub struct ListingPaths {
    prefix: String,
    post_link: Regex,
    navigation_link: Regex,
}

impl ListingPaths {
    /// Builds the matchers for a listing URL
    ///
    /// # Arguments
    ///
    /// * `listing_url` - The first listing page, e.g. `https://example.com/blog/`
    pub fn new(listing_url: &Url) -> Self {
        let prefix = listing_url.path().trim_end_matches('/').to_string();
        let escaped = regex::escape(&prefix);

        let post_link = Regex::new(&format!(r"{escaped}/[^/?#]+/?$"))
            .expect("escaped prefix is a valid pattern");
        let navigation_link = Regex::new(&format!(r"{escaped}/(page|category|tag)(/|$)"))
            .expect("escaped prefix is a valid pattern");

        Self {
            prefix,
            post_link,
            navigation_link,
        }
    }

    /// The listing path without its trailing slash; empty for a root listing
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// True when the href points at an individual post under the listing
    ///
    /// ```
    /// use blog_harvest::url::ListingPaths;
    /// use url::Url;
    ///
    /// let paths = ListingPaths::new(&Url::parse("https://example.com/blog").unwrap());
    /// assert!(paths.is_post_link("/blog/my-post"));
    /// assert!(!paths.is_post_link("/blog/page/2"));
    /// assert!(!paths.is_post_link("/blog/"));
    /// ```
    pub fn is_post_link(&self, href: &str) -> bool {
        let href = href.trim();
        if self.is_listing_root(href) || self.navigation_link.is_match(href) {
            return false;
        }
        self.post_link.is_match(href)
    }

    /// True when the href lies anywhere under the listing path or under `/post/`
    pub fn is_content_link(&self, href: &str) -> bool {
        let href = href.trim();
        href.contains(&format!("{}/", self.prefix)) || href.contains("/post/")
    }

    fn is_listing_root(&self, href: &str) -> bool {
        let path = match Url::parse(href) {
            Ok(url) => url.path().to_string(),
            Err(_) => href.to_string(),
        };
        path.trim_end_matches('/') == self.prefix
    }
}
