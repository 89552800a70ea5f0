//! Listing extractor
//!
//! Turns one listing page into partial post records. Listing markup is not
//! known in advance, so both the choice of candidate nodes and every field
//! lookup are ordered cascades: the first strategy that produces something
//! wins and later strategies are never consulted.
//!
//! Candidate node strategies, in priority order:
//! 1. `<article>` elements
//! 2. `<div>`s whose class mentions post, blog-item, entry or card
//! 3. links wrapped in `<h2>` / `<h3>` headings
//! 4. links pointing at `<listing path>/<slug>` (navigation links excluded)
//! 5. card/item/post `<div>`s holding a heading and a listing link
//!
//! Thumbnails are not downloaded here: each entry carries the resolved image
//! URL and the crawl coordinator hands it to the image acquirer.

use crate::config::ScraperConfig;
use crate::content::{element_text, select_within};
use crate::crawler::dates::resolve_date;
use crate::model::{Post, PostStatus};
use crate::url::{
    derive_slug, is_non_navigational, resolve_link, resolve_post_url, ListingPaths,
};
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use tracing::debug;
use url::Url;

/// Placeholder title emitted by some themes for posts without one
const UNTITLED: &str = "Untitled";

/// Leading title characters compared against link text in the last URL fallback
const TITLE_MATCH_CHARS: usize = 30;

/// Image attributes checked in order; lazy-loading themes leave `src` empty
const IMAGE_ATTRIBUTES: &[&str] = &["src", "data-src", "data-lazy-src"];

/// One post found on a listing page
#[derive(Debug, Clone)]
pub struct ListingEntry {
    /// The partial record; `body` is always empty
    pub post: Post,
    /// Absolute URL of the listing thumbnail, if any
    pub image_url: Option<String>,
}

/// A candidate node strategy
type Strategy = for<'a> fn(&'a Html, &ListingPaths) -> Vec<ElementRef<'a>>;

const STRATEGIES: &[(&str, Strategy)] = &[
    ("article elements", article_elements),
    ("post containers", post_containers),
    ("heading links", heading_links),
    ("listing path links", listing_path_links),
    ("heading cards", heading_cards),
];

/// Extracts partial post records from listing pages
#[derive(Debug, Clone)]
pub struct ListingExtractor {
    base_url: Url,
    paths: ListingPaths,
    default_author: String,
    status: PostStatus,
}

impl ListingExtractor {
    /// Creates an extractor for the listing rooted at `base_url`
    ///
    /// # Arguments
    ///
    /// * `base_url` - Page 1 of the listing; relative links resolve against it
    /// * `config` - Supplies the author sentinel and the status given to posts
    pub fn new(base_url: Url, config: &ScraperConfig) -> Self {
        let paths = ListingPaths::new(&base_url);
        Self {
            base_url,
            paths,
            default_author: config.default_author.clone(),
            status: config.post_status,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Extracts every usable post on a listing page, in document order
    ///
    /// Candidates without a usable title or slug are dropped, as are later
    /// candidates repeating a slug already produced by this call.
    ///
    /// # Example
    ///
    /// ```
    /// use blog_harvest::config::ScraperConfig;
    /// use blog_harvest::crawler::ListingExtractor;
    /// use url::Url;
    ///
    /// let base = Url::parse("https://example.com/blog").unwrap();
    /// let extractor = ListingExtractor::new(base, &ScraperConfig::default());
    /// let html = r#"<article><h2><a href="/blog/hello">Hello</a></h2></article>"#;
    /// let entries = extractor.extract(html);
    /// assert_eq!(entries[0].post.slug, "hello");
    /// assert_eq!(entries[0].post.url, "https://example.com/blog/hello");
    /// ```
    pub fn extract(&self, html: &str) -> Vec<ListingEntry> {
        let document = Html::parse_document(html);
        let candidates = select_candidates(&document, &self.paths);

        let mut seen = HashSet::new();
        let mut entries = Vec::new();

        for (index, node) in candidates.iter().enumerate() {
            let Some(entry) = self.extract_entry(node, &document) else {
                debug!(candidate = index + 1, "Dropped candidate without title or slug");
                continue;
            };

            if !seen.insert(entry.post.slug.clone()) {
                debug!(slug = %entry.post.slug, "Dropped duplicate candidate");
                continue;
            }

            entries.push(entry);
        }

        debug!(
            candidates = candidates.len(),
            extracted = entries.len(),
            "Listing page extracted"
        );
        entries
    }

    fn extract_entry(&self, node: &ElementRef<'_>, document: &Html) -> Option<ListingEntry> {
        let title = extract_title(node)?;

        let url = self
            .extract_href(node, document, &title)
            .and_then(|href| resolve_post_url(&href, &self.base_url))
            .unwrap_or_default();

        let slug = derive_slug(&url, &title);
        if slug.is_empty() {
            return None;
        }

        let mut post = Post::new(title, slug);
        post.url = url;
        post.excerpt = extract_excerpt(node);
        post.published_at = extract_date(node);
        post.author = extract_author(node).unwrap_or_else(|| self.default_author.clone());
        post.categories = extract_labels(node, r#"a[href*="category"]"#, r#"span[class*="category"]"#);
        post.tags = extract_labels(node, r#"a[href*="tag"]"#, r#"span[class*="tag"]"#);
        post.status = self.status;

        Some(ListingEntry {
            post: post.finalize(),
            image_url: self.extract_image_url(node),
        })
    }

    /// Finds the detail link of a candidate
    ///
    /// Tried in order: the node itself, a listing link inside it, any real
    /// link inside it, a listing link around it (parent, then next sibling),
    /// and finally any listing link on the page whose text overlaps the title.
    fn extract_href(&self, node: &ElementRef<'_>, document: &Html, title: &str) -> Option<String> {
        if node.value().name() == "a" {
            if let Some(href) = navigational_href(node) {
                return Some(href);
            }
        }

        if let Some(href) = self.content_link_within(node) {
            return Some(href);
        }

        if let Some(href) = find_first(node, "a[href]").and_then(|link| navigational_href(&link)) {
            return Some(href);
        }

        if let Some(parent) = node.parent().and_then(ElementRef::wrap) {
            if let Some(href) = self.content_link_within(&parent) {
                return Some(href);
            }
        }

        if let Some(sibling) = node.next_siblings().find_map(ElementRef::wrap) {
            if let Some(href) = self.content_link_within(&sibling) {
                return Some(href);
            }
        }

        self.link_matching_title(document, title)
    }

    fn content_link_within(&self, scope: &ElementRef<'_>) -> Option<String> {
        find_all(scope, "a[href]")
            .into_iter()
            .filter_map(|link| navigational_href(&link))
            .find(|href| self.paths.is_content_link(href))
    }

    fn link_matching_title(&self, document: &Html, title: &str) -> Option<String> {
        let needle: String = title
            .chars()
            .take(TITLE_MATCH_CHARS)
            .collect::<String>()
            .to_lowercase();
        let selector = Selector::parse("a[href]").ok()?;

        document.select(&selector).find_map(|link| {
            let text = element_text(&link).to_lowercase();
            if text.is_empty() || !(text.contains(&needle) || needle.contains(&text)) {
                return None;
            }
            navigational_href(&link).filter(|href| self.paths.is_content_link(href))
        })
    }

    fn extract_image_url(&self, node: &ElementRef<'_>) -> Option<String> {
        let image = find_first(node, "img")?;
        IMAGE_ATTRIBUTES
            .iter()
            .filter_map(|attribute| image.value().attr(attribute))
            .map(str::trim)
            .find(|source| !source.is_empty())
            .and_then(|source| resolve_link(source, &self.base_url))
    }
}

/// Runs the candidate strategies in order and returns the first non-empty result
pub fn select_candidates<'a>(document: &'a Html, paths: &ListingPaths) -> Vec<ElementRef<'a>> {
    for (name, strategy) in STRATEGIES {
        let found = strategy(document, paths);
        if !found.is_empty() {
            debug!(strategy = *name, count = found.len(), "Listing strategy matched");
            return found;
        }
    }
    Vec::new()
}

fn article_elements<'a>(document: &'a Html, _paths: &ListingPaths) -> Vec<ElementRef<'a>> {
    select_all(document, "article")
}

fn post_containers<'a>(document: &'a Html, _paths: &ListingPaths) -> Vec<ElementRef<'a>> {
    select_all(
        document,
        r#"div[class*="post"], div[class*="blog-item"], div[class*="entry"], div[class*="card"]"#,
    )
}

fn heading_links<'a>(document: &'a Html, _paths: &ListingPaths) -> Vec<ElementRef<'a>> {
    select_all(document, "h2 a, h3 a")
}

fn listing_path_links<'a>(document: &'a Html, paths: &ListingPaths) -> Vec<ElementRef<'a>> {
    select_all(document, "a[href]")
        .into_iter()
        .filter(|link| {
            link.value()
                .attr("href")
                .is_some_and(|href| paths.is_post_link(href))
        })
        .collect()
}

fn heading_cards<'a>(document: &'a Html, paths: &ListingPaths) -> Vec<ElementRef<'a>> {
    select_all(
        document,
        r#"div[class*="card"], div[class*="item"], div[class*="post"]"#,
    )
    .into_iter()
    .filter(|card| {
        let has_heading = find_first(card, "h1, h2, h3, h4").is_some();
        let has_link = find_all(card, "a[href]").iter().any(|link| {
            link.value()
                .attr("href")
                .is_some_and(|href| paths.is_content_link(href))
        });
        has_heading && has_link
    })
    .collect()
}

fn extract_title(node: &ElementRef<'_>) -> Option<String> {
    let title_element = ["h1", "h2", "h3", r#"a[class*="title"]"#]
        .iter()
        .find_map(|css| find_first(node, css));

    let title = match title_element {
        Some(element) => element_text(&element),
        None if node.value().name() == "a" => element_text(node),
        None => return None,
    };

    if title.is_empty() || title == UNTITLED {
        None
    } else {
        Some(title)
    }
}

fn extract_excerpt(node: &ElementRef<'_>) -> String {
    find_first(node, "p")
        .or_else(|| {
            find_first(
                node,
                r#"div[class*="excerpt"], div[class*="summary"], div[class*="description"]"#,
            )
        })
        .map(|element| element_text(&element))
        .unwrap_or_default()
}

fn extract_date(node: &ElementRef<'_>) -> Option<String> {
    let element = ["time", r#"span[class*="date"]"#, r#"div[class*="date"]"#]
        .iter()
        .find_map(|css| find_first(node, css))?;

    let datetime = element
        .value()
        .attr("datetime")
        .map(str::trim)
        .filter(|value| !value.is_empty());
    let text = element_text(&element);

    if datetime.is_none() && text.is_empty() {
        return None;
    }
    Some(resolve_date(datetime, &text))
}

fn extract_author(node: &ElementRef<'_>) -> Option<String> {
    [
        r#"span[class*="author"]"#,
        r#"div[class*="author"]"#,
        r#"a[class*="author"]"#,
    ]
    .iter()
    .find_map(|css| find_first(node, css))
    .map(|element| element_text(&element))
    .filter(|author| !author.is_empty())
}

/// Link labels if any link matches, otherwise span labels; order and duplicates kept
fn extract_labels(node: &ElementRef<'_>, link_css: &str, span_css: &str) -> Vec<String> {
    let mut elements = find_all(node, link_css);
    if elements.is_empty() {
        elements = find_all(node, span_css);
    }
    elements
        .iter()
        .map(element_text)
        .filter(|label| !label.is_empty())
        .collect()
}

fn navigational_href(link: &ElementRef<'_>) -> Option<String> {
    link.value()
        .attr("href")
        .map(str::trim)
        .filter(|href| !href.is_empty() && !is_non_navigational(href))
        .map(str::to_string)
}

fn select_all<'a>(document: &'a Html, css: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(css) {
        Ok(selector) => document.select(&selector).collect(),
        Err(_) => Vec::new(),
    }
}

fn find_first<'a>(scope: &ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(css).ok()?;
    let found = select_within(scope, &selector).next();
    found
}

fn find_all<'a>(scope: &ElementRef<'a>, css: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(css) {
        Ok(selector) => select_within(scope, &selector).collect(),
        Err(_) => Vec::new(),
    }
}
