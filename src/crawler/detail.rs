//! Detail fetcher
//!
//! Locates the article body on a post page and returns it sanitized. The
//! region search is a cascade, most specific first:
//!
//! 1. Known content-region selectors, accepted when their text (noise
//!    removed) exceeds 100 characters
//! 2. Paragraph-like blocks of the main article area, each over 30
//!    characters, together over 100
//! 3. The first content/post/article/body classed `<div>` over 200 characters
//! 4. The whole `<body>` without page chrome, rebuilt as paragraphs, over 200
//!    characters
//!
//! An empty string means no body could be recovered. Fetch errors never
//! escape [`fetch_body_with_retry`].

use crate::config::RetryConfig;
use crate::content::{clean, element_text, paragraphs_from_lines, pruned_text, text_lines};
use crate::crawler::fetcher::fetch_page;
use regex::Regex;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Content-region selectors, most specific first
pub const CONTENT_SELECTORS: &[&str] = &[
    "article .entry-content",
    "article .post-content",
    "article .content",
    ".entry-content",
    ".post-content",
    ".article-content",
    ".content-body",
    ".post-body",
    "article main",
    "main .content",
    "article",
    "main article",
    "[role=\"article\"]",
    ".blog-content",
    ".single-content",
];

const REGION_MIN_CHARS: usize = 100;
const BLOCK_MIN_CHARS: usize = 30;
const BLOCKS_MIN_CHARS: usize = 100;
const CONTAINER_MIN_CHARS: usize = 200;
const PAGE_MIN_CHARS: usize = 200;
const PARAGRAPH_LINE_MIN_CHARS: usize = 20;
const RESYNTHESIS_MIN_CHARS: usize = 100;

const BLOCK_SELECTOR: &str = "p, h1, h2, h3, h4, h5, h6, ul, ol, blockquote";

static CONTAINER_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)content|post|article|body").expect("hardcoded regex pattern is valid")
});

/// A located content region: its markup and the text used to judge it
struct Region {
    html: String,
    lines: Vec<String>,
}

/// Extracts and sanitizes the body of a post page
///
/// # Arguments
///
/// * `html` - The detail page
/// * `min_body_chars` - Sanitized bodies shorter than this are rebuilt from text
///
/// # Returns
///
/// The sanitized body, or an empty string when nothing usable was found
pub fn extract_body(html: &str, min_body_chars: usize) -> String {
    let document = Html::parse_document(html);

    let region = primary_region(&document)
        .or_else(|| paragraph_blocks(&document))
        .or_else(|| content_container(&document));

    match region {
        Some(region) => finish_region(region, min_body_chars),
        None => whole_page(&document),
    }
}

fn primary_region(document: &Html) -> Option<Region> {
    for css in CONTENT_SELECTORS {
        let Ok(selector) = Selector::parse(css) else {
            continue;
        };
        let Some(element) = document.select(&selector).next() else {
            continue;
        };

        let length = pruned_text(&element).chars().count();
        if length > REGION_MIN_CHARS {
            debug!(selector = css, chars = length, "Content region matched");
            return Some(region_of(&element));
        }
    }
    None
}

fn paragraph_blocks(document: &Html) -> Option<Region> {
    let root = ["article", "main", r#"div[class*="content"], div[class*="post"], div[class*="article"]"#]
        .iter()
        .find_map(|css| {
            let selector = Selector::parse(css).ok()?;
            document.select(&selector).next()
        })?;
    let block_selector = Selector::parse(BLOCK_SELECTOR).ok()?;

    let mut kept: Vec<ElementRef<'_>> = Vec::new();
    for block in root.select(&block_selector) {
        let nested = block
            .ancestors()
            .any(|ancestor| kept.iter().any(|k| k.id() == ancestor.id()));
        if nested {
            continue;
        }
        if element_text(&block).chars().count() > BLOCK_MIN_CHARS {
            kept.push(block);
        }
    }

    let text_length: usize = kept
        .iter()
        .map(|block| element_text(block).chars().count())
        .sum();
    if text_length <= BLOCKS_MIN_CHARS {
        return None;
    }

    debug!(blocks = kept.len(), chars = text_length, "Content rebuilt from paragraph blocks");
    Some(Region {
        html: kept.iter().map(|block| block.html()).collect(),
        lines: kept.iter().flat_map(text_lines).collect(),
    })
}

fn content_container(document: &Html) -> Option<Region> {
    let selector = Selector::parse("div[class]").ok()?;
    document
        .select(&selector)
        .filter(|div| {
            div.value()
                .attr("class")
                .is_some_and(|class| CONTAINER_CLASS.is_match(class))
        })
        .find(|div| element_text(div).chars().count() > CONTAINER_MIN_CHARS)
        .map(|div| {
            debug!("Content taken from classed container");
            region_of(&div)
        })
}

fn region_of(element: &ElementRef<'_>) -> Region {
    Region {
        html: element.html(),
        lines: text_lines(element),
    }
}

/// Sanitizes a located region, rebuilding paragraphs from its text when the
/// markup itself does not survive sanitization
fn finish_region(region: Region, min_body_chars: usize) -> String {
    let body = clean(&region.html);
    if body.chars().count() >= min_body_chars {
        return body;
    }

    let text_length = region.lines.join("\n").chars().count();
    if text_length > RESYNTHESIS_MIN_CHARS {
        debug!(chars = body.len(), "Sanitized region too short, rebuilding paragraphs");
        return clean(&paragraphs_from_lines(&region.lines, PARAGRAPH_LINE_MIN_CHARS));
    }
    String::new()
}

fn whole_page(document: &Html) -> String {
    let Some(body) = Selector::parse("body")
        .ok()
        .and_then(|selector| document.select(&selector).next())
    else {
        return String::new();
    };

    let lines = text_lines(&body);
    if lines.join("\n").chars().count() <= PAGE_MIN_CHARS {
        return String::new();
    }

    debug!(lines = lines.len(), "Content rebuilt from page body");
    clean(&paragraphs_from_lines(&lines, PARAGRAPH_LINE_MIN_CHARS))
}

/// Fetches a post page once and extracts its body
///
/// # Returns
///
/// * `Ok(String)` - The sanitized body, possibly empty
/// * `Err(HarvestError)` - The page could not be fetched
pub async fn fetch_body(client: &Client, url: &str, min_body_chars: usize) -> crate::Result<String> {
    let html = fetch_page(client, url).await.into_body(url)?;
    Ok(extract_body(&html, min_body_chars))
}

/// Fetches a post body, retrying failed or short results
///
/// An attempt succeeds when it returns at least `min_body_chars` characters.
/// Errors and short bodies are retried after `retry_delay` until
/// `max_attempts` is exhausted.
///
/// # Returns
///
/// The body, or an empty string once every attempt has failed
pub async fn fetch_body_with_retry(
    client: &Client,
    url: &str,
    retry: &RetryConfig,
    retry_delay: Duration,
) -> String {
    let max_attempts = retry.max_attempts.max(1);

    for attempt in 1..=max_attempts {
        match fetch_body(client, url, retry.min_body_chars).await {
            Ok(body) if body.trim().chars().count() >= retry.min_body_chars => {
                info!(url = %url, chars = body.len(), attempt, "Fetched post body");
                return body;
            }
            Ok(body) => {
                warn!(
                    url = %url,
                    chars = body.len(),
                    attempt,
                    max_attempts,
                    "Post body too short"
                );
            }
            Err(e) => {
                warn!(url = %url, attempt, max_attempts, error = %e, "Post body fetch failed");
            }
        }

        if attempt < max_attempts {
            tokio::time::sleep(retry_delay).await;
        }
    }

    warn!(url = %url, attempts = max_attempts, "Giving up on post body");
    String::new()
}
