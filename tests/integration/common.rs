//! Shared fixtures for the integration tests

use blog_harvest::config::{Config, PacingConfig};
use std::path::Path;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const PARAGRAPH_A: &str =
    "Lanyards are printed with dye sublimation so colours stay sharp after washing.";
pub const PARAGRAPH_B: &str =
    "Each order is checked by hand before it leaves the workshop and ships the same week.";

/// Creates a test configuration pointed at the mock server, with no pacing
pub fn create_test_config(server: &MockServer, output: &Path) -> Config {
    let mut config = Config::default();
    config.scraper.base_url = format!("{}/blog", server.uri());
    config.scraper.request_timeout_secs = 5;
    config.scraper.probe_timeout_secs = 2;
    config.pacing = PacingConfig::none();
    config.output.directory = output.to_path_buf();
    config
}

/// A listing page with one `<article>` per `(slug, title)`
pub fn listing_page(posts: &[(&str, &str)]) -> String {
    let articles: String = posts
        .iter()
        .map(|(slug, title)| {
            format!(
                r#"<article class="post">
                    <img data-src="/img/{slug}.jpg" src="">
                    <h2><a href="/blog/{slug}">{title}</a></h2>
                    <time datetime="2024-03-15">15 Maret 2024</time>
                    <p>Short teaser for {title}.</p>
                    <a href="/blog/category/news">News</a>
                </article>"#
            )
        })
        .collect();
    format!(
        r#"<html><body><nav><a href="/">Home</a></nav><main>{articles}</main>
        <div class="pagination"><a href="/blog/page/2">Next</a></div></body></html>"#
    )
}

/// A listing page without any post candidates
pub fn empty_listing_page() -> String {
    "<html><body><p>Nothing to see here.</p></body></html>".to_string()
}

/// A detail page whose body comfortably passes every length check
pub fn detail_page(title: &str) -> String {
    format!(
        r#"<html><body><header>Site header</header><article><h1>{title}</h1>
        <div class="entry-content"><p>{PARAGRAPH_A}</p>
        <div class="share-buttons"><a href="https://social.example.com">Share</a></div>
        <p>{PARAGRAPH_B}</p></div></article><footer>Footer</footer></body></html>"#
    )
}

pub fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html; charset=utf-8")
}

/// Mounts page 1 of the listing at `/blog`
///
/// Mount any `?page=` mocks before calling this: the bare path matcher also
/// matches query-string requests.
pub async fn mount_first_page(server: &MockServer, posts: &[(&str, &str)]) {
    Mock::given(method("GET"))
        .and(path("/blog"))
        .respond_with(html(listing_page(posts)))
        .mount(server)
        .await;
}

/// Mounts an empty result for `/blog?page=<page>`
pub async fn mount_empty_query_page(server: &MockServer, page: u32) {
    Mock::given(method("GET"))
        .and(path("/blog"))
        .and(query_param("page", page.to_string()))
        .respond_with(html(empty_listing_page()))
        .mount(server)
        .await;
}

/// Mounts a detail page for each post, expecting exactly `expected_hits` requests each
pub async fn mount_details(server: &MockServer, posts: &[(&str, &str)], expected_hits: u64) {
    for (slug, title) in posts {
        Mock::given(method("GET"))
            .and(path(format!("/blog/{}", slug)))
            .respond_with(html(detail_page(title)))
            .expect(expected_hits)
            .mount(server)
            .await;
    }
}

/// Mounts a tiny JPEG for every image under `/img/`
pub async fn mount_images(server: &MockServer) {
    Mock::given(method("GET"))
        .and(wiremock::matchers::path_regex(r"^/img/.+"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(vec![0xFF, 0xD8, 0xFF, 0xE0])
                .insert_header("content-type", "image/jpeg"),
        )
        .mount(server)
        .await;
}
