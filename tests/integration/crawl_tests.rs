//! End-to-end scrape runs against a mock blog

use crate::common::*;
use blog_harvest::crawler::Coordinator;
use blog_harvest::storage::{JsonFileStore, PostStore};
use blog_harvest::{CrawlOptions, CrawlPhase, PostStatus, StopReason};
use std::collections::HashSet;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FIRST_PAGE: &[(&str, &str)] = &[
    ("lanyard-printing-guide", "Lanyard Printing Guide"),
    ("choosing-id-card-holders", "Choosing ID Card Holders"),
];

#[tokio::test]
async fn test_full_scrape_single_page() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    mount_empty_query_page(&server, 2).await;
    mount_first_page(&server, FIRST_PAGE).await;
    mount_details(&server, FIRST_PAGE, 1).await;
    mount_images(&server).await;

    let config = create_test_config(&server, output.path());
    let mut coordinator = Coordinator::new(config, CrawlOptions::all_pages(None))
        .expect("Failed to create coordinator");
    let summary = coordinator.run().await.expect("Scrape failed");

    assert_eq!(coordinator.phase(), CrawlPhase::Stopped);
    assert_eq!(summary.stop_reason, Some(StopReason::NoPosts));
    // page 1, /blog/page/2 (404), then /blog?page=2
    assert_eq!(summary.pages_fetched, 3);
    assert_eq!(summary.posts_added, 2);
    assert_eq!(summary.bodies_fetched, 2);
    assert_eq!(summary.images_stored, 2);
    assert_eq!(summary.collection_total, 2);

    let collection = JsonFileStore::new(output.path().join("scraped_posts.json"))
        .load()
        .unwrap();
    assert_eq!(collection.total, 2);
    assert_eq!(collection.source_url, format!("{}/blog", server.uri()));

    let post = collection.get("lanyard-printing-guide").unwrap();
    assert_eq!(post.title, "Lanyard Printing Guide");
    assert_eq!(
        post.url,
        format!("{}/blog/lanyard-printing-guide", server.uri())
    );
    assert_eq!(post.status, PostStatus::Draft);
    assert_eq!(post.published_at, None);
    assert_eq!(post.categories, vec!["News".to_string()]);
    assert_eq!(
        post.thumbnail_path.as_deref(),
        Some("images/lanyard-printing-guide.jpg")
    );
    assert_eq!(post.og_image, post.thumbnail_path);
    assert_eq!(post.body, format!("<p>{PARAGRAPH_A}</p><p>{PARAGRAPH_B}</p>"));
    assert!(output
        .path()
        .join("images/lanyard-printing-guide.jpg")
        .is_file());
}

#[tokio::test]
async fn test_second_run_is_idempotent() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    mount_empty_query_page(&server, 2).await;
    mount_first_page(&server, FIRST_PAGE).await;
    // Detail pages are only fetched by the first run
    mount_details(&server, FIRST_PAGE, 1).await;
    mount_images(&server).await;

    let config = create_test_config(&server, output.path());

    let first = Coordinator::new(config.clone(), CrawlOptions::all_pages(None))
        .unwrap()
        .run()
        .await
        .unwrap();
    assert_eq!(first.collection_total, 2);

    let mut coordinator = Coordinator::new(config, CrawlOptions::all_pages(None)).unwrap();
    let second = coordinator.run().await.unwrap();

    // The fully known first page is passed over; the listing ends at page 2
    assert_eq!(second.stop_reason, Some(StopReason::NoPosts));
    assert_eq!(second.pages_fetched, 3);
    assert_eq!(second.posts_added, 0);
    assert_eq!(second.posts_known, 2);
    assert_eq!(second.collection_total, 2);
    assert_eq!(
        coordinator.collection().slugs(),
        ["lanyard-printing-guide", "choosing-id-card-holders"]
            .iter()
            .map(|s| s.to_string())
            .collect::<HashSet<String>>()
    );
}

#[tokio::test]
async fn test_per_page_cap_stops_after_one_page() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    let posts = &[
        ("first-post", "First Post"),
        ("second-post", "Second Post"),
        ("third-post", "Third Post"),
    ];
    Mock::given(method("GET"))
        .and(path("/blog/page/2"))
        .respond_with(html(listing_page(&[("never", "Never")])))
        .expect(0)
        .mount(&server)
        .await;
    mount_first_page(&server, posts).await;
    mount_details(&server, &posts[..2], 1).await;
    mount_details(&server, &posts[2..], 0).await;
    mount_images(&server).await;

    let config = create_test_config(&server, output.path());
    let summary = Coordinator::new(config, CrawlOptions::single_batch(None, 2))
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(summary.stop_reason, Some(StopReason::PerPageCap));
    assert_eq!(summary.pages_fetched, 1);
    assert_eq!(summary.posts_added, 2);
    assert_eq!(summary.collection_total, 2);
}

#[tokio::test]
async fn test_next_batch_picks_up_remaining_posts() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    let posts = &[
        ("first-post", "First Post"),
        ("second-post", "Second Post"),
        ("third-post", "Third Post"),
    ];
    mount_first_page(&server, posts).await;
    mount_details(&server, posts, 1).await;
    mount_images(&server).await;

    let config = create_test_config(&server, output.path());
    for _ in 0..2 {
        Coordinator::new(config.clone(), CrawlOptions::single_batch(None, 2))
            .unwrap()
            .run()
            .await
            .unwrap();
    }

    let collection = JsonFileStore::new(output.path().join("scraped_posts.json"))
        .load()
        .unwrap();
    let slugs: Vec<&str> = collection.posts.iter().map(|p| p.slug.as_str()).collect();
    assert_eq!(slugs, vec!["first-post", "second-post", "third-post"]);
}

const SECOND_PAGE: &[(&str, &str)] = &[
    ("badge-reel-basics", "Badge Reel Basics"),
    ("event-wristband-ideas", "Event Wristband Ideas"),
];

async fn mount_second_page(server: &MockServer, posts: &[(&str, &str)]) {
    Mock::given(method("GET"))
        .and(path("/blog/page/2"))
        .respond_with(html(listing_page(posts)))
        .mount(server)
        .await;
}

fn stored_slugs(output: &TempDir) -> Vec<String> {
    JsonFileStore::new(output.path().join("scraped_posts.json"))
        .load()
        .unwrap()
        .posts
        .into_iter()
        .map(|post| post.slug)
        .collect()
}

#[tokio::test]
async fn test_next_batch_moves_past_known_page() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    mount_first_page(&server, FIRST_PAGE).await;
    mount_second_page(&server, SECOND_PAGE).await;
    mount_details(&server, FIRST_PAGE, 1).await;
    mount_details(&server, SECOND_PAGE, 1).await;
    mount_images(&server).await;

    let config = create_test_config(&server, output.path());

    let first = Coordinator::new(config.clone(), CrawlOptions::single_batch(None, 2))
        .unwrap()
        .run()
        .await
        .unwrap();
    assert_eq!(first.stop_reason, Some(StopReason::PerPageCap));
    assert_eq!(first.pages_fetched, 1);
    assert_eq!(first.posts_added, 2);

    let second = Coordinator::new(config, CrawlOptions::single_batch(None, 2))
        .unwrap()
        .run()
        .await
        .unwrap();
    assert_eq!(second.stop_reason, Some(StopReason::PerPageCap));
    assert_eq!(second.pages_fetched, 2);
    assert_eq!(second.posts_known, 2);
    assert_eq!(second.posts_added, 2);

    assert_eq!(
        stored_slugs(&output),
        vec![
            "lanyard-printing-guide",
            "choosing-id-card-holders",
            "badge-reel-basics",
            "event-wristband-ideas",
        ]
    );
}

#[tokio::test]
async fn test_interrupted_run_resumes_past_known_page() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    mount_empty_query_page(&server, 3).await;
    mount_first_page(&server, FIRST_PAGE).await;
    mount_second_page(&server, SECOND_PAGE).await;
    mount_details(&server, FIRST_PAGE, 1).await;
    mount_details(&server, SECOND_PAGE, 1).await;
    mount_images(&server).await;

    let config = create_test_config(&server, output.path());

    let partial = CrawlOptions::from_command(None, Some(1), None, false);
    Coordinator::new(config.clone(), partial)
        .unwrap()
        .run()
        .await
        .unwrap();
    assert_eq!(stored_slugs(&output).len(), 2);

    let resumed = Coordinator::new(config, CrawlOptions::all_pages(None))
        .unwrap()
        .run()
        .await
        .unwrap();
    assert_eq!(resumed.stop_reason, Some(StopReason::NoPosts));
    assert_eq!(resumed.posts_added, 2);
    assert_eq!(resumed.collection_total, 4);
}

#[tokio::test]
async fn test_repeated_listing_page_ends_run() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    // Out-of-range pages fall back to the first page
    mount_first_page(&server, FIRST_PAGE).await;
    mount_second_page(&server, FIRST_PAGE).await;
    mount_details(&server, FIRST_PAGE, 1).await;
    mount_images(&server).await;

    let config = create_test_config(&server, output.path());
    let summary = Coordinator::new(config, CrawlOptions::all_pages(None))
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(summary.stop_reason, Some(StopReason::NoPosts));
    assert_eq!(summary.pages_fetched, 2);
    assert_eq!(summary.collection_total, 2);
}

#[tokio::test]
async fn test_alternate_pagination_url() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    let second_page = &[("third-post", "Third Post"), ("fourth-post", "Fourth Post")];
    Mock::given(method("GET"))
        .and(path("/blog"))
        .and(query_param("page", "2"))
        .respond_with(html(listing_page(second_page)))
        .expect(1)
        .mount(&server)
        .await;
    mount_empty_query_page(&server, 3).await;
    mount_first_page(&server, FIRST_PAGE).await;
    mount_details(&server, FIRST_PAGE, 1).await;
    mount_details(&server, second_page, 1).await;
    mount_images(&server).await;

    let config = create_test_config(&server, output.path());
    let summary = Coordinator::new(config, CrawlOptions::all_pages(None))
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(summary.stop_reason, Some(StopReason::NoPosts));
    assert_eq!(summary.collection_total, 4);
    // 1, page/2 + ?page=2, page/3 + ?page=3
    assert_eq!(summary.pages_fetched, 5);
}

#[tokio::test]
async fn test_page_ceiling() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/blog/page/2"))
        .respond_with(html(listing_page(&[("page-two", "Page Two")])))
        .expect(0)
        .mount(&server)
        .await;
    mount_first_page(&server, FIRST_PAGE).await;
    mount_details(&server, FIRST_PAGE, 1).await;
    mount_images(&server).await;

    let config = create_test_config(&server, output.path());
    let summary = Coordinator::new(config, CrawlOptions::from_command(None, Some(1), None, false))
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(summary.stop_reason, Some(StopReason::PageCeiling));
    assert_eq!(summary.collection_total, 2);
}

#[tokio::test]
async fn test_article_elements_selected_exclusively() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    let page = r#"<html><body>
        <div class="post-card"><h2><a href="/blog/from-card">From Card</a></h2></div>
        <article><h2><a href="/blog/from-article">From Article</a></h2></article>
        </body></html>"#
        .to_string();
    mount_empty_query_page(&server, 2).await;
    Mock::given(method("GET"))
        .and(path("/blog"))
        .respond_with(html(page))
        .mount(&server)
        .await;
    mount_details(&server, &[("from-article", "From Article")], 1).await;
    mount_details(&server, &[("from-card", "From Card")], 0).await;

    let config = create_test_config(&server, output.path());
    let mut coordinator = Coordinator::new(config, CrawlOptions::all_pages(None)).unwrap();
    coordinator.run().await.unwrap();

    assert!(coordinator.collection().contains("from-article"));
    assert!(!coordinator.collection().contains("from-card"));
}

#[tokio::test]
async fn test_failed_detail_keeps_post_with_empty_body() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    let posts = &[("broken-post", "Broken Post")];
    mount_empty_query_page(&server, 2).await;
    mount_first_page(&server, posts).await;
    Mock::given(method("GET"))
        .and(path("/blog/broken-post"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let config = create_test_config(&server, output.path());
    let summary = Coordinator::new(config, CrawlOptions::all_pages(None))
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(summary.posts_added, 1);
    assert_eq!(summary.bodies_failed, 1);
    assert_eq!(summary.images_stored, 0);

    let collection = JsonFileStore::new(output.path().join("scraped_posts.json"))
        .load()
        .unwrap();
    let post = collection.get("broken-post").unwrap();
    assert_eq!(post.body, "");
    assert_eq!(post.thumbnail_path, None);
}

#[tokio::test]
async fn test_unreachable_listing_stops_without_posts() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/blog"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let config = create_test_config(&server, output.path());
    let summary = Coordinator::new(config, CrawlOptions::all_pages(None))
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(summary.stop_reason, Some(StopReason::NoPosts));
    assert_eq!(summary.collection_total, 0);
    assert!(!output.path().join("scraped_posts.json").exists());
}
