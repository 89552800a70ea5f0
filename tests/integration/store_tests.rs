//! Persistence across runs: merging into existing stores and both backends

use crate::common::*;
use blog_harvest::config::StoreBackend;
use blog_harvest::crawler::Coordinator;
use blog_harvest::storage::{open_store, JsonFileStore, PostStore};
use blog_harvest::{Collection, CrawlOptions, Post};
use tempfile::TempDir;
use wiremock::MockServer;

fn existing_collection(count: usize) -> Collection {
    let mut collection = Collection::empty("https://example.com/blog");
    for index in 1..=count {
        let mut post = Post::new(format!("Existing {}", index), format!("existing-{}", index));
        post.body = format!("<p>Stored body number {}</p>", index);
        collection.posts.push(post);
    }
    collection.stamp("https://example.com/blog");
    collection
}

#[tokio::test]
async fn test_new_page_appends_to_existing_store() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    let mut store = JsonFileStore::new(output.path().join("scraped_posts.json"));
    let original = existing_collection(5);
    store.save(&original).unwrap();

    let fresh = &[
        ("new-one", "New One"),
        ("new-two", "New Two"),
        ("new-three", "New Three"),
    ];
    mount_empty_query_page(&server, 2).await;
    mount_first_page(&server, fresh).await;
    mount_details(&server, fresh, 1).await;
    mount_images(&server).await;

    let config = create_test_config(&server, output.path());
    let summary = Coordinator::new(config, CrawlOptions::all_pages(None))
        .unwrap()
        .run()
        .await
        .unwrap();
    assert_eq!(summary.posts_added, 3);

    let stored = store.load().unwrap();
    assert_eq!(stored.total, 8);
    assert_eq!(&stored.posts[..5], &original.posts[..]);
    let appended: Vec<&str> = stored.posts[5..].iter().map(|p| p.slug.as_str()).collect();
    assert_eq!(appended, vec!["new-one", "new-two", "new-three"]);
}

#[tokio::test]
async fn test_corrupt_store_is_set_aside() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    let store_path = output.path().join("scraped_posts.json");
    std::fs::write(&store_path, r#"{"posts": [ truncated"#).unwrap();

    let posts = &[("recovered", "Recovered")];
    mount_empty_query_page(&server, 2).await;
    mount_first_page(&server, posts).await;
    mount_details(&server, posts, 1).await;
    mount_images(&server).await;

    let config = create_test_config(&server, output.path());
    Coordinator::new(config, CrawlOptions::all_pages(None))
        .unwrap()
        .run()
        .await
        .unwrap();

    let stored = JsonFileStore::new(&store_path).load().unwrap();
    assert_eq!(stored.total, 1);

    let quarantined = std::fs::read_dir(output.path())
        .unwrap()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry
                .file_name()
                .to_string_lossy()
                .starts_with("scraped_posts.json.corrupt-")
        })
        .count();
    assert_eq!(quarantined, 1);
}

#[tokio::test]
async fn test_sqlite_backend_round_trip() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    let posts = &[("sqlite-one", "SQLite One"), ("sqlite-two", "SQLite Two")];
    mount_empty_query_page(&server, 2).await;
    mount_first_page(&server, posts).await;
    mount_details(&server, posts, 1).await;
    mount_images(&server).await;

    let mut config = create_test_config(&server, output.path());
    config.output.backend = StoreBackend::Sqlite;

    let first = Coordinator::new(config.clone(), CrawlOptions::all_pages(None))
        .unwrap()
        .run()
        .await
        .unwrap();
    assert_eq!(first.collection_total, 2);
    assert!(output.path().join("scraped_posts.db").is_file());

    let second = Coordinator::new(config.clone(), CrawlOptions::all_pages(None))
        .unwrap()
        .run()
        .await
        .unwrap();
    assert_eq!(second.posts_added, 0);

    let stored = open_store(&config.output).unwrap().load().unwrap();
    let slugs: Vec<&str> = stored.posts.iter().map(|p| p.slug.as_str()).collect();
    assert_eq!(slugs, vec!["sqlite-one", "sqlite-two"]);
    assert!(stored.get("sqlite-one").unwrap().has_body());
}
