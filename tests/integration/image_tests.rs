//! Image acquisition against a mock server

use crate::common::*;
use blog_harvest::crawler::build_http_client;
use blog_harvest::images::ImageAcquirer;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PNG_BYTES: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

fn acquirer(server: &MockServer, output: &TempDir) -> ImageAcquirer {
    let config = create_test_config(server, output.path());
    let client = build_http_client(&config).unwrap();
    ImageAcquirer::new(client, &config)
}

#[tokio::test]
async fn test_content_type_probe_and_reuse() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    Mock::given(method("HEAD"))
        .and(path("/media/cover"))
        .respond_with(ResponseTemplate::new(200).insert_header("content-type", "image/png"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/media/cover"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(PNG_BYTES.to_vec())
                .insert_header("content-type", "image/png"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let images = acquirer(&server, &output);
    let url = format!("{}/media/cover", server.uri());

    let first = images.acquire(&url, "my-post").await;
    assert_eq!(first.as_deref(), Some("images/my-post.png"));
    let stored = output.path().join("images/my-post.png");
    assert_eq!(std::fs::read(&stored).unwrap(), PNG_BYTES);

    let second = images.acquire(&url, "my-post").await;
    assert_eq!(second, first);
}

#[tokio::test]
async fn test_url_extension_skips_probe() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/media/photo.webp"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"RIFF".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let images = acquirer(&server, &output);
    let url = format!("{}/media/photo.webp", server.uri());

    assert_eq!(
        images.acquire(&url, "webp-post").await.as_deref(),
        Some("images/webp-post.webp")
    );
}

#[tokio::test]
async fn test_failed_probe_defaults_to_jpg() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    Mock::given(method("HEAD"))
        .and(path("/media/raw"))
        .respond_with(ResponseTemplate::new(405))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/media/raw"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xFF, 0xD8]))
        .mount(&server)
        .await;

    let images = acquirer(&server, &output);
    let url = format!("{}/media/raw", server.uri());

    assert_eq!(
        images.acquire(&url, "raw-post").await.as_deref(),
        Some("images/raw-post.jpg")
    );
}

#[tokio::test]
async fn test_existing_variant_reused_without_network() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let images_dir = output.path().join("images");
    std::fs::create_dir_all(&images_dir).unwrap();
    std::fs::write(images_dir.join("old-post.gif"), b"GIF89a").unwrap();

    let images = acquirer(&server, &output);
    let url = format!("{}/media/new-cover.png", server.uri());

    assert_eq!(
        images.acquire(&url, "old-post").await.as_deref(),
        Some("images/old-post.gif")
    );
}

#[tokio::test]
async fn test_missing_image_is_absent() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/media/gone.jpg"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let images = acquirer(&server, &output);
    let url = format!("{}/media/gone.jpg", server.uri());

    assert_eq!(images.acquire(&url, "gone").await, None);
    assert!(!output.path().join("images/gone.jpg").exists());
    assert!(!output.path().join("images/gone.jpg.part").exists());
}
