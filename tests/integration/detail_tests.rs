//! Detail fetch retry behavior against a mock server

use crate::common::*;
use blog_harvest::config::RetryConfig;
use blog_harvest::crawler::{build_http_client, fetch_body_with_retry};
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SHORT_PAGE: &str = r#"<html><body><article><div class="entry-content">
    <p>Only forty characters of text are here.</p></div></article></body></html>"#;

fn retry_policy() -> RetryConfig {
    RetryConfig {
        max_attempts: 3,
        min_body_chars: 50,
    }
}

#[tokio::test]
async fn test_short_body_retried_then_empty() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/blog/short"))
        .respond_with(html(SHORT_PAGE.to_string()))
        .expect(3)
        .mount(&server)
        .await;

    let client = build_http_client(&create_test_config(&server, output.path())).unwrap();
    let url = format!("{}/blog/short", server.uri());
    let body = fetch_body_with_retry(&client, &url, &retry_policy(), Duration::ZERO).await;

    assert_eq!(body, "");
}

#[tokio::test]
async fn test_recovers_on_a_later_attempt() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/blog/flaky"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/blog/flaky"))
        .respond_with(html(detail_page("Flaky")))
        .expect(1)
        .mount(&server)
        .await;

    let client = build_http_client(&create_test_config(&server, output.path())).unwrap();
    let url = format!("{}/blog/flaky", server.uri());
    let body = fetch_body_with_retry(&client, &url, &retry_policy(), Duration::ZERO).await;

    assert_eq!(body, format!("<p>{PARAGRAPH_A}</p><p>{PARAGRAPH_B}</p>"));
}

#[tokio::test]
async fn test_single_attempt_policy() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/blog/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let client = build_http_client(&create_test_config(&server, output.path())).unwrap();
    let url = format!("{}/blog/missing", server.uri());
    let policy = RetryConfig {
        max_attempts: 1,
        min_body_chars: 50,
    };

    assert_eq!(fetch_body_with_retry(&client, &url, &policy, Duration::ZERO).await, "");
}
