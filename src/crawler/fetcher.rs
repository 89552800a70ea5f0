//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the scraper:
//! - Building the HTTP client with the configured user agent and timeout
//! - GET requests for listing and detail pages
//! - Error classification (status, timeout, network)

use crate::config::Config;
use crate::HarvestError;
use reqwest::Client;
use std::time::Duration;

/// Connection establishment timeout, independent of the request timeout
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched the page
    Success {
        /// Final URL after redirects
        final_url: String,
        /// HTTP status code
        status_code: u16,
        /// Page body content
        body: String,
    },

    /// Server answered with a non-success status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (connection refused, timeout, body read failure)
    NetworkError {
        /// The underlying client error
        error: reqwest::Error,
    },
}

impl FetchResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Converts the outcome into the body or a typed error
    ///
    /// # Arguments
    ///
    /// * `url` - The requested URL, recorded in the error
    pub fn into_body(self, url: &str) -> crate::Result<String> {
        match self {
            Self::Success { body, .. } => Ok(body),
            Self::HttpError { status_code } => Err(HarvestError::Status {
                url: url.to_string(),
                status: status_code,
            }),
            Self::NetworkError { error } if error.is_timeout() => Err(HarvestError::Timeout {
                url: url.to_string(),
            }),
            Self::NetworkError { error } => Err(HarvestError::Http {
                url: url.to_string(),
                source: error,
            }),
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// Every request carries the configured user agent and is bounded by the
/// configured request timeout. Redirects are followed.
///
/// # Arguments
///
/// * `config` - The scraper configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use blog_harvest::config::Config;
/// use blog_harvest::crawler::build_http_client;
///
/// let client = build_http_client(&Config::default()).unwrap();
/// ```
pub fn build_http_client(config: &Config) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.value.clone())
        .timeout(config.scraper.request_timeout())
        .connect_timeout(CONNECT_TIMEOUT.min(config.scraper.request_timeout()))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a page and classifies the outcome
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx with readable body | Success |
/// | Any other status | HttpError |
/// | Timeout / connect / body read failure | NetworkError |
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
pub async fn fetch_page(client: &Client, url: &str) -> FetchResult {
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(error) => return FetchResult::NetworkError { error },
    };

    let status = response.status();
    if !status.is_success() {
        return FetchResult::HttpError {
            status_code: status.as_u16(),
        };
    }

    let final_url = response.url().to_string();
    match response.text().await {
        Ok(body) => FetchResult::Success {
            final_url,
            status_code: status.as_u16(),
            body,
        },
        Err(error) => FetchResult::NetworkError { error },
    }
}
