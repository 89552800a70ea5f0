//! Crawler module for listing and detail page processing
//!
//! This module contains the scraping pipeline, including:
//! - HTTP client construction and fetch outcome classification
//! - Listing extraction (candidate and field cascades, date parsing)
//! - Detail body extraction with retry
//! - Overall crawl coordination

mod coordinator;
mod dates;
mod detail;
mod fetcher;
mod listing;

pub use coordinator::{run_scrape, Coordinator, CrawlOptions};
pub use dates::{parse_date_text, parse_machine_date, resolve_date, translate_months, ISO_FORMAT};
pub use detail::{extract_body, fetch_body, fetch_body_with_retry, CONTENT_SELECTORS};
pub use fetcher::{build_http_client, fetch_page, FetchResult};
pub use listing::{select_candidates, ListingEntry, ListingExtractor};
