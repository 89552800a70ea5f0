//! Integration tests for Blog-Harvest
//!
//! These tests use wiremock to serve listing pages, detail pages and images,
//! and tempfile directories for every output.

mod common;
mod crawl_tests;
mod detail_tests;
mod image_tests;
mod store_tests;
