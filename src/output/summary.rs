//! Per-run crawl summary

use crate::state::StopReason;
use std::time::Duration;

/// Counters collected while a crawl runs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    /// Listing pages fetched, alternate URLs included
    pub pages_fetched: u32,

    /// Candidates produced by the listing extractor
    pub candidates_extracted: usize,

    /// Candidates skipped because their slug was already known
    pub posts_known: usize,

    /// Posts appended to the collection during this run
    pub posts_added: usize,

    pub bodies_fetched: usize,

    /// Posts saved with an empty body after every attempt failed
    pub bodies_failed: usize,

    pub images_stored: usize,

    pub save_failures: usize,

    pub stop_reason: Option<StopReason>,

    /// Size of the collection when the run ended
    pub collection_total: usize,

    pub elapsed: Duration,
}

impl RunSummary {
    /// True when every post added this run has a body and every save worked
    pub fn is_clean(&self) -> bool {
        self.bodies_failed == 0 && self.save_failures == 0
    }
}

/// Prints a run summary to stdout
///
/// # Arguments
///
/// * `summary` - The summary to display
/// * `location` - Where the collection is stored
pub fn print_run_summary(summary: &RunSummary, location: &str) {
    println!("=== Scrape Summary ===\n");

    println!("Listing:");
    println!("  Pages fetched: {}", summary.pages_fetched);
    println!("  Posts found: {}", summary.candidates_extracted);
    println!("  Already known: {}", summary.posts_known);
    println!();

    println!("Posts:");
    println!("  Added: {}", summary.posts_added);
    println!("  Bodies fetched: {}", summary.bodies_fetched);
    if summary.bodies_failed > 0 {
        println!("  Bodies missing: {}", summary.bodies_failed);
    }
    println!("  Images stored: {}", summary.images_stored);
    println!();

    if summary.save_failures > 0 {
        println!("Failed saves: {}", summary.save_failures);
        println!();
    }

    match summary.stop_reason {
        Some(reason) => println!("Stopped: {}", reason.describe()),
        None => println!("Stopped: run did not finish"),
    }
    println!(
        "Collection: {} posts in {} ({:.1}s)",
        summary.collection_total,
        location,
        summary.elapsed.as_secs_f64()
    );
}
