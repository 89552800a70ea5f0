//! Output module for run reports
//!
//! This module handles:
//! - The summary printed after every scrape run
//! - Statistics over the stored collection

mod stats;
mod summary;

pub use stats::{print_statistics, CollectionStats};
pub use summary::{print_run_summary, RunSummary};
