//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlPhase`: the per-page state machine driven by the coordinator
//! - `StopReason`: why a crawl ended

mod crawl_phase;

// Re-export main types
pub use crawl_phase::{CrawlPhase, StopReason};
