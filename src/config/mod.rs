//! Configuration module for Blog-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section is optional, so the scraper also runs without any file.
//!
//! # Example
//!
//! ```no_run
//! use blog_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Detail fetch attempts: {}", config.retry.max_attempts);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, ImportConfig, OutputConfig, PacingConfig, RetryConfig, ScraperConfig, StoreBackend,
    UserAgentConfig, DEFAULT_BASE_URL,
};

// Re-export parser functions
pub use parser::{load_config, load_or_default, parse_config};
pub use validation::validate_base_url;
