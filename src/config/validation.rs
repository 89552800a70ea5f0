use crate::config::types::{Config, OutputConfig, RetryConfig, ScraperConfig, UserAgentConfig};
use crate::ConfigError;
use std::path::{Component, Path};
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_scraper_config(&config.scraper)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_retry_config(&config.retry)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates scraper configuration
fn validate_scraper_config(config: &ScraperConfig) -> Result<(), ConfigError> {
    validate_base_url(&config.base_url)?;

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_secs must be >= 1, got {}",
            config.request_timeout_secs
        )));
    }

    if config.probe_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "probe_timeout_secs must be >= 1, got {}",
            config.probe_timeout_secs
        )));
    }

    if config.default_author.trim().is_empty() {
        return Err(ConfigError::Validation(
            "default_author cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates a listing URL: must parse and use http or https
pub fn validate_base_url(base_url: &str) -> Result<(), ConfigError> {
    let url = Url::parse(base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base URL '{}': {}", base_url, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Base URL '{}' must use http or https",
            base_url
        )));
    }

    Ok(())
}

fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.value.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user agent cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_retry_config(config: &RetryConfig) -> Result<(), ConfigError> {
    if config.max_attempts < 1 || config.max_attempts > 10 {
        return Err(ConfigError::Validation(format!(
            "max_attempts must be between 1 and 10, got {}",
            config.max_attempts
        )));
    }
    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.collection_file.trim().is_empty() {
        return Err(ConfigError::Validation(
            "collection_file cannot be empty".to_string(),
        ));
    }

    validate_images_dir(&config.images_dir)
}

/// The image directory is recorded verbatim in thumbnail paths, so it must
/// be a single relative path component
fn validate_images_dir(images_dir: &str) -> Result<(), ConfigError> {
    if images_dir.trim().is_empty() {
        return Err(ConfigError::Validation(
            "images_dir cannot be empty".to_string(),
        ));
    }

    let mut components = Path::new(images_dir).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(ConfigError::Validation(format!(
            "images_dir must be a single relative directory name, got '{}'",
            images_dir
        ))),
    }
}
