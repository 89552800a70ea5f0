use crate::model::PostStatus;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Listing scraped when neither the config file nor the command line names one
pub const DEFAULT_BASE_URL: &str = "https://lanyardkilat.co.id/blog";

/// Main configuration structure for Blog-Harvest
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scraper: ScraperConfig,
    #[serde(default, rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub pacing: PacingConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub import: ImportConfig,
}

/// Scraper behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Listing URL (page 1 of the paginated post index)
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Timeout for page, detail and image GET requests (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Timeout for the image content-type HEAD probe (seconds)
    #[serde(rename = "probe-timeout-secs")]
    pub probe_timeout_secs: u64,

    /// Author recorded when the listing shows none
    #[serde(rename = "default-author")]
    pub default_author: String,

    /// Status assigned to scraped posts
    #[serde(rename = "post-status")]
    pub post_status: PostStatus,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: 30,
            probe_timeout_secs: 10,
            default_author: "Admin".to_string(),
            post_status: PostStatus::Draft,
        }
    }
}

impl ScraperConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}

/// User agent sent with every outbound request
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    pub value: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            value: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string(),
        }
    }
}

/// Fixed delays used to stay under the target site's rate limits
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    /// Delay after every listing page, whatever its outcome (milliseconds)
    #[serde(rename = "page-delay-ms")]
    pub page_delay_ms: u64,

    /// Delay between two posts of the same page (milliseconds)
    #[serde(rename = "post-delay-ms")]
    pub post_delay_ms: u64,

    /// Delay between two detail fetch attempts (milliseconds)
    #[serde(rename = "retry-delay-ms")]
    pub retry_delay_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            page_delay_ms: 3000,
            post_delay_ms: 2000,
            retry_delay_ms: 3000,
        }
    }
}

impl PacingConfig {
    /// No delays at all; used by tests and dry local runs
    pub fn none() -> Self {
        Self {
            page_delay_ms: 0,
            post_delay_ms: 0,
            retry_delay_ms: 0,
        }
    }

    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }

    pub fn post_delay(&self) -> Duration {
        Duration::from_millis(self.post_delay_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

/// Detail fetch retry policy
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts per detail page, including the first
    #[serde(rename = "max-attempts")]
    pub max_attempts: u32,

    /// Sanitized bodies shorter than this are retried
    #[serde(rename = "min-body-chars")]
    pub min_body_chars: usize,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            min_body_chars: 50,
        }
    }
}

/// Which `PostStore` implementation persists the collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Json,
    Sqlite,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory holding the collection file and the image directory
    pub directory: PathBuf,

    /// Collection file name inside `directory`
    #[serde(rename = "collection-file")]
    pub collection_file: String,

    /// Image subdirectory name inside `directory`
    #[serde(rename = "images-dir")]
    pub images_dir: String,

    pub backend: StoreBackend,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            collection_file: "scraped_posts.json".to_string(),
            images_dir: "images".to_string(),
            backend: StoreBackend::Json,
        }
    }
}

impl OutputConfig {
    /// Full path of the persisted collection
    pub fn collection_path(&self) -> PathBuf {
        match self.backend {
            StoreBackend::Json => self.directory.join(&self.collection_file),
            StoreBackend::Sqlite => self
                .directory
                .join(&self.collection_file)
                .with_extension("db"),
        }
    }

    /// Full path of the image directory
    pub fn images_path(&self) -> PathBuf {
        self.directory.join(&self.images_dir)
    }
}

/// Database import configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Where entered database credentials are cached between runs
    #[serde(rename = "credentials-file")]
    pub credentials_file: PathBuf,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            credentials_file: PathBuf::from("db_config.json"),
        }
    }
}
