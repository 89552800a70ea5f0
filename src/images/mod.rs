//! Image acquisition
//!
//! Thumbnails are stored once per post as `<images-dir>/<slug>.<ext>`. A file
//! already present under the slug (with any common image extension) is reused
//! without touching the network.

use crate::config::Config;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use url::Url;

/// Extensions checked for an existing file, in order
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif"];

/// Extension used when neither the URL nor the server names one
pub const DEFAULT_EXTENSION: &str = "jpg";

/// Downloads post thumbnails into the image directory
#[derive(Debug, Clone)]
pub struct ImageAcquirer {
    client: Client,
    images_dir: PathBuf,
    relative_dir: String,
    probe_timeout: Duration,
}

impl ImageAcquirer {
    /// Creates an acquirer writing into the configured image directory
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            images_dir: config.output.images_path(),
            relative_dir: config.output.images_dir.clone(),
            probe_timeout: config.scraper.probe_timeout(),
        }
    }

    pub fn images_dir(&self) -> &Path {
        &self.images_dir
    }

    /// Stores the image for a post, reusing an existing file
    ///
    /// # Arguments
    ///
    /// * `url` - Absolute image URL
    /// * `slug` - The owning post's slug, used as the file stem
    ///
    /// # Returns
    ///
    /// The path relative to the output directory, e.g. `images/my-post.png`,
    /// or `None` when the image could not be stored
    pub async fn acquire(&self, url: &str, slug: &str) -> Option<String> {
        if url.trim().is_empty() || slug.is_empty() {
            return None;
        }

        let url_extension = extension_from_url(url);
        if let Some(existing) = self.existing_file(slug, url_extension.as_deref()) {
            debug!(slug = %slug, file = %existing, "Image already stored");
            return Some(self.relative_path(&existing));
        }

        let extension = match url_extension {
            Some(extension) => extension,
            None => self.probe_extension(url).await,
        };
        let file_name = format!("{}.{}", slug, extension);

        match self.download(url, &file_name).await {
            Ok(()) => {
                info!(slug = %slug, file = %file_name, "Stored image");
                Some(self.relative_path(&file_name))
            }
            Err(e) => {
                warn!(url = %url, slug = %slug, error = %e, "Image download failed");
                None
            }
        }
    }

    fn relative_path(&self, file_name: &str) -> String {
        format!("{}/{}", self.relative_dir, file_name)
    }

    fn existing_file(&self, slug: &str, preferred: Option<&str>) -> Option<String> {
        preferred
            .into_iter()
            .chain(IMAGE_EXTENSIONS.iter().copied())
            .map(|extension| format!("{}.{}", slug, extension))
            .find(|file_name| self.images_dir.join(file_name).is_file())
    }

    /// Asks the server for the content type; any failure means the default
    async fn probe_extension(&self, url: &str) -> String {
        let response = self
            .client
            .head(url)
            .timeout(self.probe_timeout)
            .send()
            .await;

        let content_type = match response {
            Ok(response) if response.status().is_success() => response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string),
            Ok(response) => {
                debug!(url = %url, status = response.status().as_u16(), "Image probe rejected");
                None
            }
            Err(e) => {
                debug!(url = %url, error = %e, "Image probe failed");
                None
            }
        };

        content_type
            .as_deref()
            .map(extension_for_content_type)
            .unwrap_or(DEFAULT_EXTENSION)
            .to_string()
    }

    /// Streams the image to a partial file, renamed into place once complete
    async fn download(&self, url: &str, file_name: &str) -> crate::Result<()> {
        let mut response = self.client.get(url).send().await.map_err(|source| {
            crate::HarvestError::Http {
                url: url.to_string(),
                source,
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(crate::HarvestError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        tokio::fs::create_dir_all(&self.images_dir).await?;
        let target = self.images_dir.join(file_name);
        let partial = self.images_dir.join(format!("{}.part", file_name));

        let written = async {
            let mut file = tokio::fs::File::create(&partial).await?;
            while let Some(chunk) = response.chunk().await? {
                file.write_all(&chunk).await?;
            }
            file.flush().await?;
            Ok::<(), crate::HarvestError>(())
        }
        .await;

        if let Err(e) = written {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(e);
        }

        tokio::fs::rename(&partial, &target).await?;
        Ok(())
    }
}

/// Extension of the URL's last path segment, lowercased
///
/// ```
/// use blog_harvest::images::extension_from_url;
///
/// assert_eq!(extension_from_url("https://cdn.example.com/a/photo.PNG?w=300").as_deref(), Some("png"));
/// assert_eq!(extension_from_url("https://cdn.example.com/a/photo"), None);
/// ```
pub fn extension_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let segment = parsed.path_segments()?.next_back()?;
    let (stem, extension) = segment.rsplit_once('.')?;
    let valid = !stem.is_empty()
        && (1..=5).contains(&extension.len())
        && extension.chars().all(|c| c.is_ascii_alphanumeric());
    valid.then(|| extension.to_ascii_lowercase())
}

/// Maps an image content type to a file extension
pub fn extension_for_content_type(content_type: &str) -> &'static str {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    match mime.as_str() {
        "image/png" => "png",
        "image/jpeg" | "image/jpg" => "jpg",
        "image/webp" => "webp",
        "image/gif" => "gif",
        _ => DEFAULT_EXTENSION,
    }
}
