//! Crawl coordinator - listing pagination and incremental collection
//!
//! This module drives one scrape run:
//! - Walking listing pages (path convention first, `?page=` as fallback)
//! - Separating already-known posts from new ones by slug
//! - Fetching detail bodies and thumbnails for new posts
//! - Persisting the merged collection after every page
//! - Deciding when to stop

use crate::config::{validate_base_url, Config};
use crate::crawler::detail::fetch_body_with_retry;
use crate::crawler::fetcher::{build_http_client, fetch_page};
use crate::crawler::listing::{ListingEntry, ListingExtractor};
use crate::images::ImageAcquirer;
use crate::model::{Collection, Post};
use crate::output::RunSummary;
use crate::state::{CrawlPhase, StopReason};
use crate::storage::{merge, open_store, PostStore};
use crate::url::{alt_page_url, page_url};
use crate::HarvestError;
use reqwest::Client;
use std::collections::HashSet;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use url::Url;

/// Limits for one scrape run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlOptions {
    /// Listing URL; the configured base URL when `None`
    pub url: Option<String>,

    /// Page ceiling; unlimited when `None`
    pub max_pages: Option<u32>,

    /// New posts taken from a page; unlimited when `None`. Setting a cap
    /// also limits the run to a single page.
    pub posts_per_page: Option<usize>,
}

impl CrawlOptions {
    /// Builds options from command-line values
    ///
    /// `all_pages` removes the page ceiling and a `posts_per_page` of zero
    /// means unlimited.
    ///
    /// ```
    /// use blog_harvest::CrawlOptions;
    ///
    /// let options = CrawlOptions::from_command(None, Some(5), Some(0), true);
    /// assert_eq!(options.max_pages, None);
    /// assert_eq!(options.posts_per_page, None);
    /// ```
    pub fn from_command(
        url: Option<String>,
        max_pages: Option<u32>,
        posts_per_page: Option<usize>,
        all_pages: bool,
    ) -> Self {
        Self {
            url,
            max_pages: if all_pages { None } else { max_pages },
            posts_per_page: posts_per_page.filter(|&cap| cap > 0),
        }
    }

    /// Every page, every post
    pub fn all_pages(url: Option<String>) -> Self {
        Self {
            url,
            ..Default::default()
        }
    }

    /// At most `size` new posts from the first page that has any
    pub fn single_batch(url: Option<String>, size: usize) -> Self {
        Self::from_command(url, None, Some(size), false)
    }
}

/// Decides whether the crawl ends after a page; the first match wins
///
/// A page whose posts are all stored already only counts towards the page
/// ceiling, so a batch or an interrupted run moves past it.
///
/// # Arguments
///
/// * `options` - The run limits
/// * `page` - The page just processed, starting at 1
/// * `extracted` - Candidates the page produced
/// * `found_new` - Candidates with unknown slugs, before any per-page cap
fn stop_after_page(
    options: &CrawlOptions,
    page: u32,
    extracted: usize,
    found_new: usize,
) -> Option<StopReason> {
    let ceiling_reached = options.max_pages.is_some_and(|ceiling| page >= ceiling);

    if found_new == 0 {
        return ceiling_reached.then_some(StopReason::PageCeiling);
    }
    if options.posts_per_page.is_some() {
        return Some(StopReason::PerPageCap);
    }
    if found_new < extracted {
        return Some(StopReason::PartialPage);
    }
    if ceiling_reached {
        return Some(StopReason::PageCeiling);
    }
    None
}

/// Main crawl coordinator structure
pub struct Coordinator {
    config: Config,
    options: CrawlOptions,
    source_url: String,
    client: Client,
    extractor: ListingExtractor,
    images: ImageAcquirer,
    store: Box<dyn PostStore>,
    collection: Collection,
    known: HashSet<String>,
    listed: HashSet<String>,
    phase: CrawlPhase,
    summary: RunSummary,
}

impl Coordinator {
    /// Creates a coordinator using the configured store
    ///
    /// # Arguments
    ///
    /// * `config` - The scraper configuration
    /// * `options` - Limits for this run
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(HarvestError)` - Invalid listing URL, or the store could not be opened
    pub fn new(config: Config, options: CrawlOptions) -> crate::Result<Self> {
        let store = open_store(&config.output)?;
        Self::with_store(config, options, store)
    }

    /// Creates a coordinator persisting into the given store
    ///
    /// An unreadable store is logged and treated as empty.
    pub fn with_store(
        config: Config,
        options: CrawlOptions,
        mut store: Box<dyn PostStore>,
    ) -> crate::Result<Self> {
        let source_url = options
            .url
            .clone()
            .unwrap_or_else(|| config.scraper.base_url.clone());
        validate_base_url(&source_url)?;
        let base_url = Url::parse(&source_url)?;

        let client = build_http_client(&config)?;
        let extractor = ListingExtractor::new(base_url, &config.scraper);
        let images = ImageAcquirer::new(client.clone(), &config);

        let collection = match store.load() {
            Ok(collection) => collection,
            Err(e) => {
                warn!(
                    location = %store.location(),
                    error = %e,
                    "Could not load stored posts; starting from an empty collection"
                );
                Collection::empty(source_url.as_str())
            }
        };
        let known = collection.slugs();

        Ok(Self {
            config,
            options,
            source_url,
            client,
            extractor,
            images,
            store,
            collection,
            known,
            listed: HashSet::new(),
            phase: CrawlPhase::Start,
            summary: RunSummary::default(),
        })
    }

    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    /// Where the collection is persisted
    pub fn store_location(&self) -> String {
        self.store.location()
    }

    fn transition(&mut self, next: CrawlPhase) -> crate::Result<()> {
        if !self.phase.can_transition_to(next) {
            return Err(HarvestError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }
        debug!(from = %self.phase, to = %next, "Phase transition");
        self.phase = next;
        Ok(())
    }

    /// Runs the crawl until a stop condition is met
    ///
    /// Fetch, extraction and save failures are logged and counted; they do
    /// not end the run. A coordinator runs once.
    ///
    /// # Returns
    ///
    /// * `Ok(RunSummary)` - The counters of the finished run
    /// * `Err(HarvestError)` - The coordinator was already used
    pub async fn run(&mut self) -> crate::Result<RunSummary> {
        let started = Instant::now();
        info!(
            url = %self.source_url,
            max_pages = ?self.options.max_pages,
            posts_per_page = ?self.options.posts_per_page,
            known = self.known.len(),
            "Starting scrape"
        );

        if self.options.max_pages == Some(0) {
            self.finish(StopReason::PageCeiling, started)?;
            return Ok(self.summary.clone());
        }

        self.transition(CrawlPhase::FetchingPage)?;
        let mut page: u32 = 1;

        loop {
            let stop = self.crawl_page(page).await?;
            tokio::time::sleep(self.config.pacing.page_delay()).await;

            if let Some(reason) = stop {
                self.finish(reason, started)?;
                break;
            }

            if self.phase == CrawlPhase::Saved {
                self.transition(CrawlPhase::NextPage)?;
            }
            self.transition(CrawlPhase::FetchingPage)?;
            page += 1;
        }

        Ok(self.summary.clone())
    }

    fn finish(&mut self, reason: StopReason, started: Instant) -> crate::Result<()> {
        self.transition(CrawlPhase::Stopped)?;
        self.summary.stop_reason = Some(reason);
        self.summary.collection_total = self.collection.len();
        self.summary.elapsed = started.elapsed();

        info!(
            reason = %reason,
            pages = self.summary.pages_fetched,
            added = self.summary.posts_added,
            total = self.summary.collection_total,
            "Scrape finished: {}",
            reason.describe()
        );
        Ok(())
    }

    /// Processes one listing page and reports whether the crawl should stop
    async fn crawl_page(&mut self, page: u32) -> crate::Result<Option<StopReason>> {
        let mut entries = self.fetch_listing(page).await;
        if entries.is_empty() {
            info!(page, "No posts found on page");
            self.transition(CrawlPhase::NoPosts)?;
            return Ok(Some(StopReason::NoPosts));
        }

        // Out-of-range pages that serve an earlier page again end the listing
        if entries.iter().all(|entry| self.listed.contains(&entry.post.slug)) {
            info!(page, "Listing page repeats an earlier page");
            self.transition(CrawlPhase::NoPosts)?;
            return Ok(Some(StopReason::NoPosts));
        }
        self.listed
            .extend(entries.iter().map(|entry| entry.post.slug.clone()));

        let extracted = entries.len();
        self.summary.candidates_extracted += extracted;
        self.acquire_thumbnails(&mut entries).await;

        let (known, mut fresh): (Vec<ListingEntry>, Vec<ListingEntry>) = entries
            .into_iter()
            .partition(|entry| self.known.contains(&entry.post.slug));
        self.summary.posts_known += known.len();

        let found_new = fresh.len();
        if let Some(cap) = self.options.posts_per_page {
            fresh.truncate(cap);
        }
        info!(
            page,
            found = extracted,
            known = known.len(),
            new = found_new,
            taking = fresh.len(),
            "Listing page extracted"
        );

        if fresh.is_empty() {
            self.transition(CrawlPhase::NextPage)?;
        } else {
            self.transition(CrawlPhase::HasNewPosts)?;
            self.transition(CrawlPhase::ProcessingPosts)?;
            let completed = self.complete_posts(fresh).await;
            self.append_and_save(completed);
            self.transition(CrawlPhase::Saved)?;
        }

        Ok(stop_after_page(&self.options, page, extracted, found_new))
    }

    /// Fetches a listing page, falling back to the query convention past page 1
    async fn fetch_listing(&mut self, page: u32) -> Vec<ListingEntry> {
        let url = page_url(&self.source_url, page);
        let entries = self.fetch_and_extract(&url).await;
        if !entries.is_empty() || page <= 1 {
            return entries;
        }

        let alternate = alt_page_url(&self.source_url, page);
        info!(page, url = %alternate, "Trying alternate pagination URL");
        self.fetch_and_extract(&alternate).await
    }

    async fn fetch_and_extract(&mut self, url: &str) -> Vec<ListingEntry> {
        info!(url = %url, "Fetching listing page");
        self.summary.pages_fetched += 1;

        match fetch_page(&self.client, url).await.into_body(url) {
            Ok(html) => self.extractor.extract(&html),
            Err(e) => {
                warn!(url = %url, error = %e, "Listing page fetch failed");
                Vec::new()
            }
        }
    }

    async fn acquire_thumbnails(&mut self, entries: &mut [ListingEntry]) {
        for entry in entries.iter_mut() {
            let Some(image_url) = entry.image_url.as_deref() else {
                continue;
            };
            if let Some(path) = self.images.acquire(image_url, &entry.post.slug).await {
                entry.post.og_image.get_or_insert_with(|| path.clone());
                entry.post.thumbnail_path = Some(path);
                self.summary.images_stored += 1;
            }
        }
    }

    /// Fetches the body of every new post, pacing consecutive posts
    async fn complete_posts(&mut self, fresh: Vec<ListingEntry>) -> Vec<Post> {
        let total = fresh.len();
        let mut completed = Vec::with_capacity(total);

        for (index, entry) in fresh.into_iter().enumerate() {
            if index > 0 {
                tokio::time::sleep(self.config.pacing.post_delay()).await;
            }

            let mut post = entry.post;
            info!(post = index + 1, total, title = %post.title, "Processing post");

            if post.url.is_empty() {
                warn!(slug = %post.slug, "Post has no detail URL; keeping it without a body");
                self.summary.bodies_failed += 1;
            } else {
                post.body = fetch_body_with_retry(
                    &self.client,
                    &post.url,
                    &self.config.retry,
                    self.config.pacing.retry_delay(),
                )
                .await;

                if post.has_body() {
                    self.summary.bodies_fetched += 1;
                } else {
                    self.summary.bodies_failed += 1;
                }
            }

            self.known.insert(post.slug.clone());
            completed.push(post);
        }

        completed
    }

    /// Merges completed posts into the collection and persists it
    fn append_and_save(&mut self, completed: Vec<Post>) {
        let before = self.collection.len();
        let existing = std::mem::take(&mut self.collection);
        self.collection = merge(existing, completed);
        self.collection.stamp(&self.source_url);
        self.summary.posts_added += self.collection.len() - before;

        match self.store.save(&self.collection) {
            Ok(()) => info!(
                location = %self.store.location(),
                total = self.collection.len(),
                "Saved collection"
            ),
            Err(e) => {
                error!(location = %self.store.location(), error = %e, "Failed to save collection");
                self.summary.save_failures += 1;
            }
        }
    }
}

/// Runs a complete scrape with the configured store
///
/// # Example
///
/// ```no_run
/// use blog_harvest::config::Config;
/// use blog_harvest::crawler::run_scrape;
/// use blog_harvest::CrawlOptions;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let summary = run_scrape(Config::default(), CrawlOptions::all_pages(None)).await?;
/// println!("{} posts added", summary.posts_added);
/// # Ok(())
/// # }
/// ```
pub async fn run_scrape(config: Config, options: CrawlOptions) -> crate::Result<RunSummary> {
    let mut coordinator = Coordinator::new(config, options)?;
    coordinator.run().await
}
