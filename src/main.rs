//! Blog-Harvest main entry point
//!
//! This is the command-line interface for the Blog-Harvest archiver.

use anyhow::{Context, Result};
use blog_harvest::config::{load_or_default, Config};
use blog_harvest::crawler::Coordinator;
use blog_harvest::import::{
    fetch_posts, import_into_store, load_credentials, save_credentials, DbCredentials,
    DEFAULT_HOST, DEFAULT_PORT, DEFAULT_TABLE,
};
use blog_harvest::output::{print_run_summary, print_statistics, CollectionStats};
use blog_harvest::storage::open_store;
use blog_harvest::CrawlOptions;
use clap::Parser;
use console::style;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Password, Select};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Posts taken per batch in the interactive batch mode
const BATCH_SIZE: usize = 10;

/// Blog-Harvest: an incremental blog archiver
///
/// Blog-Harvest walks a paginated blog listing, fetches every post it has not
/// seen before, stores the cleaned article bodies and thumbnails, and keeps
/// the collection free of duplicates across runs.
#[derive(Parser, Debug)]
#[command(name = "blog-harvest")]
#[command(version = "1.0.0")]
#[command(about = "An incremental blog archiver", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Listing URL to scrape (overrides the configured base URL)
    #[arg(long)]
    url: Option<String>,

    /// Maximum number of listing pages
    #[arg(long, value_name = "N")]
    max_pages: Option<u32>,

    /// New posts taken from one page, then stop (0 = unlimited)
    #[arg(long, value_name = "N")]
    posts_per_page: Option<usize>,

    /// Scrape every page, ignoring --max-pages
    #[arg(long)]
    all: bool,

    /// Run with the given arguments instead of the menu
    #[arg(long)]
    non_interactive: bool,

    /// Show statistics for the stored collection and exit
    #[arg(long, conflicts_with_all = ["all", "max_pages", "posts_per_page", "non_interactive"])]
    stats: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    /// Any scrape argument implies non-interactive mode
    fn is_non_interactive(&self) -> bool {
        self.non_interactive
            || self.max_pages.is_some()
            || self.posts_per_page.is_some()
            || self.all
    }
}

/// Entries of the interactive menu, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuChoice {
    ScrapeAll,
    ScrapeBatch,
    Import,
    Exit,
}

impl MenuChoice {
    const ALL: [MenuChoice; 4] = [Self::ScrapeAll, Self::ScrapeBatch, Self::Import, Self::Exit];

    fn label(&self) -> String {
        match self {
            Self::ScrapeAll => "Scrape all pages".to_string(),
            Self::ScrapeBatch => format!("Scrape one batch ({} posts)", BATCH_SIZE),
            Self::Import => "Import from database".to_string(),
            Self::Exit => "Exit".to_string(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = load_or_default(cli.config.as_deref()).with_context(|| match &cli.config {
        Some(path) => format!("Failed to load configuration from {}", path.display()),
        None => "Invalid default configuration".to_string(),
    })?;

    if cli.stats {
        handle_stats(&config)
    } else if cli.is_non_interactive() {
        let options =
            CrawlOptions::from_command(cli.url.clone(), cli.max_pages, cli.posts_per_page, cli.all);
        handle_scrape(config, options).await
    } else {
        run_menu(config, cli.url.clone()).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("blog_harvest=info,warn"),
            1 => EnvFilter::new("blog_harvest=debug,info"),
            2 => EnvFilter::new("blog_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --stats mode: shows statistics for the stored collection
fn handle_stats(config: &Config) -> Result<()> {
    let mut store = open_store(&config.output).context("Failed to open the post store")?;
    println!("Store: {}\n", store.location());

    let collection = store.load().context("Failed to load stored posts")?;
    print_statistics(&CollectionStats::from_collection(&collection));

    Ok(())
}

/// Runs one scrape and prints its summary
async fn handle_scrape(config: Config, options: CrawlOptions) -> Result<()> {
    let mut coordinator =
        Coordinator::new(config, options).context("Failed to prepare the scrape")?;
    let summary = coordinator.run().await.context("Scrape aborted")?;

    println!();
    print_run_summary(&summary, &coordinator.store_location());
    Ok(())
}

/// Interactive menu loop
async fn run_menu(config: Config, url: Option<String>) -> Result<()> {
    let theme = ColorfulTheme::default();
    let labels: Vec<String> = MenuChoice::ALL.iter().map(MenuChoice::label).collect();

    println!();
    println!("{}", style("Blog-Harvest").bold());
    println!(
        "{}",
        style("Posts and images already in the store are skipped.").dim()
    );

    loop {
        println!();
        let index = Select::with_theme(&theme)
            .with_prompt("Choose a mode")
            .items(&labels)
            .default(0)
            .interact()?;

        match MenuChoice::ALL[index] {
            MenuChoice::ScrapeAll => {
                handle_scrape(config.clone(), CrawlOptions::all_pages(url.clone())).await?;
                println!("{}", style("Finished scraping all pages.").green());
                return Ok(());
            }
            MenuChoice::ScrapeBatch => loop {
                handle_scrape(
                    config.clone(),
                    CrawlOptions::single_batch(url.clone(), BATCH_SIZE),
                )
                .await?;

                println!();
                let again = Confirm::with_theme(&theme)
                    .with_prompt("Continue with the next batch?")
                    .default(false)
                    .interact()?;
                if !again {
                    println!("{}", style("Done.").green());
                    return Ok(());
                }
            },
            MenuChoice::Import => {
                if let Err(e) = handle_import(&config, &theme).await {
                    println!("{}", style(format!("Import failed: {:#}", e)).red());
                }
            }
            MenuChoice::Exit => return Ok(()),
        }
    }
}

/// Imports posts from a MySQL database into the store
async fn handle_import(config: &Config, theme: &ColorfulTheme) -> Result<()> {
    let Some(credentials) = prompt_credentials(&config.import.credentials_file, theme)? else {
        return Ok(());
    };

    let posts = fetch_posts(&credentials).await?;
    if posts.is_empty() {
        println!("{}", style("No posts found in the database.").yellow());
        return Ok(());
    }

    let mut store = open_store(&config.output).context("Failed to open the post store")?;
    let outcome = import_into_store(store.as_mut(), posts, &config.scraper.base_url)
        .context("Failed to save imported posts")?;

    println!(
        "{}",
        style(format!(
            "Imported {} posts ({} new, {} total) into {}",
            outcome.fetched,
            outcome.added,
            outcome.total,
            store.location()
        ))
        .green()
    );
    Ok(())
}

/// Reuses cached credentials or asks for new ones
///
/// Returns `None` when the entered credentials are rejected; the reason is
/// printed. Accepted credentials are cached for the next import.
fn prompt_credentials(cache: &Path, theme: &ColorfulTheme) -> Result<Option<DbCredentials>> {
    match load_credentials(cache) {
        Ok(Some(cached)) => {
            println!("Found saved credentials in {}", cache.display());
            let reuse = Confirm::with_theme(theme)
                .with_prompt("Use the saved credentials?")
                .default(true)
                .interact()?;
            if reuse {
                return Ok(Some(cached));
            }
        }
        Ok(None) => {}
        Err(e) => tracing::warn!(path = %cache.display(), error = %e, "Could not read saved credentials"),
    }

    println!();
    println!("{}", style("Database credentials").bold());

    let host: String = Input::with_theme(theme)
        .with_prompt("Host")
        .default(DEFAULT_HOST.to_string())
        .interact_text()?;
    let port: u16 = Input::with_theme(theme)
        .with_prompt("Port")
        .default(DEFAULT_PORT)
        .interact_text()?;
    let database: String = Input::with_theme(theme)
        .with_prompt("Database name")
        .allow_empty(true)
        .interact_text()?;
    let username: String = Input::with_theme(theme)
        .with_prompt("Username")
        .allow_empty(true)
        .interact_text()?;
    let password = Password::with_theme(theme)
        .with_prompt("Password")
        .allow_empty_password(true)
        .interact()?;
    let table_name: String = Input::with_theme(theme)
        .with_prompt("Posts table")
        .default(DEFAULT_TABLE.to_string())
        .interact_text()?;

    let credentials = DbCredentials {
        host,
        port,
        database,
        username,
        password,
        table_name,
    };

    if let Some(message) = rejection_message(&credentials) {
        println!("{}", style(message).yellow());
        return Ok(None);
    }

    match save_credentials(cache, &credentials) {
        Ok(()) => println!("{}", style(format!("Saved to {}", cache.display())).dim()),
        Err(e) => tracing::warn!(path = %cache.display(), error = %e, "Could not cache credentials"),
    }

    Ok(Some(credentials))
}

/// Why entered credentials cannot be used, if they cannot
fn rejection_message(credentials: &DbCredentials) -> Option<String> {
    credentials
        .validate()
        .err()
        .map(|e| format!("{}; import cancelled.", e))
}
