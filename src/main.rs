//! tb-harvest main entry point
//!
//! This is the command-line interface for the tb-harvest forum release harvester.

use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tb_harvest::catalog::CatalogReader;
use tb_harvest::config::{load_config_with_hash, Config};
use tb_harvest::crawler::{page_url, run_harvest};
use tb_harvest::output::{load_statistics, print_search, print_statistics};
use tb_harvest::store::SqliteStore;
use tracing_subscriber::EnvFilter;

/// tb-harvest: a forum release harvester
///
/// tb-harvest crawls a release forum, extracts magnet links from its
/// threads, parses the release titles and files every episode into a
/// show/season/episode catalog.
#[derive(Parser, Debug)]
#[command(name = "tb-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A forum release harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Flush the catalog store before starting
    #[arg(long)]
    purge: bool,

    /// Run the startup crawl once, wait for the workers, then exit
    #[arg(long)]
    once: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long, conflicts_with_all = ["stats", "search", "once", "purge"])]
    dry_run: bool,

    /// Show statistics from the catalog store and exit
    #[arg(long, conflicts_with_all = ["dry_run", "search", "once", "purge"])]
    stats: bool,

    /// Search the catalog for a show and exit
    #[arg(long, value_name = "QUERY", conflicts_with_all = ["dry_run", "stats", "once", "purge"])]
    search: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config)?;
    } else if let Some(query) = cli.search.as_deref() {
        handle_search(&config, query)?;
    } else {
        handle_harvest(config, cli.purge, cli.once).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("tb_harvest=info,warn"),
            1 => EnvFilter::new("tb_harvest=debug,info"),
            2 => EnvFilter::new("tb_harvest=trace,debug"),
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

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== tb-harvest Dry Run ===\n");

    println!("Forum:");
    println!("  Listing: {}", config.forum.base_url);
    println!("  Page 2:  {}", page_url(&config.forum.base_url, 2));

    println!("\nCrawler Configuration:");
    println!("  Workers: {}", config.crawler.max_concurrency);
    println!("  Initial pages: {}", config.crawler.initial_pages);
    println!("  Pages per periodic crawl: {}", config.crawler.max_pages);
    println!("  Crawl interval: {}s", config.crawler.crawl_interval_secs);
    println!("  Revisit cooldown: {}h", config.crawler.revisit_cooldown_hours);
    println!("  Request throttle: {}ms", config.crawler.request_throttle_ms);
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);

    println!("\nRetry:");
    println!("  Max attempts: {}", config.retry.max_attempts);
    println!(
        "  Backoff: {}ms doubling, capped at {}ms",
        config.retry.base_delay_ms, config.retry.max_delay_ms
    );

    println!("\nStore:");
    println!("  Database: {}", config.store.database_path);
    println!("  Purge on start: {}", config.store.purge_on_start);

    println!("\nTrackers:");
    println!("  Source: {}", config.trackers.source_url);

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: shows statistics from the store
fn handle_stats(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("Database: {}\n", config.store.database_path);

    let store = SqliteStore::new(Path::new(&config.store.database_path))?;
    let stats = load_statistics(&store)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --search mode: fuzzy-matches shows in the catalog
fn handle_search(config: &Config, query: &str) -> Result<(), Box<dyn std::error::Error>> {
    let store = SqliteStore::new(Path::new(&config.store.database_path))?;
    let reader = CatalogReader::new(Arc::new(store), config.search.similarity_threshold);
    print_search(&reader, query)?;

    Ok(())
}

/// Handles the main harvest operation
async fn handle_harvest(
    config: Config,
    purge: bool,
    once: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if once {
        tracing::info!("Starting single harvest pass");
    } else {
        tracing::info!(
            "Starting harvester (crawl every {}s)",
            config.crawler.crawl_interval_secs
        );
    }
    tracing::info!("Forum listing: {}", config.forum.base_url);

    match run_harvest(config, purge, once).await {
        Ok(()) => {
            tracing::info!("Harvester finished");
            Ok(())
        }
        Err(e) => {
            tracing::error!("Harvester failed: {}", e);
            Err(e.into())
        }
    }
}
