//! Statistics generation from the catalog store
//!
//! This module provides functionality for extracting and displaying
//! catalog statistics from the store.

use crate::catalog::keys;
use crate::store::{Store, StoreResult};

/// Catalog statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogStats {
    /// Shows in `catalog:series`
    pub shows: u64,

    /// Season keys across all shows
    pub seasons: u64,

    /// Episode records
    pub episodes: u64,

    /// Threads with a `last_visited` stamp
    pub visited_threads: u64,

    /// Cached tracker URLs
    pub trackers: u64,

    /// Entries in the error log
    pub errors: u64,

    /// Most recent error log entries, oldest first
    pub recent_errors: Vec<String>,
}

/// Number of error log entries kept in [`CatalogStats::recent_errors`]
const RECENT_ERRORS: usize = 5;

/// Loads statistics from the store
///
/// # Arguments
///
/// * `store` - The store backend to query
///
/// # Returns
///
/// * `Ok(CatalogStats)` - Successfully loaded statistics
/// * `Err(StoreError)` - Failed to query the store
pub fn load_statistics(store: &dyn Store) -> StoreResult<CatalogStats> {
    let shows = store.scard(keys::CATALOG_SERIES)?;
    let seasons = store.keys_with_prefix("season:")?.len() as u64;
    let episodes = store.keys_with_prefix("episode:season:")?.len() as u64;
    let visited_threads = store.keys_with_prefix(keys::THREAD_PREFIX)?.len() as u64;
    let trackers = store.llen(keys::TRACKERS_LATEST)?;

    let error_log = store.lrange(keys::ERROR_QUEUE)?;
    let errors = error_log.len() as u64;
    let recent_errors = error_log
        .into_iter()
        .skip((errors as usize).saturating_sub(RECENT_ERRORS))
        .collect();

    Ok(CatalogStats {
        shows,
        seasons,
        episodes,
        visited_threads,
        trackers,
        errors,
        recent_errors,
    })
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CatalogStats) {
    println!("=== Catalog Statistics ===\n");

    println!("Catalog:");
    println!("  Shows: {}", stats.shows);
    println!("  Seasons: {}", stats.seasons);
    println!("  Episodes: {}", stats.episodes);
    println!();

    println!("Crawl state:");
    println!("  Threads visited: {}", stats.visited_threads);
    println!("  Cached trackers: {}", stats.trackers);
    println!("  Logged errors: {}", stats.errors);

    if !stats.recent_errors.is_empty() {
        println!();
        println!("Recent errors:");
        for error in &stats.recent_errors {
            println!("  - {}", error);
        }
    }
}
