//! Output module for reporting on the catalog
//!
//! This module handles:
//! - Catalog and crawl-state statistics (`--stats`)
//! - Search results and show listings printed by the CLI (`--search`)

pub mod stats;

pub use stats::{load_statistics, print_statistics, CatalogStats};

use crate::catalog::{CatalogReader, SearchMatch};
use crate::store::StoreResult;

/// Searches the catalog and prints matches, best first
///
/// # Arguments
///
/// * `reader` - Catalog reader with the configured similarity threshold
/// * `query` - Free-text show name
///
/// # Returns
///
/// * `Ok(matches)` - The matches that were printed
/// * `Err(StoreError)` - Failed to query the store
pub fn print_search(reader: &CatalogReader, query: &str) -> StoreResult<Vec<SearchMatch>> {
    let matches = reader.search(query)?;

    if matches.is_empty() {
        println!("No shows match \"{}\"", query);
        return Ok(matches);
    }

    println!("=== Shows matching \"{}\" ===\n", query);
    for found in &matches {
        println!("  {:.2}  {}  ({})", found.score, found.show.name, found.show.id);

        if let Some(meta) = reader.show_meta(&found.show.id)? {
            let mut seasons: Vec<u32> = meta.videos.iter().map(|v| v.season).collect();
            seasons.dedup();
            println!(
                "        {} episodes in {} season(s), languages: {}",
                meta.videos.len(),
                seasons.len(),
                if meta.languages.is_empty() {
                    "-".to_string()
                } else {
                    meta.languages.join(", ")
                }
            );
        }
    }

    Ok(matches)
}
