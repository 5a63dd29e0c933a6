//! Store module for persisting the catalog
//!
//! This module handles everything below the catalog key schema:
//! - The `Store` trait (hash, set, sorted-set and list semantics)
//! - Batched write commands used for pipelined ingests
//! - A SQLite backend that keeps key names verbatim

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStore;
pub use traits::{Batch, Command, Store, StoreError, StoreResult};

use std::path::Path;
use std::sync::Arc;

/// Shared handle to a store, as passed to the crawler and workers
pub type SharedStore = Arc<dyn Store>;

/// Opens the configured store, flushing it first when asked to
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
/// * `purge` - Whether to drop every key before returning
pub fn open_store(path: &Path, purge: bool) -> StoreResult<SharedStore> {
    let store = SqliteStore::new(path)?;

    if purge {
        tracing::warn!("Purge on start requested, flushing store at {}", path.display());
        store.flush()?;
    }

    Ok(Arc::new(store))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_store_with_purge_drops_existing_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.db");

        let store = open_store(&path, false).unwrap();
        store.sadd("catalog:series", "tb:a").unwrap();
        drop(store);

        let kept = open_store(&path, false).unwrap();
        assert_eq!(kept.scard("catalog:series").unwrap(), 1);
        drop(kept);

        let purged = open_store(&path, true).unwrap();
        assert_eq!(purged.scard("catalog:series").unwrap(), 0);
    }
}
