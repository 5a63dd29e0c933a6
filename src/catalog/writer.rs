//! Catalog writer: structured releases into store mutations
//!
//! Every write is idempotent on its own (set-if-absent show fields, set
//! unions, sorted-set rescoring, hash overwrites), so concurrent workers can
//! ingest overlapping releases without coordinating.

use crate::catalog::keys;
use crate::catalog::magnet::{MagnetError, MagnetLink};
use crate::catalog::normalize::show_id_for;
use crate::release::{language_code, parse_title, StructuredRelease};
use crate::store::{Batch, SharedStore, StoreResult};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// Stored when a release names no resolution
pub const DEFAULT_RESOLUTION: &str = "SD";

/// Stored for any other missing quality field
pub const NOT_AVAILABLE: &str = "N/A";

/// What happened to one magnet link
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Written under the given show id
    Stored { show_id: String, episodes: u32 },
    /// The magnet URI or its info-hash was malformed
    InvalidMagnet(MagnetError),
    /// The display name did not yield a title, season and episode
    Unparsable,
}

/// Builds every mutation for one release found behind one magnet
///
/// Returns the show id together with the batch. Nothing is read from the
/// store, so the same inputs always produce the same commands.
pub fn build_batch(
    release: &StructuredRelease,
    magnet: &MagnetLink,
    thread_id: &str,
    timestamp: i64,
) -> (String, Batch) {
    let show_id = show_id_for(&release.title, release.year);
    let languages: BTreeSet<String> = release.languages.iter().map(|l| language_code(l)).collect();
    let languages_csv = languages.iter().cloned().collect::<Vec<_>>().join(",");
    let resolution = release.resolution.as_deref().unwrap_or(DEFAULT_RESOLUTION);
    let or_na = |value: &Option<String>| value.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string());

    let mut batch = Batch::new();

    let show_key = keys::show_key(&show_id);
    batch
        .hsetnx(&show_key, "name", release.show_name())
        .hsetnx(&show_key, "id", &show_id)
        .sadd(keys::show_langs_key(&show_id), languages.iter().cloned())
        .sadd(keys::CATALOG_SERIES, [show_id.clone()]);

    let season_key = keys::season_key(&show_id, release.season);
    let timestamp_text = timestamp.to_string();

    for episode in release.episodes() {
        batch.hset(
            keys::episode_key(&show_id, release.season, episode),
            [
                ("magnet", magnet.uri.clone()),
                ("title", magnet.title().to_string()),
                ("resolution", resolution.to_string()),
                ("languages", languages_csv.clone()),
                ("video_codec", or_na(&release.video_codec)),
                ("audio_codec", or_na(&release.audio_codec)),
                ("size", or_na(&release.size)),
                ("source", or_na(&release.source)),
                ("thread_id", thread_id.to_string()),
                ("timestamp", timestamp_text.clone()),
            ],
        );
        batch.zadd(&season_key, keys::season_member(episode, resolution), timestamp);
    }

    (show_id, batch)
}

/// Writes parsed releases into the catalog
#[derive(Clone)]
pub struct CatalogWriter {
    store: SharedStore,
}

impl CatalogWriter {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Persists one release as a single batch and returns its show id
    pub fn persist(
        &self,
        release: &StructuredRelease,
        magnet: &MagnetLink,
        thread_id: &str,
    ) -> StoreResult<String> {
        let timestamp = chrono::Utc::now().timestamp();
        let (show_id, batch) = build_batch(release, magnet, thread_id, timestamp);

        info!(
            "Persisting {} S{:02}E{}-{} ({} commands)",
            release.title,
            release.season,
            release.episode_start,
            release.episode_end,
            batch.len()
        );

        self.store.execute(batch)?;
        Ok(show_id)
    }

    /// Validates a magnet URI, parses its display name and persists the result
    ///
    /// Invalid magnets and unparsable titles are reported in the outcome;
    /// only store failures are errors.
    pub fn ingest_magnet(&self, magnet_uri: &str, thread_id: &str) -> StoreResult<IngestOutcome> {
        let magnet = match MagnetLink::parse(magnet_uri) {
            Ok(magnet) => magnet,
            Err(e) => {
                warn!("Dropping magnet from thread {}: {}", thread_id, e);
                return Ok(IngestOutcome::InvalidMagnet(e));
            }
        };

        let Some(release) = parse_title(magnet.title()) else {
            debug!("Skipping unparsable magnet title in thread {}", thread_id);
            return Ok(IngestOutcome::Unparsable);
        };

        let show_id = self.persist(&release, &magnet, thread_id)?;
        Ok(IngestOutcome::Stored {
            show_id,
            episodes: release.episode_end - release.episode_start + 1,
        })
    }
}
