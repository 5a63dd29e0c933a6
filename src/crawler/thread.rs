//! Thread page processing
//!
//! One forum thread is handled end to end here: fetch the page, pull every
//! magnet link out of it, hand each one to the catalog writer and stamp the
//! thread's `last_visited`. Failures never escape [`ThreadProcessor::process`];
//! they are logged and appended to the `error_queue` list instead.

use crate::catalog::{keys, CatalogWriter, IngestOutcome};
use crate::crawler::fetcher::Fetcher;
use crate::crawler::parser::{extract_magnet_links, thread_id_from_url};
use crate::store::SharedStore;
use crate::Result;
use futures::future::BoxFuture;
use std::sync::Arc;

/// Per-thread ingest counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThreadReport {
    pub thread_id: String,
    pub magnets: usize,
    pub stored: usize,
    pub invalid: usize,
    pub unparsable: usize,
    pub failed: usize,
}

/// Something a worker can do with a dequeued thread URL
///
/// Implementations must swallow their own errors; a worker only guards
/// against panics.
pub trait ThreadHandler: Send + Sync + 'static {
    fn handle<'a>(&'a self, url: &'a str) -> BoxFuture<'a, ()>;
}

/// Fetches a thread page and files its magnets into the catalog
pub struct ThreadProcessor {
    fetcher: Arc<Fetcher>,
    store: SharedStore,
    writer: CatalogWriter,
}

impl ThreadProcessor {
    pub fn new(fetcher: Arc<Fetcher>, store: SharedStore) -> Self {
        let writer = CatalogWriter::new(store.clone());
        Self {
            fetcher,
            store,
            writer,
        }
    }

    /// Processes one thread URL
    ///
    /// Returns `None` when the URL carries no thread id, the page is gone or
    /// empty, or processing failed. In none of these cases does an error
    /// reach the caller.
    pub async fn process(&self, url: &str) -> Option<ThreadReport> {
        let Some(thread_id) = thread_id_from_url(url) else {
            tracing::warn!("Could not extract thread ID from URL: {}", url);
            return None;
        };

        match self.process_thread(&thread_id, url).await {
            Ok(report) => report,
            Err(e) => {
                tracing::error!("Error processing thread {}: {}", thread_id, e);
                self.record_error(&format!("Error in thread {}: {}", thread_id, e));
                None
            }
        }
    }

    async fn process_thread(&self, thread_id: &str, url: &str) -> Result<Option<ThreadReport>> {
        tracing::info!("Processing thread: {}", url);

        let Some(html) = self.fetcher.fetch(url).await?.into_html() else {
            tracing::debug!("Thread {} is gone or empty, leaving it unvisited", thread_id);
            return Ok(None);
        };

        let magnets = extract_magnet_links(&html);
        let mut report = ThreadReport {
            thread_id: thread_id.to_string(),
            magnets: magnets.len(),
            ..ThreadReport::default()
        };

        for magnet in &magnets {
            match self.writer.ingest_magnet(magnet, thread_id) {
                Ok(IngestOutcome::Stored { .. }) => report.stored += 1,
                Ok(IngestOutcome::InvalidMagnet(_)) => report.invalid += 1,
                Ok(IngestOutcome::Unparsable) => report.unparsable += 1,
                Err(e) => {
                    tracing::error!("Failed to store magnet from thread {}: {}", thread_id, e);
                    self.record_error(&format!("Error in thread {}: {}", thread_id, e));
                    report.failed += 1;
                }
            }
        }

        let now = chrono::Utc::now().timestamp().to_string();
        self.store
            .hset(&keys::thread_key(thread_id), keys::LAST_VISITED, &now)?;

        tracing::info!(
            "Thread {}: {} magnets, {} stored, {} invalid, {} unparsable",
            thread_id,
            report.magnets,
            report.stored,
            report.invalid,
            report.unparsable
        );

        Ok(Some(report))
    }

    fn record_error(&self, message: &str) {
        if let Err(e) = self.store.rpush(keys::ERROR_QUEUE, message) {
            tracing::error!("Failed to record error ({}): {}", message, e);
        }
    }
}

impl ThreadHandler for ThreadProcessor {
    fn handle<'a>(&'a self, url: &'a str) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            self.process(url).await;
        })
    }
}
