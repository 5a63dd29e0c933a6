//! Harvest coordinator - wires the pipeline together
//!
//! This module owns the process-wide pieces and their lifecycle:
//! - Opening (and optionally purging) the store
//! - Building the shared fetcher and URL queue
//! - Spawning the worker pool and the scheduler
//! - Shutting everything down on Ctrl-C or after a single pass

use crate::config::Config;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::forum::ForumCrawler;
use crate::crawler::queue::UrlQueue;
use crate::crawler::scheduler::{CycleReport, Schedule, Scheduler};
use crate::crawler::thread::ThreadProcessor;
use crate::crawler::worker::WorkerPool;
use crate::store::{open_store, SharedStore};
use crate::{HarvestError, Result};
use std::future::Future;
use std::path::Path;
use std::sync::Arc;

/// Owns the shared state of one harvester process
pub struct Coordinator {
    config: Arc<Config>,
    store: SharedStore,
    fetcher: Arc<Fetcher>,
    queue: UrlQueue,
}

impl Coordinator {
    /// Creates a coordinator over an already opened store
    pub fn new(config: Config, store: SharedStore) -> Result<Self> {
        let fetcher = Fetcher::from_config(&config)?;

        Ok(Self {
            config: Arc::new(config),
            store,
            fetcher: Arc::new(fetcher),
            queue: UrlQueue::new(),
        })
    }

    /// Opens the configured store and creates a coordinator over it
    ///
    /// # Arguments
    ///
    /// * `config` - The harvester configuration
    /// * `purge` - Flush the store before starting, in addition to `purge-on-start`
    pub fn open(config: Config, purge: bool) -> Result<Self> {
        let purge = purge || config.store.purge_on_start;
        let store = open_store(Path::new(&config.store.database_path), purge)?;
        Self::new(config, store)
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn queue(&self) -> &UrlQueue {
        &self.queue
    }

    fn scheduler(&self) -> Scheduler {
        let crawler = ForumCrawler::new(
            self.fetcher.clone(),
            self.store.clone(),
            self.queue.clone(),
            self.config.forum.base_url.clone(),
            self.config.crawler.revisit_cooldown(),
        );

        Scheduler::new(
            crawler,
            self.fetcher.clone(),
            self.store.clone(),
            self.config.trackers.source_url.clone(),
            Schedule {
                initial_pages: self.config.crawler.initial_pages,
                max_pages: self.config.crawler.max_pages,
                interval: self.config.crawler.crawl_interval(),
            },
        )
    }

    fn spawn_workers(&self) -> WorkerPool {
        let processor = Arc::new(ThreadProcessor::new(
            self.fetcher.clone(),
            self.store.clone(),
        ));
        WorkerPool::spawn(
            self.config.crawler.max_concurrency as usize,
            self.queue.clone(),
            processor,
        )
    }

    /// Runs the startup cycle once and waits for every queued thread
    ///
    /// The workers are stopped before returning, even on error.
    pub async fn run_once(&self) -> Result<CycleReport> {
        let workers = self.spawn_workers();

        let result = self.scheduler().run_initial().await;
        if result.is_ok() {
            self.queue.join().await;
        }

        workers.shutdown().await;
        result
    }

    /// Runs the scheduler and workers until `shutdown` resolves
    ///
    /// Returns early with the scheduler's error if it hits a fatal failure.
    pub async fn run_until<F>(&self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let workers = self.spawn_workers();
        let scheduler = self.scheduler();
        let mut schedule = tokio::spawn(async move { scheduler.run_forever().await });

        let result = tokio::select! {
            _ = shutdown => {
                tracing::info!("Shutdown requested, stopping harvester");
                schedule.abort();
                let _ = (&mut schedule).await;
                Ok(())
            }
            joined = &mut schedule => match joined {
                Ok(Ok(())) => Ok(()),
                Ok(Err(e)) => Err(e),
                Err(e) => Err(HarvestError::Task(e.to_string())),
            },
        };

        workers.shutdown().await;

        tracing::info!("Harvester stopped ({} URLs left in queue)", self.queue.len());
        result
    }

    /// Runs until Ctrl-C
    pub async fn run(&self) -> Result<()> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await
    }
}

/// Runs the harvester
///
/// # Arguments
///
/// * `config` - The harvester configuration
/// * `purge` - Flush the store before starting
/// * `once` - Run a single startup cycle instead of the periodic schedule
pub async fn run_harvest(config: Config, purge: bool, once: bool) -> Result<()> {
    let coordinator = Coordinator::open(config, purge)?;

    if once {
        let report = coordinator.run_once().await?;
        match report.crawl {
            Some(crawl) => tracing::info!(
                "Single pass complete: {} pages, {} threads enqueued",
                crawl.pages_crawled,
                crawl.enqueued
            ),
            None => tracing::warn!("Single pass complete but the crawl failed"),
        }
        Ok(())
    } else {
        coordinator.run().await
    }
}
