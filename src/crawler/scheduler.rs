//! Periodic crawl scheduling
//!
//! This module handles:
//! - The initial cycle at startup (tracker refresh, crawl of `initial_pages`)
//! - The periodic cycle (sleep, tracker refresh, crawl of `max_pages`)
//! - Deciding which failures end the loop
//!
//! A crawl that fails on the network is logged and the schedule carries on.
//! A store failure is fatal and is returned to the caller.

use crate::crawler::fetcher::Fetcher;
use crate::crawler::forum::{CrawlReport, ForumCrawler};
use crate::crawler::trackers::refresh_trackers;
use crate::store::SharedStore;
use crate::Result;
use std::sync::Arc;
use std::time::Duration;

/// Outcome of one scheduled cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    /// Tracker count after a successful refresh
    pub trackers: Option<usize>,
    /// Crawl summary, absent if the crawl failed
    pub crawl: Option<CrawlReport>,
}

/// Page budgets and pacing of the schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub initial_pages: u32,
    pub max_pages: u32,
    pub interval: Duration,
}

/// Drives tracker refreshes and crawler runs on a fixed interval
pub struct Scheduler {
    crawler: ForumCrawler,
    fetcher: Arc<Fetcher>,
    store: SharedStore,
    trackers_url: String,
    schedule: Schedule,
}

impl Scheduler {
    pub fn new(
        crawler: ForumCrawler,
        fetcher: Arc<Fetcher>,
        store: SharedStore,
        trackers_url: impl Into<String>,
        schedule: Schedule,
    ) -> Self {
        Self {
            crawler,
            fetcher,
            store,
            trackers_url: trackers_url.into(),
            schedule,
        }
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Refreshes the trackers and crawls up to `max_pages` listing pages
    pub async fn run_cycle(&self, max_pages: u32) -> Result<CycleReport> {
        let trackers = refresh_trackers(&self.fetcher, self.store.as_ref(), &self.trackers_url).await?;

        let crawl = match self.crawler.run(max_pages).await {
            Ok(report) => Some(report),
            Err(e) if e.is_store() => return Err(e),
            Err(e) => {
                tracing::error!("Crawler run failed: {}", e);
                None
            }
        };

        Ok(CycleReport { trackers, crawl })
    }

    /// Runs the startup cycle with the `initial_pages` budget
    pub async fn run_initial(&self) -> Result<CycleReport> {
        tracing::info!(
            "Running initial crawl of {} pages",
            self.schedule.initial_pages
        );
        self.run_cycle(self.schedule.initial_pages).await
    }

    /// Runs the initial cycle, then a `max_pages` cycle after every interval
    ///
    /// Only returns on a fatal error; cancel the task to stop it.
    pub async fn run_forever(&self) -> Result<()> {
        self.run_initial().await?;

        loop {
            tracing::info!(
                "Sleeping for {:?} before next crawl",
                self.schedule.interval
            );
            tokio::time::sleep(self.schedule.interval).await;
            self.run_cycle(self.schedule.max_pages).await?;
        }
    }
}
