//! Forum listing crawler
//!
//! Walks the listing pages of the forum section from page 1 upward and feeds
//! thread URLs into the shared queue. A run stops at the first page that is
//! missing, empty or free of thread links, or when the page budget is spent.
//!
//! Two independent filters decide whether a thread is enqueued:
//! - Revisit cooldown: `thread:<id>.last_visited` in the store, across runs
//! - Session dedup: the `session:crawled_urls` set, cleared at the start of
//!   every run

use crate::catalog::keys;
use crate::crawler::fetcher::{FetchOutcome, Fetcher};
use crate::crawler::parser::{extract_thread_links, page_url, thread_id_from_url};
use crate::crawler::queue::UrlQueue;
use crate::store::{SharedStore, StoreResult};
use crate::Result;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Why a crawl run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The listing page returned 404
    NotFound,
    /// The listing page had an empty body
    EmptyPage,
    /// The listing page had no thread links
    NoThreadLinks,
    /// Every page of the budget was crawled
    PageBudget,
}

/// Summary of one crawl run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlReport {
    pub pages_crawled: u32,
    pub links_found: usize,
    pub enqueued: usize,
    pub skipped_recent: usize,
    pub skipped_duplicate: usize,
    pub stop_reason: StopReason,
}

impl CrawlReport {
    fn new() -> Self {
        Self {
            pages_crawled: 0,
            links_found: 0,
            enqueued: 0,
            skipped_recent: 0,
            skipped_duplicate: 0,
            stop_reason: StopReason::PageBudget,
        }
    }
}

/// Returns true if a thread visited at `last_visited` is still cooling down at `now`
///
/// Both instants are unix seconds.
pub fn is_within_cooldown(last_visited: i64, now: i64, cooldown: Duration) -> bool {
    let cooldown = i64::try_from(cooldown.as_secs()).unwrap_or(i64::MAX);
    now.saturating_sub(last_visited) < cooldown
}

/// Paginates the forum listing and enqueues eligible threads
pub struct ForumCrawler {
    fetcher: Arc<Fetcher>,
    store: SharedStore,
    queue: UrlQueue,
    base_url: String,
    revisit_cooldown: Duration,
}

impl ForumCrawler {
    pub fn new(
        fetcher: Arc<Fetcher>,
        store: SharedStore,
        queue: UrlQueue,
        base_url: impl Into<String>,
        revisit_cooldown: Duration,
    ) -> Self {
        Self {
            fetcher,
            store,
            queue,
            base_url: base_url.into(),
            revisit_cooldown,
        }
    }

    /// Runs one crawl over at most `max_pages` listing pages
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlReport)` - the run ended normally (including a soft stop)
    /// * `Err(HarvestError)` - a listing page kept failing or the store failed
    pub async fn run(&self, max_pages: u32) -> Result<CrawlReport> {
        tracing::info!("Starting crawler run (up to {} pages)", max_pages);
        self.store.del(keys::SESSION_CRAWLED_URLS)?;

        let mut report = CrawlReport::new();

        for page in 1..=max_pages {
            if let Some(reason) = self.crawl_page(page, &mut report).await? {
                report.stop_reason = reason;
                break;
            }
        }

        tracing::info!(
            "Crawler run finished: {} pages, {} links, {} enqueued, {} recent, {} duplicate ({:?})",
            report.pages_crawled,
            report.links_found,
            report.enqueued,
            report.skipped_recent,
            report.skipped_duplicate,
            report.stop_reason
        );

        Ok(report)
    }

    /// Crawls one listing page; returns a stop reason when pagination should end
    async fn crawl_page(&self, page: u32, report: &mut CrawlReport) -> Result<Option<StopReason>> {
        let url = page_url(&self.base_url, page);
        tracing::info!("Crawling forum page: {}", url);

        let html = match self.fetcher.fetch(&url).await? {
            FetchOutcome::NotFound => return Ok(Some(StopReason::NotFound)),
            FetchOutcome::Page(body) if body.trim().is_empty() => {
                return Ok(Some(StopReason::EmptyPage))
            }
            FetchOutcome::Page(body) => body,
        };
        report.pages_crawled += 1;

        let page_base = Url::parse(&url)?;
        let links = extract_thread_links(&html, &page_base);
        if links.is_empty() {
            tracing::info!(
                "No more thread links found on page {}. Ending crawl for this run.",
                page
            );
            return Ok(Some(StopReason::NoThreadLinks));
        }
        report.links_found += links.len();

        let now = chrono::Utc::now().timestamp();
        for link in links {
            let Some(thread_id) = thread_id_from_url(&link) else {
                tracing::debug!("Skipping link without thread id: {}", link);
                continue;
            };

            if self.recently_visited(&thread_id, now)? {
                tracing::trace!("Skipping recently visited thread: {}", thread_id);
                report.skipped_recent += 1;
                continue;
            }

            if self.store.sismember(keys::SESSION_CRAWLED_URLS, &link)? {
                report.skipped_duplicate += 1;
                continue;
            }

            self.queue.push(link.as_str());
            self.store.sadd(keys::SESSION_CRAWLED_URLS, &link)?;
            report.enqueued += 1;
        }

        Ok(None)
    }

    /// An unreadable `last_visited` counts as stale so the next visit rewrites it
    fn recently_visited(&self, thread_id: &str, now: i64) -> StoreResult<bool> {
        let key = keys::thread_key(thread_id);
        let Some(value) = self.store.hget(&key, keys::LAST_VISITED)? else {
            return Ok(false);
        };

        match value.trim().parse::<i64>() {
            Ok(last) => Ok(is_within_cooldown(last, now, self.revisit_cooldown)),
            Err(e) => {
                tracing::warn!(
                    "Ignoring unreadable {}.{} {:?}: {}",
                    key,
                    keys::LAST_VISITED,
                    value,
                    e
                );
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: Duration = Duration::from_secs(24 * 3600);

    #[test]
    fn test_cooldown_boundary() {
        let now = 1_700_000_000;
        let cooldown = DAY.as_secs() as i64;

        assert!(is_within_cooldown(now - cooldown + 1, now, DAY));
        assert!(!is_within_cooldown(now - cooldown, now, DAY));
        assert!(!is_within_cooldown(now - cooldown - 1, now, DAY));
    }

    #[test]
    fn test_future_visit_counts_as_recent() {
        let now = 1_700_000_000;
        assert!(is_within_cooldown(now + 60, now, DAY));
    }

    #[test]
    fn test_zero_cooldown_never_skips() {
        assert!(!is_within_cooldown(100, 100, Duration::ZERO));
    }

    #[test]
    fn test_new_report_defaults_to_budget_stop() {
        let report = CrawlReport::new();
        assert_eq!(report.stop_reason, StopReason::PageBudget);
        assert_eq!(report.enqueued, 0);
    }
}
