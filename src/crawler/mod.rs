//! Crawler module for harvesting forum threads
//!
//! This module contains the whole acquisition side of the pipeline:
//! - HTTP fetching with throttling, retries and rotated user agents
//! - Listing and thread page extraction
//! - The forum crawler, the URL queue and the worker pool
//! - Tracker refresh, periodic scheduling and overall coordination

mod coordinator;
mod fetcher;
mod forum;
mod parser;
mod queue;
mod retry;
mod scheduler;
mod thread;
mod trackers;
mod user_agent;
mod worker;

pub use coordinator::{run_harvest, Coordinator};
pub use fetcher::{build_http_client, FetchOutcome, Fetcher};
pub use forum::{is_within_cooldown, CrawlReport, ForumCrawler, StopReason};
pub use parser::{extract_magnet_links, extract_thread_links, page_url, thread_id_from_url};
pub use queue::UrlQueue;
pub use retry::RetryPolicy;
pub use scheduler::{CycleReport, Schedule, Scheduler};
pub use thread::{ThreadHandler, ThreadProcessor, ThreadReport};
pub use trackers::{parse_tracker_list, refresh_trackers};
pub use user_agent::{UserAgentRotator, DEFAULT_USER_AGENTS};
pub use worker::WorkerPool;
