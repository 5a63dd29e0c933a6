use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for tb-harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub forum: ForumConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub trackers: TrackersConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

/// Forum being harvested
#[derive(Debug, Clone, Deserialize)]
pub struct ForumConfig {
    /// Listing URL of the forum section (page 1)
    #[serde(rename = "base-url")]
    pub base_url: String,
}

/// Crawler and worker pool behavior
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Seconds the scheduler sleeps between periodic crawls
    #[serde(rename = "crawl-interval-secs", default = "default_crawl_interval")]
    pub crawl_interval_secs: u64,

    /// Hours before a processed thread may be crawled again
    #[serde(rename = "revisit-cooldown-hours", default = "default_revisit_cooldown")]
    pub revisit_cooldown_hours: u64,

    /// Number of workers, also the cap on in-flight requests
    #[serde(rename = "max-concurrency", default = "default_max_concurrency")]
    pub max_concurrency: u32,

    /// Page budget of the startup crawl
    #[serde(rename = "initial-pages", default = "default_initial_pages")]
    pub initial_pages: u32,

    /// Page budget of each periodic crawl
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: u32,

    /// Fixed delay before every request (milliseconds)
    #[serde(rename = "request-throttle-ms", default = "default_request_throttle")]
    pub request_throttle_ms: u64,

    /// Whole-request timeout (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

/// Fetch retry policy
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    /// Total attempts per fetch, including the first one
    #[serde(rename = "max-attempts", default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay after the first failed attempt (milliseconds), doubled each time
    #[serde(rename = "base-delay-ms", default = "default_base_delay")]
    pub base_delay_ms: u64,

    /// Upper bound on any single backoff delay (milliseconds)
    #[serde(rename = "max-delay-ms", default = "default_max_delay")]
    pub max_delay_ms: u64,
}

/// Store location and startup behavior
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path", default = "default_database_path")]
    pub database_path: String,

    /// Flush every key before the workers start
    #[serde(rename = "purge-on-start", default)]
    pub purge_on_start: bool,
}

/// Tracker list source
#[derive(Debug, Clone, Deserialize)]
pub struct TrackersConfig {
    /// Plaintext document with one tracker URL per line
    #[serde(rename = "source-url", default = "default_tracker_source")]
    pub source_url: String,
}

/// Catalog search tuning
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Minimum similarity (0.0 to 1.0) for a show to match a query
    #[serde(rename = "similarity-threshold", default = "default_similarity_threshold")]
    pub similarity_threshold: f64,
}

fn default_crawl_interval() -> u64 {
    1800
}

fn default_revisit_cooldown() -> u64 {
    24
}

fn default_max_concurrency() -> u32 {
    8
}

fn default_initial_pages() -> u32 {
    5
}

fn default_max_pages() -> u32 {
    1000
}

fn default_request_throttle() -> u64 {
    250
}

fn default_request_timeout() -> u64 {
    30
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay() -> u64 {
    2000
}

fn default_max_delay() -> u64 {
    10_000
}

fn default_database_path() -> String {
    "./catalog.db".to_string()
}

fn default_tracker_source() -> String {
    "https://ngosang.github.io/trackerslist/trackers_best.txt".to_string()
}

fn default_similarity_threshold() -> f64 {
    0.85
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            crawl_interval_secs: default_crawl_interval(),
            revisit_cooldown_hours: default_revisit_cooldown(),
            max_concurrency: default_max_concurrency(),
            initial_pages: default_initial_pages(),
            max_pages: default_max_pages(),
            request_throttle_ms: default_request_throttle(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay(),
            max_delay_ms: default_max_delay(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            purge_on_start: false,
        }
    }
}

impl Default for TrackersConfig {
    fn default() -> Self {
        Self {
            source_url: default_tracker_source(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: default_similarity_threshold(),
        }
    }
}

impl CrawlerConfig {
    pub fn crawl_interval(&self) -> Duration {
        Duration::from_secs(self.crawl_interval_secs)
    }

    pub fn revisit_cooldown(&self) -> Duration {
        Duration::from_secs(self.revisit_cooldown_hours * 3600)
    }

    pub fn request_throttle(&self) -> Duration {
        Duration::from_millis(self.request_throttle_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Config {
    /// Builds a configuration with defaults everywhere except the forum URL
    pub fn for_forum(base_url: impl Into<String>) -> Self {
        Self {
            forum: ForumConfig {
                base_url: base_url.into(),
            },
            crawler: CrawlerConfig::default(),
            retry: RetryConfig::default(),
            store: StoreConfig::default(),
            trackers: TrackersConfig::default(),
            search: SearchConfig::default(),
        }
    }
}
