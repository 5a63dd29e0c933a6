//! Store key names

/// Set of every show id with at least one ingested episode
pub const CATALOG_SERIES: &str = "catalog:series";

/// Thread URLs enqueued during the current crawl run
pub const SESSION_CRAWLED_URLS: &str = "session:crawled_urls";

/// Cached tracker URLs
pub const TRACKERS_LATEST: &str = "trackers:latest";

/// Thread-processing failures, oldest first
pub const ERROR_QUEUE: &str = "error_queue";

/// Prefix of every thread hash
pub const THREAD_PREFIX: &str = "thread:";

/// Field of the thread hash holding the last visit (unix seconds)
pub const LAST_VISITED: &str = "last_visited";

pub fn show_key(show_id: &str) -> String {
    format!("show:{}", show_id)
}

pub fn show_langs_key(show_id: &str) -> String {
    format!("show:{}:langs", show_id)
}

pub fn season_key(show_id: &str, season: u32) -> String {
    format!("season:{}:{}", show_id, season)
}

/// Prefix matching every season key of a show
pub fn season_prefix(show_id: &str) -> String {
    format!("season:{}:", show_id)
}

pub fn episode_key(show_id: &str, season: u32, episode: u32) -> String {
    format!("episode:{}:{}", season_key(show_id, season), episode)
}

pub fn thread_key(thread_id: &str) -> String {
    format!("{}{}", THREAD_PREFIX, thread_id)
}

/// Season sorted-set member for an episode at a resolution
pub fn season_member(episode: u32, resolution: &str) -> String {
    format!("{}:{}", episode, resolution)
}
