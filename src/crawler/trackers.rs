//! Tracker list refresh
//!
//! The public tracker list is a plain-text file with one announce URL per
//! line. A refresh replaces `trackers:latest` wholesale; a failed or empty
//! download keeps whatever list is already cached.

use crate::catalog::keys;
use crate::crawler::fetcher::Fetcher;
use crate::store::{Batch, Store};
use crate::Result;

/// Parses a tracker list: trimmed, non-empty lines in file order
pub fn parse_tracker_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Downloads the tracker list and replaces the cached copy
///
/// # Returns
///
/// * `Ok(Some(n))` - the cache now holds `n` trackers
/// * `Ok(None)` - the download failed or was empty; the cache is untouched
/// * `Err(HarvestError)` - the store failed
pub async fn refresh_trackers(fetcher: &Fetcher, store: &dyn Store, source_url: &str) -> Result<Option<usize>> {
    tracing::info!("Updating tracker list from {}", source_url);

    let body = match fetcher.fetch(source_url).await {
        Ok(outcome) => outcome.into_html(),
        Err(e) => {
            tracing::warn!("Tracker update failed, keeping old list: {}", e);
            return Ok(None);
        }
    };

    let trackers = body.as_deref().map(parse_tracker_list).unwrap_or_default();
    if trackers.is_empty() {
        tracing::warn!("Tracker source returned no trackers, keeping old list");
        return Ok(None);
    }

    let count = trackers.len();
    let mut batch = Batch::new();
    batch
        .del(keys::TRACKERS_LATEST)
        .rpush(keys::TRACKERS_LATEST, trackers);
    store.execute(batch)?;

    tracing::info!("Tracker list updated with {} trackers", count);
    Ok(Some(count))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tracker_list() {
        let text = "udp://tracker.one:1337/announce\n\n  udp://tracker.two:80/announce  \r\n\nhttp://tracker.three/announce\n";
        assert_eq!(
            parse_tracker_list(text),
            vec![
                "udp://tracker.one:1337/announce",
                "udp://tracker.two:80/announce",
                "http://tracker.three/announce",
            ]
        );
    }

    #[test]
    fn test_parse_blank_list() {
        assert!(parse_tracker_list("\n \n\t\n").is_empty());
    }
}
