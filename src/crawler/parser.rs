//! HTML extraction for forum listings and thread pages
//!
//! This module handles:
//! - Thread links on a listing page (`a[data-ipshover]` pointing at a topic)
//! - Magnet links on a thread page
//! - Thread ids and listing page URLs

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::BTreeSet;
use url::Url;

static TOPIC_HREF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/forums/topic/\d+").expect("static regex is valid"));

static THREAD_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/topic/(\d+)-").expect("static regex is valid"));

/// Builds the URL of a listing page
///
/// Page 1 is the base URL itself; page N is `<base without trailing slash>/page/N/`.
///
/// # Example
///
/// ```
/// use tb_harvest::crawler::page_url;
///
/// let base = "https://forum.example.com/forums/forum/63-series/";
/// assert_eq!(page_url(base, 1), base);
/// assert_eq!(page_url(base, 3), "https://forum.example.com/forums/forum/63-series/page/3/");
/// ```
pub fn page_url(base_url: &str, page: u32) -> String {
    if page <= 1 {
        base_url.to_string()
    } else {
        format!("{}/page/{}/", base_url.trim_end_matches('/'), page)
    }
}

/// Extracts the numeric thread id from a topic URL (`/topic/<digits>-<slug>`)
pub fn thread_id_from_url(url: &str) -> Option<String> {
    THREAD_ID
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Resolves an href against the page it was found on
fn resolve(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    let absolute = base_url.join(href).ok()?;
    if absolute.scheme() == "http" || absolute.scheme() == "https" {
        Some(absolute.to_string())
    } else {
        None
    }
}

/// Extracts thread links from a forum listing page, in document order
///
/// Only hover-card anchors whose href points at a forum topic are kept.
/// Duplicates on the same page are preserved; deduplication is the
/// crawler's job.
pub fn extract_thread_links(html: &str, base_url: &Url) -> Vec<String> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("a[data-ipshover][href]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .filter(|href| TOPIC_HREF.is_match(href))
        .filter_map(|href| resolve(href, base_url))
        .collect()
}

/// Extracts the distinct magnet links of a thread page, sorted
pub fn extract_magnet_links(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse(r#"a[href^="magnet:?xt=urn:btih:"]"#) else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .map(|href| href.trim().to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
