//! Read-side helpers over the catalog
//!
//! These are thin reads over the store used by the CLI. The only logic of
//! note is the fuzzy search, which compares a normalized query against the
//! normalized title recovered from every show id.

use crate::catalog::keys;
use crate::catalog::magnet::append_trackers;
use crate::catalog::normalize::{normalize_title, title_from_show_id};
use crate::store::{SharedStore, StoreResult};
use std::collections::BTreeSet;

/// Prefix of every stream name
pub const STREAM_NAME_PREFIX: &str = "TamilBlasters";

/// Entry of the show catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowSummary {
    pub id: String,
    pub name: String,
}

/// One playable episode of a show
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Video {
    /// `<show_id>:<season>:<episode>`
    pub id: String,
    pub title: String,
    pub season: u32,
    pub episode: u32,
}

/// Show details with its episodes ordered by (season, episode)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowMeta {
    pub id: String,
    pub name: String,
    pub languages: Vec<String>,
    pub videos: Vec<Video>,
}

/// A stream for one episode, with trackers appended to the magnet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamEntry {
    pub name: String,
    pub title: String,
    pub url: String,
}

/// A search hit
#[derive(Debug, Clone, PartialEq)]
pub struct SearchMatch {
    pub show: ShowSummary,
    /// Similarity in 0.0..=1.0
    pub score: f64,
}

/// Scores how well a normalized query matches a normalized title
///
/// The result is the best of the whole-string Jaro-Winkler and Levenshtein
/// similarities and a windowed score that compares the query against every
/// run of the same number of words in the title. The windowed score is
/// discounted by 10% so partial matches rank below full ones.
pub fn similarity(query: &str, title: &str) -> f64 {
    if query.is_empty() || title.is_empty() {
        return 0.0;
    }
    if query == title {
        return 1.0;
    }

    let full = strsim::jaro_winkler(query, title).max(strsim::normalized_levenshtein(query, title));

    let query_words = query.split_whitespace().count();
    let title_words: Vec<&str> = title.split_whitespace().collect();
    let partial = if query_words > 0 && query_words < title_words.len() {
        title_words
            .windows(query_words)
            .map(|window| strsim::normalized_levenshtein(query, &window.join(" ")))
            .fold(0.0, f64::max)
            * 0.9
    } else {
        0.0
    };

    full.max(partial)
}

/// Reads shows, episodes and streams from the catalog
#[derive(Clone)]
pub struct CatalogReader {
    store: SharedStore,
    similarity_threshold: f64,
}

impl CatalogReader {
    pub fn new(store: SharedStore, similarity_threshold: f64) -> Self {
        Self {
            store,
            similarity_threshold,
        }
    }

    fn summary(&self, show_id: &str) -> StoreResult<Option<ShowSummary>> {
        let fields = self.store.hgetall(&keys::show_key(show_id))?;
        if fields.is_empty() {
            return Ok(None);
        }

        Ok(Some(ShowSummary {
            id: fields.get("id").cloned().unwrap_or_else(|| show_id.to_string()),
            name: fields
                .get("name")
                .cloned()
                .unwrap_or_else(|| "Unknown".to_string()),
        }))
    }

    /// Every show in the catalog, sorted by name
    pub fn list_shows(&self) -> StoreResult<Vec<ShowSummary>> {
        let mut shows = Vec::new();
        for show_id in self.store.smembers(keys::CATALOG_SERIES)? {
            if let Some(show) = self.summary(&show_id)? {
                shows.push(show);
            }
        }
        shows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(shows)
    }

    /// Details of one show, or `None` if it was never ingested
    pub fn show_meta(&self, show_id: &str) -> StoreResult<Option<ShowMeta>> {
        let Some(show) = self.summary(show_id)? else {
            return Ok(None);
        };

        let prefix = keys::season_prefix(show_id);
        let mut episodes: BTreeSet<(u32, u32)> = BTreeSet::new();

        for season_key in self.store.keys_with_prefix(&prefix)? {
            let Ok(season) = season_key[prefix.len()..].parse::<u32>() else {
                continue;
            };
            for (member, _) in self.store.zrange(&season_key)? {
                let episode = member.split(':').next().and_then(|ep| ep.parse::<u32>().ok());
                if let Some(episode) = episode {
                    episodes.insert((season, episode));
                }
            }
        }

        let videos = episodes
            .into_iter()
            .map(|(season, episode)| Video {
                id: format!("{}:{}:{}", show_id, season, episode),
                title: format!("Episode {}", episode),
                season,
                episode,
            })
            .collect();

        Ok(Some(ShowMeta {
            id: show.id,
            name: show.name,
            languages: self.store.smembers(&keys::show_langs_key(show_id))?,
            videos,
        }))
    }

    /// The stream of one episode, or `None` if nothing was stored for it
    pub fn episode_stream(
        &self,
        show_id: &str,
        season: u32,
        episode: u32,
    ) -> StoreResult<Option<StreamEntry>> {
        let fields = self
            .store
            .hgetall(&keys::episode_key(show_id, season, episode))?;
        let Some(magnet) = fields.get("magnet") else {
            return Ok(None);
        };

        let field = |name: &str| fields.get(name).map(String::as_str).unwrap_or("");
        let trackers = self.store.lrange(keys::TRACKERS_LATEST)?;

        Ok(Some(StreamEntry {
            name: format!("{} {}", STREAM_NAME_PREFIX, field("resolution")),
            title: format!(
                "S{:02}E{:02} - {}\n{} {}",
                season,
                episode,
                field("resolution"),
                field("languages"),
                field("size")
            ),
            url: append_trackers(magnet, &trackers),
        }))
    }

    /// Fuzzy search over show titles, best match first
    pub fn search(&self, query: &str) -> StoreResult<Vec<SearchMatch>> {
        let normalized_query = normalize_title(query);
        if normalized_query.is_empty() {
            return Ok(Vec::new());
        }

        let mut scored = Vec::new();
        for show_id in self.store.smembers(keys::CATALOG_SERIES)? {
            let normalized = normalize_title(&title_from_show_id(&show_id));
            let score = similarity(&normalized_query, &normalized);
            if score >= self.similarity_threshold {
                scored.push((show_id, score));
            }
        }

        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        let mut matches = Vec::with_capacity(scored.len());
        for (show_id, score) in scored {
            if let Some(show) = self.summary(&show_id)? {
                matches.push(SearchMatch { show, score });
            }
        }
        Ok(matches)
    }
}
