//! Release-title parsing
//!
//! Free-text thread titles are parsed in two stages:
//! - A heuristic parser that recognizes the usual episode markers and
//!   quality tags
//! - A regex fallback for bracketed forum titles, only consulted when the
//!   heuristic result lacks a season or an episode
//!
//! The two results are reconciled by [`merge`] and then converted into a
//! [`StructuredRelease`], which only exists when the title, season and
//! episode are all known.

mod fallback;
mod heuristic;
mod language;
mod merge;

pub use language::{language_code, LANG_MAP};
pub use merge::{merge, MergePolicy, Precedence};

use std::ops::RangeInclusive;
use thiserror::Error;
use tracing::warn;

/// Output of either parsing stage; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedRelease {
    pub title: Option<String>,
    pub year: Option<u32>,
    pub season: Option<u32>,
    pub episode_start: Option<u32>,
    pub episode_end: Option<u32>,
    pub resolution: Option<String>,
    pub video_codec: Option<String>,
    pub audio_codec: Option<String>,
    pub source: Option<String>,
    pub size: Option<String>,
    /// Two-letter codes in order of appearance
    pub languages: Vec<String>,
}

impl ParsedRelease {
    /// Returns true if both the season and the first episode are known
    pub fn has_episode_marker(&self) -> bool {
        self.season.is_some() && self.episode_start.is_some()
    }
}

/// Reasons a parse result cannot become a [`StructuredRelease`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ReleaseError {
    #[error("title is missing")]
    MissingTitle,

    #[error("season is missing")]
    MissingSeason,

    #[error("episode is missing")]
    MissingEpisode,
}

/// A parsed release with the fields the catalog requires
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredRelease {
    pub title: String,
    pub year: Option<u32>,
    pub season: u32,
    pub episode_start: u32,
    /// Never below `episode_start`
    pub episode_end: u32,
    pub resolution: Option<String>,
    pub video_codec: Option<String>,
    pub audio_codec: Option<String>,
    pub source: Option<String>,
    pub size: Option<String>,
    pub languages: Vec<String>,
}

impl StructuredRelease {
    /// Every episode number the release covers
    pub fn episodes(&self) -> RangeInclusive<u32> {
        self.episode_start..=self.episode_end
    }

    /// Display name of the show: `Title (Year)` or just `Title`
    pub fn show_name(&self) -> String {
        match self.year {
            Some(year) => format!("{} ({})", self.title, year),
            None => self.title.clone(),
        }
    }
}

impl TryFrom<ParsedRelease> for StructuredRelease {
    type Error = ReleaseError;

    fn try_from(parsed: ParsedRelease) -> Result<Self, Self::Error> {
        let title = parsed
            .title
            .filter(|t| !t.trim().is_empty())
            .ok_or(ReleaseError::MissingTitle)?;
        let season = parsed.season.ok_or(ReleaseError::MissingSeason)?;
        let episode_start = parsed.episode_start.ok_or(ReleaseError::MissingEpisode)?;
        let episode_end = parsed
            .episode_end
            .filter(|end| *end >= episode_start)
            .unwrap_or(episode_start);

        Ok(Self {
            title,
            year: parsed.year,
            season,
            episode_start,
            episode_end,
            resolution: parsed.resolution,
            video_codec: parsed.video_codec,
            audio_codec: parsed.audio_codec,
            source: parsed.source,
            size: parsed.size,
            languages: parsed.languages,
        })
    }
}

/// Runs both stages on a title without validating the result
pub fn parse_fields(title: &str) -> ParsedRelease {
    let primary = heuristic::parse(title);
    if primary.has_episode_marker() {
        return primary;
    }

    match fallback::parse(title) {
        Some(fallback) => merge(primary, fallback, &MergePolicy::STANDARD),
        None => primary,
    }
}

/// Parses a free-text release title
///
/// Returns `None` unless the title, season and episode could all be
/// recovered.
///
/// # Example
///
/// ```
/// use tb_harvest::release::parse_title;
///
/// let release = parse_title("Kitchen Wars (2023) S01E01-03 [1080p - Tamil + Telugu]").unwrap();
/// assert_eq!(release.show_name(), "Kitchen Wars (2023)");
/// assert_eq!(release.episodes(), 1..=3);
/// ```
pub fn parse_title(title: &str) -> Option<StructuredRelease> {
    match StructuredRelease::try_from(parse_fields(title)) {
        Ok(release) => Some(release),
        Err(e) => {
            warn!("Failed to parse required fields from title '{}': {}", title, e);
            None
        }
    }
}
