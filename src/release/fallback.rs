//! Regex fallback for bracketed forum titles
//!
//! Shape: `<title> [(<year>)] [S<n>] E[P]<n>[-[E[P]]<n>] ... [<res>p ... <languages> ...]`,
//! for example `The Great Indian Kitchen (2023) S01 E01-03 [1080p HEVC - x265 - 2.1GB - ESub - Tamil + Telugu]`.
//! Unlike the heuristic parser it tolerates whitespace between the season
//! and episode markers, and it reads the language list out of the trailing
//! quality block.

use crate::release::language::split_language_list;
use crate::release::ParsedRelease;
use once_cell::sync::Lazy;
use regex::Regex;

static FALLBACK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?ix)
        (?P<title>.+?)\s+
        (?:\((?P<year>\d{4})\)\s*)?
        (?:S(?P<season>\d{1,2})\s*)?
        EP?(?P<episode_start>\d{1,3})
        (?:-(?:EP?)?(?P<episode_end>\d{1,3}))?\b
        .*?
        \[(?P<resolution>\d{3,4}p)
        .*?
        \b(?P<languages>(?:tam|tel|hin|eng|mal|kan|kor|jap|chi)[a-z]*(?:\s*\+\s*[a-z]+)*)
        \s*.*?\]
        ",
    )
    .expect("static regex is valid")
});

/// Matches the fallback pattern, or returns `None` if the title does not fit it
pub fn parse(title: &str) -> Option<ParsedRelease> {
    let caps = FALLBACK.captures(title)?;
    let number = |name: &str| caps.name(name).and_then(|m| m.as_str().parse::<u32>().ok());

    let title_text = caps
        .name("title")
        .map(|m| m.as_str().trim().to_string())
        .filter(|t| !t.is_empty());

    Some(ParsedRelease {
        title: title_text,
        year: number("year"),
        season: number("season"),
        episode_start: number("episode_start"),
        episode_end: number("episode_end"),
        resolution: caps.name("resolution").map(|m| m.as_str().to_lowercase()),
        languages: caps
            .name("languages")
            .map(|m| split_language_list(m.as_str()))
            .unwrap_or_default(),
        ..ParsedRelease::default()
    })
}
