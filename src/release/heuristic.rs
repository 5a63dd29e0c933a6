//! Heuristic release-title parser
//!
//! Handles titles like:
//! - "Kitchen Wars (2023) S01E01-03 [1080p - Tamil + Telugu]"
//! - "Suzhal.The.Vortex.S01E04.720p.AMZN.WEB-DL.x264.DDP5.1"
//! - "Vadhandhi 1x05 480p HDRip"
//! - "Inspector Rishi Season 1 Episode 2 HEVC 2.1GB"
//!
//! Markers are tried from most to least specific. A title carrying only a
//! season marker (`S01`) yields a season without an episode.

use crate::release::language::language_code;
use crate::release::ParsedRelease;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::debug;

static SXXEXX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bS(\d{1,2})EP?(\d{1,3})(?:-(?:EP?)?(\d{1,3}))?\b").expect("static regex is valid")
});

static NXNN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(\d{1,2})x(\d{2,3})\b").expect("static regex is valid"));

static VERBOSE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bSeason\s*(\d{1,2})\W*Episodes?\s*(\d{1,3})(?:\s*-\s*(\d{1,3}))?")
        .expect("static regex is valid")
});

static SEASON_ONLY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:S|Season\s*)(\d{1,2})\b").expect("static regex is valid")
});

static PAREN_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\((19\d{2}|20\d{2})\)").expect("static regex is valid"));

static TRAILING_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*\(?(19\d{2}|20\d{2})\)?\s*$").expect("static regex is valid"));

static RESOLUTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(2160p|1440p|1080p|720p|576p|480p|360p|4K|UHD)\b")
        .expect("static regex is valid")
});

static SIZE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(\d+(?:\.\d+)?)\s?(GB|MB|TB)\b").expect("static regex is valid")
});

static LANGUAGE_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(tamil|telugu|hindi|english|malayalam|kannada|korean|japanese|chinese)\b")
        .expect("static regex is valid")
});

/// Three-letter tags used in quality blocks (`[480p - Tam + Tel]`)
static LANGUAGE_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(tam|tel|hin|eng|mal|kan|kor|jap|chi)\b").expect("static regex is valid")
});

static BRACKET_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[[^\]]*\]").expect("static regex is valid"));

static PLUS_LIST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b[a-z]+(?:\s*\+\s*[a-z]+)+\b").expect("static regex is valid")
});

static SPACES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("static regex is valid"));

/// Guesses every field it can from a free-text title
pub fn parse(title: &str) -> ParsedRelease {
    let mut result = ParsedRelease::default();

    let name_end = if let Some(caps) = SXXEXX.captures(title) {
        apply_episode_marker(&mut result, &caps);
        caps.get(0).map(|m| m.start())
    } else if let Some(caps) = NXNN.captures(title) {
        apply_episode_marker(&mut result, &caps);
        caps.get(0).map(|m| m.start())
    } else if let Some(caps) = VERBOSE.captures(title) {
        apply_episode_marker(&mut result, &caps);
        caps.get(0).map(|m| m.start())
    } else if let Some(caps) = SEASON_ONLY.captures(title) {
        result.season = capture_number(&caps, 1);
        caps.get(0).map(|m| m.start())
    } else {
        title.find('[')
    };

    let name_part = match name_end {
        Some(end) => &title[..end],
        None => title,
    };

    result.year = PAREN_YEAR
        .captures(title)
        .or_else(|| TRAILING_YEAR.captures(name_part))
        .and_then(|caps| capture_number(&caps, 1));

    let name = clean_show_name(name_part);
    if !name.is_empty() {
        result.title = Some(name);
    }

    result.resolution = parse_resolution(title);
    result.size = SIZE
        .captures(title)
        .map(|caps| format!("{}{}", &caps[1], caps[2].to_uppercase()));
    result.video_codec = parse_video_codec(title);
    result.audio_codec = parse_audio_codec(title);
    result.source = parse_source(title);
    result.languages = parse_languages(title);

    debug!(
        title = title,
        show = ?result.title,
        season = ?result.season,
        episode = ?result.episode_start,
        resolution = ?result.resolution,
        "Heuristic parse"
    );

    result
}

fn capture_number(caps: &Captures<'_>, index: usize) -> Option<u32> {
    caps.get(index).and_then(|m| m.as_str().parse().ok())
}

fn apply_episode_marker(result: &mut ParsedRelease, caps: &Captures<'_>) {
    result.season = capture_number(caps, 1);
    result.episode_start = capture_number(caps, 2);
    result.episode_end = capture_number(caps, 3);
}

/// Turns the text in front of the episode marker into a show name
fn clean_show_name(raw: &str) -> String {
    let spaced = raw.replace(['.', '_'], " ");
    let without_year = TRAILING_YEAR.replace(&spaced, "");
    let without_year = PAREN_YEAR.replace_all(&without_year, "");
    let collapsed = SPACES.replace_all(&without_year, " ");

    collapsed
        .trim()
        .trim_end_matches(|c: char| c == '-' || c == '|' || c == ':' || c.is_whitespace())
        .to_string()
}

fn parse_resolution(title: &str) -> Option<String> {
    let caps = RESOLUTION.captures(title)?;
    let res = caps[1].to_lowercase();
    Some(match res.as_str() {
        "4k" | "uhd" => "2160p".to_string(),
        _ => res,
    })
}

fn parse_video_codec(title: &str) -> Option<String> {
    let upper = title.to_uppercase();

    if upper.contains("X265") || upper.contains("H265") || upper.contains("H.265") || upper.contains("HEVC") {
        Some("HEVC".to_string())
    } else if upper.contains("X264") || upper.contains("H264") || upper.contains("H.264") || upper.contains("AVC") {
        Some("H.264".to_string())
    } else if upper.contains("AV1") {
        Some("AV1".to_string())
    } else if upper.contains("XVID") {
        Some("XviD".to_string())
    } else {
        None
    }
}

fn parse_audio_codec(title: &str) -> Option<String> {
    let upper = title.to_uppercase();

    if upper.contains("ATMOS") {
        Some("Atmos".to_string())
    } else if upper.contains("TRUEHD") {
        Some("TrueHD".to_string())
    } else if upper.contains("DTS-HD") || upper.contains("DTSHD") {
        Some("DTS-HD".to_string())
    } else if upper.contains("DTS") {
        Some("DTS".to_string())
    } else if upper.contains("DDP") || upper.contains("DD+") || upper.contains("EAC3") {
        Some("DD+".to_string())
    } else if upper.contains("DD5") || upper.contains("AC3") || upper.contains("DD2") {
        Some("DD".to_string())
    } else if upper.contains("AAC") {
        Some("AAC".to_string())
    } else {
        None
    }
}

fn parse_source(title: &str) -> Option<String> {
    let upper = title.to_uppercase();
    let has_word = |word: &str| {
        upper
            .split(|c: char| !c.is_ascii_alphanumeric() && c != '-')
            .any(|token| token == word)
    };

    if upper.contains("BLURAY") || upper.contains("BLU-RAY") || upper.contains("BDRIP") {
        Some("BluRay".to_string())
    } else if upper.contains("WEB-DL") || upper.contains("WEBDL") {
        Some("WEB-DL".to_string())
    } else if upper.contains("WEBRIP") || upper.contains("WEB-RIP") {
        Some("WEBRip".to_string())
    } else if upper.contains("HDRIP") {
        Some("HDRip".to_string())
    } else if upper.contains("HDTV") {
        Some("HDTV".to_string())
    } else if upper.contains("DVDRIP") {
        Some("DVDRip".to_string())
    } else if has_word("WEB") {
        Some("WEB".to_string())
    } else {
        None
    }
}

/// Collects languages in order of appearance, without repeats
///
/// Full names count anywhere in the title. Three-letter tags only count
/// inside a bracketed block or a `+`-joined list, where they cannot be
/// part of the show name.
fn parse_languages(title: &str) -> Vec<String> {
    let mut found: Vec<(usize, String)> = LANGUAGE_NAME
        .find_iter(title)
        .map(|m| (m.start(), language_code(m.as_str())))
        .collect();

    for block in BRACKET_BLOCK.find_iter(title).chain(PLUS_LIST.find_iter(title)) {
        for tag in LANGUAGE_TAG.find_iter(block.as_str()) {
            found.push((block.start() + tag.start(), language_code(tag.as_str())));
        }
    }
    found.sort_by_key(|(position, _)| *position);

    let mut codes: Vec<String> = Vec::new();
    for (_, code) in found {
        if !codes.contains(&code) {
            codes.push(code);
        }
    }
    codes
}
