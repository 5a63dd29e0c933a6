//! Title normalization and show ids

use once_cell::sync::Lazy;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};

static SEASON_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(season|se)\b").expect("static regex is valid"));

static EPISODE_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(episode|ep)\b").expect("static regex is valid"));

static NON_ALNUM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9\s]").expect("static regex is valid"));

static STEMMER: Lazy<Stemmer> = Lazy::new(|| Stemmer::create(Algorithm::English));

/// Prefix shared by every show id
pub const SHOW_ID_PREFIX: &str = "tb:";

/// Normalizes a title for id derivation and matching
///
/// Lowercases, folds `season`/`se` to `s` and `episode`/`ep` to `e`, drops
/// everything outside `[a-z0-9\s]`, stems each word and collapses
/// whitespace.
pub fn normalize_title(title: &str) -> String {
    let lowered = title.to_lowercase();
    let folded = SEASON_WORD.replace_all(&lowered, "s");
    let folded = EPISODE_WORD.replace_all(&folded, "e");
    let stripped = NON_ALNUM.replace_all(&folded, "");

    stripped
        .split_whitespace()
        .map(|word| STEMMER.stem(word).into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Derives the stable show id for a title and optional year
///
/// # Example
///
/// ```
/// use tb_harvest::show_id_for;
///
/// assert_eq!(show_id_for("Kitchen Wars", Some(2023)), "tb:kitchen_war_2023");
/// ```
pub fn show_id_for(title: &str, year: Option<u32>) -> String {
    let source = match year {
        Some(year) => format!("{} {}", title, year),
        None => title.to_string(),
    };
    format!("{}{}", SHOW_ID_PREFIX, normalize_title(&source).replace(' ', "_"))
}

/// Recovers the searchable text of a show id (`tb:kitchen_war_2023` → `kitchen war 2023`)
pub fn title_from_show_id(show_id: &str) -> String {
    show_id
        .strip_prefix(SHOW_ID_PREFIX)
        .unwrap_or(show_id)
        .replace('_', " ")
}
