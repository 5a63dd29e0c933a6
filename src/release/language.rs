//! Language token normalization

/// Three-letter tokens seen in release titles and their two-letter codes
pub const LANG_MAP: &[(&str, &str)] = &[
    ("tam", "ta"),
    ("tel", "te"),
    ("hin", "hi"),
    ("eng", "en"),
    ("mal", "ml"),
    ("kan", "kn"),
    ("kor", "ko"),
    ("jap", "ja"),
    ("chi", "zh"),
];

fn lookup(token: &str) -> Option<&'static str> {
    LANG_MAP
        .iter()
        .find(|(short, _)| *short == token)
        .map(|(_, code)| *code)
}

/// Maps a language token to its two-letter code
///
/// The whole token is tried first, then its three-letter prefix, so both
/// `tam` and `Tamil` map to `ta`. Anything unknown is returned lowercased
/// but otherwise unchanged.
pub fn language_code(token: &str) -> String {
    let token = token.trim().to_lowercase();

    if let Some(code) = lookup(&token) {
        return code.to_string();
    }

    let prefix: String = token.chars().take(3).collect();
    match lookup(&prefix) {
        Some(code) => code.to_string(),
        None => token,
    }
}

/// Splits a `Tamil + Telugu` style list and maps every entry
pub fn split_language_list(list: &str) -> Vec<String> {
    list.split('+')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(language_code)
        .collect()
}
