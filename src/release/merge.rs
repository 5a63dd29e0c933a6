//! Reconciles heuristic and fallback parse results

use crate::release::ParsedRelease;

/// Which parse result wins when both carry a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precedence {
    Primary,
    Fallback,
}

/// Field-precedence policy for [`merge`]
///
/// The winning side only needs to carry a value: an absent winner never
/// erases a value present on the other side. The episode range is treated
/// as one field so a start from one parse is never paired with an end from
/// the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergePolicy {
    pub languages: Precedence,
    pub other_fields: Precedence,
}

impl MergePolicy {
    /// Fallback languages override, everything else only fills gaps
    pub const STANDARD: MergePolicy = MergePolicy {
        languages: Precedence::Fallback,
        other_fields: Precedence::Primary,
    };
}

impl Default for MergePolicy {
    fn default() -> Self {
        Self::STANDARD
    }
}

fn pick<T>(primary: Option<T>, fallback: Option<T>, precedence: Precedence) -> Option<T> {
    match precedence {
        Precedence::Primary => primary.or(fallback),
        Precedence::Fallback => fallback.or(primary),
    }
}

/// Merges two parse results field by field
pub fn merge(primary: ParsedRelease, fallback: ParsedRelease, policy: &MergePolicy) -> ParsedRelease {
    let other = policy.other_fields;

    let primary_range = primary.episode_start.map(|start| (start, primary.episode_end));
    let fallback_range = fallback.episode_start.map(|start| (start, fallback.episode_end));
    let range = pick(primary_range, fallback_range, other);

    let primary_langs = Some(primary.languages).filter(|l| !l.is_empty());
    let fallback_langs = Some(fallback.languages).filter(|l| !l.is_empty());

    ParsedRelease {
        title: pick(primary.title, fallback.title, other),
        year: pick(primary.year, fallback.year, other),
        season: pick(primary.season, fallback.season, other),
        episode_start: range.map(|(start, _)| start),
        episode_end: range.and_then(|(_, end)| end),
        resolution: pick(primary.resolution, fallback.resolution, other),
        video_codec: pick(primary.video_codec, fallback.video_codec, other),
        audio_codec: pick(primary.audio_codec, fallback.audio_codec, other),
        source: pick(primary.source, fallback.source, other),
        size: pick(primary.size, fallback.size, other),
        languages: pick(primary_langs, fallback_langs, policy.languages).unwrap_or_default(),
    }
}
