//! Title normalization.
//!
//! Turns a raw title candidate into the canonical title used for grouping
//! and metadata lookups. Normalization is idempotent.

use crate::models::media::ParsedTokens;
use once_cell::sync::Lazy;
use regex::Regex;

static EMBEDDED_EPISODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bS(\d+)E(\d+)\b").unwrap());
static TRAILING_YEAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s(\[]*\b((?:19|20)\d{2})\b[)\]]?\s*$").unwrap());

/// Normalized title with the values captured along the way.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NormalizedTitle {
    pub title: String,
    pub year: Option<u16>,
    pub season: Option<u32>,
    pub episode: Option<u32>,
}

/// Normalize a raw title.
///
/// Values already present in `tokens` take precedence over values found in
/// the title itself. When `tokens` carries a year, a different trailing year
/// stays in the title.
pub fn normalize(raw_title: &str, tokens: &ParsedTokens) -> NormalizedTitle {
    let mut title = collapse(&raw_title.replace(['.', '_'], " "));
    let mut year = tokens.year;
    let mut season = tokens.season;
    let mut episode = tokens.episode;

    loop {
        if let Some((rest, s, e)) = split_embedded_episode(&title) {
            season = season.or(Some(s));
            episode = episode.or(Some(e));
            title = rest;
            continue;
        }
        if let Some((rest, y)) = strip_trailing_year(&title) {
            // With a release year known, any other year belongs to the name.
            if tokens.year.is_some_and(|known| known != y) {
                break;
            }
            // Keep the first promoted year: it was the last one in the title.
            if year.is_none() {
                year = Some(y);
            }
            title = rest;
            continue;
        }
        break;
    }

    NormalizedTitle {
        title,
        year,
        season,
        episode,
    }
}

/// Split `Title S01E02 Rest` at the episode marker.
///
/// The prefix becomes the title unless it is empty, then the suffix is used.
/// Returns `None` when there is no marker or both sides are empty.
fn split_embedded_episode(title: &str) -> Option<(String, u32, u32)> {
    let caps = EMBEDDED_EPISODE_RE.captures(title)?;
    let whole = caps.get(0)?;
    let season = caps[1].parse().ok()?;
    let episode = caps[2].parse().ok()?;

    let prefix = collapse(&title[..whole.start()]);
    let rest = if prefix.is_empty() {
        collapse(&title[whole.end()..])
    } else {
        prefix
    };

    if rest.is_empty() {
        return None;
    }
    Some((rest, season, episode))
}

/// Strip one trailing standalone year token, never leaving an empty title.
fn strip_trailing_year(title: &str) -> Option<(String, u16)> {
    let caps = TRAILING_YEAR_RE.captures(title)?;
    let whole = caps.get(0)?;
    let year = caps[1].parse().ok()?;

    let rest = collapse(&title[..whole.start()]);
    if rest.is_empty() {
        return None;
    }
    Some((rest, year))
}

/// Collapse whitespace and trim trailing separators.
fn collapse(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_end_matches(|c: char| c == '-' || c == '(' || c == '[' || c.is_whitespace())
        .trim()
        .to_string()
}
