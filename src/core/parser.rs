//! Filename parser module.
//!
//! Extracts release tokens from raw video filenames:
//! - Title candidate and release year
//! - Season/episode numbers
//! - Resolution, codec, source label, container and release group
//! - HDR / 3D / dubbed / multi-disc / remux flags
//! - Sport events (e.g. `UFC.300.2160p.mkv`)
//!
//! Parsing is an ordered list of independent rules. Each rule is a pure
//! function from the filename to a partial token set; the results are merged
//! in order and a later rule never overwrites a field set by an earlier one.

use crate::models::media::{ParsedTokens, Resolution};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

/// A single extraction rule.
pub type Rule = fn(&str) -> ParsedTokens;

/// Rules in precedence order (sport events are handled separately because
/// their prefixes are configurable).
pub const RULES: &[(&str, Rule)] = &[
    ("season_episode", season_episode_rule),
    ("loose_season_episode", loose_season_episode_rule),
    ("year", year_rule),
    ("resolution", resolution_rule),
    ("codec", codec_rule),
    ("quality", quality_rule),
    ("container", container_rule),
    ("release_group", release_group_rule),
    ("flags", flags_rule),
    ("title", title_rule),
    ("title_year_fallback", title_year_fallback_rule),
];

/// Known video container extensions.
const CONTAINERS: &[&str] = &[
    "mkv", "mp4", "avi", "mov", "wmv", "mpg", "mp2", "mpeg", "mpe", "mpv", "m2v", "m4v", "ts",
    "m2ts", "webm", "flv",
];

static SEASON_EPISODE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:^|[^a-z0-9])s(\d{1,2})[ ._-]?e(\d{1,3})(?:[^0-9]|$)").unwrap()
});
static CROSS_EPISODE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:^|[^a-z0-9])(\d{1,2})x(\d{2,3})(?:[^0-9a-z]|$)").unwrap()
});
static LOOSE_SEASON_EPISODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)S(\d+)E(\d+)?").unwrap());
static FOUR_DIGITS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{4}").unwrap());
static RESOLUTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:^|[^a-z0-9])(2160|1080|720|480|360|240|144)[pi](?:[^a-z0-9]|$)").unwrap()
});
static UHD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:^|[^a-z0-9])(4k|uhd)(?:[^a-z0-9]|$)").unwrap());
static CODEC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:^|[^a-z0-9])(x\.?26[45]|h\.?26[45]|hevc|avc|xvid|divx|av1|vp9)(?:[^a-z0-9]|$)")
        .unwrap()
});
static QUALITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:^|[^a-z0-9])(blu-?ray|bdrip|brrip|web-?dl|web-?rip|hdtv|dvdrip|dvdscr|hdrip|hdcam|telesync)(?:[^a-z0-9]|$)",
    )
    .unwrap()
});
static RELEASE_GROUP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:\d{3,4}[pi]|x\.?26[45]|h\.?26[45]|hevc|xvid|avc|web-?dl|webrip|blu-?ray|hdtv|dvdrip|aac|ac3|dts|remux|hdr)[^-]*-([a-z0-9]+)$",
    )
    .unwrap()
});
static HDR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:^|[^a-z])(?:hdr|dovi|dolby[ ._-]?vision)(?:[^a-z]|$)").unwrap()
});
static DUBBED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:^|[^a-z])(?:dubbed|dual|multi)(?:[^a-z]|$)").unwrap());
static THREE_D_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:^|[^a-z])3d(?:[^a-z]|$)").unwrap());
static CD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)(?:^|[^a-z])cd\d+(?:[^\d]|$)").unwrap());
static REMUX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:^|[^a-z]|bd)remux(?:[^a-z]|$)").unwrap());
static SITE_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*(?:\[[^\]]*\]|www\.[^.]+\.[^.\s]+)[\s._-]*").unwrap());
static TITLE_YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(.+)\s+\(?(\d{4})\)?").unwrap());
static DOTTED_TITLE_YEAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([^.]+).*?\.(\d{4})\.").unwrap());
static EVENT_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"((?:19|20)\d{2})[ ._-](\d{2})[ ._-](\d{2})").unwrap());
static EVENT_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\s._-]*(\d{1,3})(?:\D|$)").unwrap());

/// Filename parser with configurable sport-event prefixes.
#[derive(Debug, Clone)]
pub struct FilenameParser {
    sport_prefixes: Vec<String>,
}

impl Default for FilenameParser {
    fn default() -> Self {
        Self::new(vec!["ufc".to_string()])
    }
}

impl FilenameParser {
    /// Create a parser recognising the given sport-event prefixes.
    pub fn new(sport_prefixes: Vec<String>) -> Self {
        Self {
            sport_prefixes: sport_prefixes
                .into_iter()
                .map(|p| p.trim().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    /// Parse a bare filename. Never fails; worst case is an empty token set.
    pub fn parse(&self, filename: &str) -> ParsedTokens {
        let mut tokens = self.sport_event(filename).unwrap_or_default();
        for (name, rule) in RULES {
            let partial = rule(filename);
            if partial != ParsedTokens::default() {
                tracing::trace!("Rule {} matched {}", name, filename);
            }
            tokens.merge_from(partial);
        }
        tokens
    }

    /// Parse the file name of `path`, also checking the directories it lives
    /// in for a sport-event prefix.
    pub fn parse_path(&self, path: &Path) -> ParsedTokens {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let mut tokens = self.parse(&filename);
        if tokens.sport_event {
            return tokens;
        }

        let from_dirs = path
            .parent()
            .into_iter()
            .flat_map(|p| p.components())
            .filter_map(|c| match c {
                std::path::Component::Normal(name) => Some(name.to_string_lossy().to_string()),
                _ => None,
            })
            .filter_map(|name| self.sport_event(&name))
            .last();

        if let Some(mut sport) = from_dirs {
            // The event identity wins over whatever the file name suggested.
            sport.merge_from(tokens);
            tokens = sport;
        }
        tokens
    }

    /// Detect an event-style name beginning with a known league prefix.
    fn sport_event(&self, name: &str) -> Option<ParsedTokens> {
        let lower = name.trim().to_lowercase();
        let prefix = self
            .sport_prefixes
            .iter()
            .find(|p| lower.starts_with(p.as_str()))?;

        let rest = &lower[prefix.len()..];
        let mut tokens = ParsedTokens {
            title: Some(prefix.to_uppercase()),
            season: Some(1),
            sport_event: true,
            ..Default::default()
        };

        let date = EVENT_DATE_RE.captures(rest);
        if let Some(caps) = &date {
            tokens.year = caps[1].parse().ok();
        }
        tokens.episode = EVENT_NUMBER_RE
            .captures(rest)
            .and_then(|c| c[1].parse::<u32>().ok())
            .or_else(|| {
                let caps = date.as_ref()?;
                format!("{}{}{}", &caps[1], &caps[2], &caps[3]).parse().ok()
            })
            .or(Some(1));
        Some(tokens)
    }
}

static DEFAULT_PARSER: Lazy<FilenameParser> = Lazy::new(FilenameParser::default);

/// Parse a filename with the default parser.
pub fn parse(filename: &str) -> ParsedTokens {
    DEFAULT_PARSER.parse(filename)
}

/// Remove a leading `[site]` tag or `www.site.tld` prefix.
pub fn strip_site_prefix(s: &str) -> &str {
    match SITE_PREFIX_RE.find(s) {
        Some(m) if m.end() < s.len() => &s[m.end()..],
        _ => s,
    }
}

/// Split a filename into stem and lowercased known container extension.
fn split_extension(filename: &str) -> (&str, Option<String>) {
    if let Some((stem, ext)) = filename.rsplit_once('.') {
        let ext_lower = ext.to_lowercase();
        if !stem.is_empty() && CONTAINERS.contains(&ext_lower.as_str()) {
            return (stem, Some(ext_lower));
        }
    }
    (filename, None)
}

/// Primary `S01E02` / `1x02` pattern with its start offset.
fn find_season_episode(s: &str) -> Option<(u32, u32, usize)> {
    let caps = SEASON_EPISODE_RE
        .captures(s)
        .or_else(|| CROSS_EPISODE_RE.captures(s))?;
    let start = caps.get(0)?.start();
    Some((caps[1].parse().ok()?, caps[2].parse().ok()?, start))
}

/// Last plausible year token (never a resolution) with its start offset.
fn find_year(s: &str) -> Option<(u16, usize)> {
    let bytes = s.as_bytes();
    FOUR_DIGITS_RE
        .find_iter(s)
        .filter(|m| {
            let before_ok = m.start() == 0 || !bytes[m.start() - 1].is_ascii_digit();
            let after = bytes.get(m.end()).map(|b| b.to_ascii_lowercase());
            let after_ok = match after {
                None => true,
                Some(b) => !b.is_ascii_digit() && b != b'p' && b != b'i',
            };
            before_ok && after_ok
        })
        .filter_map(|m| {
            let value: u32 = m.as_str().parse().ok()?;
            if Resolution::from_lines(value).is_some() || !(1900..=2099).contains(&value) {
                return None;
            }
            Some((value as u16, m.start()))
        })
        .last()
}

fn find_resolution(s: &str) -> Option<(Resolution, usize)> {
    if let Some(caps) = RESOLUTION_RE.captures(s) {
        let lines: u32 = caps[1].parse().ok()?;
        return Some((Resolution::from_lines(lines)?, caps.get(0)?.start()));
    }
    UHD_RE
        .find(s)
        .map(|m| (Resolution::P2160, m.start()))
}

fn find_codec(s: &str) -> Option<(String, usize)> {
    let caps = CODEC_RE.captures(s)?;
    let codec = caps[1].to_lowercase().replace('.', "");
    Some((codec, caps.get(0)?.start()))
}

fn find_quality(s: &str) -> Option<(String, usize)> {
    let caps = QUALITY_RE.captures(s)?;
    Some((caps[1].to_string(), caps.get(0)?.start()))
}

fn season_episode_rule(filename: &str) -> ParsedTokens {
    match find_season_episode(filename) {
        Some((season, episode, _)) => ParsedTokens {
            season: Some(season),
            episode: Some(episode),
            ..Default::default()
        },
        None => ParsedTokens::default(),
    }
}

/// Permissive fallback: `S(\d+)E(\d+)?` anywhere in the name.
fn loose_season_episode_rule(filename: &str) -> ParsedTokens {
    let Some(caps) = LOOSE_SEASON_EPISODE_RE.captures(filename) else {
        return ParsedTokens::default();
    };
    ParsedTokens {
        season: caps[1].parse().ok(),
        episode: caps.get(2).and_then(|m| m.as_str().parse().ok()),
        ..Default::default()
    }
}

fn year_rule(filename: &str) -> ParsedTokens {
    let (stem, _) = split_extension(filename);
    ParsedTokens {
        year: find_year(stem).map(|(y, _)| y),
        ..Default::default()
    }
}

fn resolution_rule(filename: &str) -> ParsedTokens {
    ParsedTokens {
        resolution: find_resolution(filename).map(|(r, _)| r),
        ..Default::default()
    }
}

fn codec_rule(filename: &str) -> ParsedTokens {
    ParsedTokens {
        codec: find_codec(filename).map(|(c, _)| c),
        ..Default::default()
    }
}

fn quality_rule(filename: &str) -> ParsedTokens {
    ParsedTokens {
        quality: find_quality(filename).map(|(q, _)| q),
        ..Default::default()
    }
}

fn container_rule(filename: &str) -> ParsedTokens {
    ParsedTokens {
        container: split_extension(filename).1,
        ..Default::default()
    }
}

fn release_group_rule(filename: &str) -> ParsedTokens {
    let (stem, _) = split_extension(filename);
    ParsedTokens {
        release_group: RELEASE_GROUP_RE
            .captures(stem)
            .map(|caps| caps[1].to_string()),
        ..Default::default()
    }
}

/// Independent boolean flags; they are not mutually exclusive.
fn flags_rule(filename: &str) -> ParsedTokens {
    ParsedTokens {
        hdr: HDR_RE.is_match(filename),
        dubbed: DUBBED_RE.is_match(filename),
        three_d: THREE_D_RE.is_match(filename),
        multi_cd: CD_RE.is_match(filename),
        remux: REMUX_RE.is_match(filename),
        ..Default::default()
    }
}

/// Title: the stem up to the first release token.
///
/// Yields nothing when no token bounds the title, so the looser fallback
/// (and eventually the directory name) gets a chance.
fn title_rule(filename: &str) -> ParsedTokens {
    let (stem, _) = split_extension(filename);
    let stem = strip_site_prefix(stem);

    let primary_se = find_season_episode(stem).map(|(_, _, at)| at);
    let loose_se = if primary_se.is_none() {
        LOOSE_SEASON_EPISODE_RE.find(stem).map(|m| m.start())
    } else {
        None
    };

    let cut = [
        primary_se,
        loose_se,
        find_year(stem).map(|(_, at)| at),
        find_resolution(stem).map(|(_, at)| at),
        find_codec(stem).map(|(_, at)| at),
        find_quality(stem).map(|(_, at)| at),
        HDR_RE.find(stem).map(|m| m.start()),
        REMUX_RE.find(stem).map(|m| m.start()),
        THREE_D_RE.find(stem).map(|m| m.start()),
        DUBBED_RE.find(stem).map(|m| m.start()),
        CD_RE.find(stem).map(|m| m.start()),
    ]
    .into_iter()
    .flatten()
    .filter(|&at| at > 0)
    .min();

    let Some(cut) = cut else {
        return ParsedTokens::default();
    };

    let title = clean_title(&stem[..cut]);
    ParsedTokens {
        title: (!title.is_empty()).then_some(title),
        ..Default::default()
    }
}

/// Looser `Title (2016)` / `Title.2016.` extraction.
fn title_year_fallback_rule(filename: &str) -> ParsedTokens {
    let caps = TITLE_YEAR_RE
        .captures(filename)
        .or_else(|| DOTTED_TITLE_YEAR_RE.captures(filename));
    let Some(caps) = caps else {
        return ParsedTokens::default();
    };

    let year = caps[2]
        .parse::<u32>()
        .ok()
        .filter(|y| (1900..=2099).contains(y) && Resolution::from_lines(*y).is_none());
    let Some(year) = year else {
        return ParsedTokens::default();
    };

    let title = clean_title(&caps[1]);
    ParsedTokens {
        title: (!title.is_empty()).then_some(title),
        year: Some(year as u16),
        ..Default::default()
    }
}

/// Separators to spaces, collapse whitespace, drop dangling brackets.
fn clean_title(raw: &str) -> String {
    let spaced: String = raw
        .chars()
        .map(|c| if c == '.' || c == '_' { ' ' } else { c })
        .collect();
    spaced
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_end_matches(|c: char| c == '(' || c == '[' || c == '-' || c.is_whitespace())
        .trim()
        .to_string()
}
