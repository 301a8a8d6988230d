//! Media-related data models.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Language every record is assumed to carry until a catalog says otherwise.
pub const DEFAULT_LANGUAGE: &str = "english";

/// Kind of media a file was classified as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Series,
    #[default]
    Unsorted,
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaKind::Movie => write!(f, "movie"),
            MediaKind::Series => write!(f, "series"),
            MediaKind::Unsorted => write!(f, "unsorted"),
        }
    }
}

/// Resolution bucket recognised in a release name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resolution {
    #[serde(rename = "2160p")]
    P2160,
    #[serde(rename = "1080p")]
    P1080,
    #[serde(rename = "720p")]
    P720,
    #[serde(rename = "480p")]
    P480,
    #[serde(rename = "360p")]
    P360,
    #[serde(rename = "240p")]
    P240,
    #[serde(rename = "144p")]
    P144,
}

impl Resolution {
    /// Map the numeric part of a `NNNNp` tag to its bucket.
    pub fn from_lines(lines: u32) -> Option<Self> {
        match lines {
            2160 => Some(Resolution::P2160),
            1080 => Some(Resolution::P1080),
            720 => Some(Resolution::P720),
            480 => Some(Resolution::P480),
            360 => Some(Resolution::P360),
            240 => Some(Resolution::P240),
            144 => Some(Resolution::P144),
            _ => None,
        }
    }

    /// Sub-1080p buckets carry the ranking penalty.
    pub fn is_low_quality(&self) -> bool {
        matches!(
            self,
            Resolution::P720
                | Resolution::P480
                | Resolution::P360
                | Resolution::P240
                | Resolution::P144
        )
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Resolution::P2160 => "2160p",
            Resolution::P1080 => "1080p",
            Resolution::P720 => "720p",
            Resolution::P480 => "480p",
            Resolution::P360 => "360p",
            Resolution::P240 => "240p",
            Resolution::P144 => "144p",
        };
        write!(f, "{}", s)
    }
}

/// Release tokens extracted from a filename.
///
/// Every field is optional: malformed names are the norm, and an empty
/// token set is a valid parse result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedTokens {
    /// Title candidate (text before the first release token).
    pub title: Option<String>,
    pub year: Option<u16>,
    pub season: Option<u32>,
    pub episode: Option<u32>,
    pub resolution: Option<Resolution>,
    pub codec: Option<String>,
    pub release_group: Option<String>,
    pub container: Option<String>,
    /// Free-form source label (BluRay, WEB-DL, HDTV, ...).
    pub quality: Option<String>,
    pub hdr: bool,
    /// Dubbed, dual or multi audio.
    pub dubbed: bool,
    pub three_d: bool,
    /// Multi-part release (CD1, CD2, ...).
    pub multi_cd: bool,
    pub sport_event: bool,
    pub remux: bool,
}

impl ParsedTokens {
    /// Fill every field that is still unset from `other`.
    ///
    /// Fields already set are never overwritten, so rules merged earlier
    /// take precedence over rules merged later.
    pub fn merge_from(&mut self, other: ParsedTokens) {
        fn fill<T>(slot: &mut Option<T>, value: Option<T>) {
            if slot.is_none() {
                *slot = value;
            }
        }

        fill(&mut self.title, other.title);
        fill(&mut self.year, other.year);
        fill(&mut self.season, other.season);
        fill(&mut self.episode, other.episode);
        fill(&mut self.resolution, other.resolution);
        fill(&mut self.codec, other.codec);
        fill(&mut self.release_group, other.release_group);
        fill(&mut self.container, other.container);
        fill(&mut self.quality, other.quality);
        self.hdr |= other.hdr;
        self.dubbed |= other.dubbed;
        self.three_d |= other.three_d;
        self.multi_cd |= other.multi_cd;
        self.sport_event |= other.sport_event;
        self.remux |= other.remux;
    }

    /// Whether the structured parse produced a season/episode pair.
    pub fn has_episode(&self) -> bool {
        self.season.is_some() && self.episode.is_some()
    }
}

/// Quality attributes carried by a classified file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quality {
    pub resolution: Option<Resolution>,
    pub codec: Option<String>,
    pub release_group: Option<String>,
    pub container: Option<String>,
    pub label: Option<String>,
    pub hdr: bool,
    pub dubbed: bool,
    pub three_d: bool,
    pub multi_cd: bool,
    pub remux: bool,
}

impl From<&ParsedTokens> for Quality {
    fn from(tokens: &ParsedTokens) -> Self {
        Self {
            resolution: tokens.resolution,
            codec: tokens.codec.clone(),
            release_group: tokens.release_group.clone(),
            container: tokens.container.clone(),
            label: tokens.quality.clone(),
            hdr: tokens.hdr,
            dubbed: tokens.dubbed,
            three_d: tokens.three_d,
            multi_cd: tokens.multi_cd,
            remux: tokens.remux,
        }
    }
}

/// Canonical catalog data for a title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogMatch {
    pub title: Option<String>,
    pub year: Option<u16>,
    pub kind: Option<MediaKind>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub languages: Vec<String>,
}

/// One classified video file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationRecord {
    /// Canonical title, never empty.
    pub title: String,
    pub year: Option<u16>,
    pub kind: MediaKind,
    pub season: Option<u32>,
    pub episode: Option<u32>,
    pub genres: BTreeSet<String>,
    pub languages: BTreeSet<String>,
    pub quality: Quality,
    pub sport_event: bool,
    /// Preference score, higher is better. Derived from `quality` only.
    pub rank: i32,
    /// Where the file was found.
    pub source_path: PathBuf,
    /// Canonical `{media dir}/{title} ({year})` directory.
    pub destination_dir: Option<PathBuf>,
    /// Canonical location of the file itself.
    pub destination_path: Option<PathBuf>,
}

impl ClassificationRecord {
    /// Create a record with parser defaults and no destination yet.
    pub fn new(title: impl Into<String>, source_path: impl Into<PathBuf>) -> Self {
        Self {
            title: title.into(),
            year: None,
            kind: MediaKind::Unsorted,
            season: None,
            episode: None,
            genres: BTreeSet::new(),
            languages: BTreeSet::from([DEFAULT_LANGUAGE.to_string()]),
            quality: Quality::default(),
            sport_event: false,
            rank: 0,
            source_path: source_path.into(),
            destination_dir: None,
            destination_path: None,
        }
    }

    /// File name of the source path.
    pub fn filename(&self) -> String {
        self.source_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    /// Human readable label used in logs and plan output.
    pub fn display_title(&self) -> String {
        let mut label = match self.year {
            Some(year) => format!("{} ({})", self.title, year),
            None => self.title.clone(),
        };
        if let (Some(season), Some(episode)) = (self.season, self.episode) {
            label.push_str(&format!(" S{:02}E{:02}", season, episode));
        }
        label
    }
}

/// Video file information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoFile {
    /// Full path to the file.
    pub path: PathBuf,
    /// File name without path.
    pub filename: String,
    /// File size in bytes.
    pub size: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_never_overwrites() {
        let mut first = ParsedTokens {
            season: Some(1),
            hdr: true,
            ..Default::default()
        };
        first.merge_from(ParsedTokens {
            season: Some(9),
            episode: Some(4),
            remux: true,
            ..Default::default()
        });

        assert_eq!(first.season, Some(1));
        assert_eq!(first.episode, Some(4));
        assert!(first.hdr);
        assert!(first.remux);
    }

    #[test]
    fn test_low_quality_buckets() {
        assert!(!Resolution::P2160.is_low_quality());
        assert!(!Resolution::P1080.is_low_quality());
        assert!(Resolution::P720.is_low_quality());
        assert!(Resolution::P144.is_low_quality());
        assert_eq!(Resolution::from_lines(1080), Some(Resolution::P1080));
        assert_eq!(Resolution::from_lines(1081), None);
    }

    #[test]
    fn test_display_title() {
        let mut record = ClassificationRecord::new("Show", "/x/show.mkv");
        record.year = Some(2020);
        record.season = Some(1);
        record.episode = Some(2);
        assert_eq!(record.display_title(), "Show (2020) S01E02");
        assert!(record.languages.contains(DEFAULT_LANGUAGE));
    }
}
