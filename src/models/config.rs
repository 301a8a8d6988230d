//! Configuration model.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

const DEFAULT_HD_MEDIA_FILE_SIZE: u64 = 300_000_000;
const DEFAULT_MIN_FILE_SIZE: u64 = 50_000_000;

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Canonical library roots.
    pub media_dirs: MediaDirs,
    /// Language directories for movies, in priority order.
    #[serde(default)]
    pub language_dirs: Vec<LanguageDir>,
    /// Download directories that `sort` empties into the library.
    #[serde(default)]
    pub unsorted_media_dirs: Vec<PathBuf>,
    /// Soft-delete destination.
    pub deleted_media_dir: PathBuf,
    /// Files smaller than this are not considered real media.
    #[serde(default = "default_hd_media_file_size")]
    pub hd_media_file_size: u64,
    /// Top-level leftovers smaller than this are pruned.
    #[serde(default = "default_min_file_size")]
    pub min_file_size: u64,
    /// Log moves instead of performing them.
    #[serde(default)]
    pub dry_run: bool,
    /// Filename prefixes that mark sport events.
    #[serde(default = "default_sport_prefixes")]
    pub sport_prefixes: Vec<String>,
    #[serde(default)]
    pub tmdb: TmdbSettings,
    #[serde(default)]
    pub omdb: OmdbSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub concurrency: ConcurrencySettings,
    /// Cross-process lock file.
    #[serde(default = "default_lock_file")]
    pub lock_file: PathBuf,
}

/// Canonical library roots by kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaDirs {
    pub movies: PathBuf,
    pub series: PathBuf,
    pub documentaries: PathBuf,
    pub unsorted: PathBuf,
}

impl MediaDirs {
    /// All roots, in a fixed order.
    pub fn all(&self) -> [&Path; 4] {
        [
            &self.movies,
            &self.series,
            &self.documentaries,
            &self.unsorted,
        ]
    }
}

/// Movie directory for one original language.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LanguageDir {
    pub language: String,
    pub path: PathBuf,
}

/// TMDB settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbSettings {
    /// API key; falls back to `TMDB_API_KEY`.
    pub api_key: Option<String>,
    /// Language for responses.
    #[serde(default = "default_tmdb_language")]
    pub language: String,
}

/// OMDb (IMDb data) settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OmdbSettings {
    /// API key; falls back to `OMDB_API_KEY`.
    pub api_key: Option<String>,
}

/// Metadata cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_cache_path")]
    pub path: PathBuf,
    /// Expiry for new entries; `None` keeps them indefinitely.
    pub ttl_days: Option<u32>,
}

/// Worker widths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConcurrencySettings {
    #[serde(default = "default_classify_width")]
    pub classify: usize,
    #[serde(default = "default_io_width")]
    pub io: usize,
}

impl Default for TmdbSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            language: default_tmdb_language(),
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            path: default_cache_path(),
            ttl_days: None,
        }
    }
}

impl Default for ConcurrencySettings {
    fn default() -> Self {
        Self {
            classify: default_classify_width(),
            io: default_io_width(),
        }
    }
}

fn default_hd_media_file_size() -> u64 {
    DEFAULT_HD_MEDIA_FILE_SIZE
}

fn default_min_file_size() -> u64 {
    DEFAULT_MIN_FILE_SIZE
}

fn default_sport_prefixes() -> Vec<String> {
    vec!["ufc".to_string()]
}

fn default_tmdb_language() -> String {
    "en-US".to_string()
}

fn default_cache_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("media_housekeeper")
        .join("metadata.json")
}

fn default_classify_width() -> usize {
    5
}

fn default_io_width() -> usize {
    10
}

fn default_lock_file() -> PathBuf {
    std::env::temp_dir().join("housekeeper.lock")
}

impl Config {
    /// Build a configuration with the given library roots and defaults
    /// everywhere else.
    pub fn with_media_dirs(media_dirs: MediaDirs, deleted_media_dir: PathBuf) -> Self {
        Self {
            media_dirs,
            language_dirs: Vec::new(),
            unsorted_media_dirs: Vec::new(),
            deleted_media_dir,
            hd_media_file_size: DEFAULT_HD_MEDIA_FILE_SIZE,
            min_file_size: DEFAULT_MIN_FILE_SIZE,
            dry_run: false,
            sport_prefixes: default_sport_prefixes(),
            tmdb: TmdbSettings::default(),
            omdb: OmdbSettings::default(),
            cache: CacheSettings::default(),
            concurrency: ConcurrencySettings::default(),
            lock_file: default_lock_file(),
        }
    }

    /// Directories that are never valid move destinations themselves.
    pub fn protected_dirs(&self) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = self
            .media_dirs
            .all()
            .iter()
            .map(|p| p.to_path_buf())
            .collect();
        dirs.extend(self.language_dirs.iter().map(|l| l.path.clone()));
        dirs.push(self.deleted_media_dir.clone());
        dirs
    }

    /// Every library root (kind roots and language roots), deduplicated.
    pub fn library_roots(&self) -> Vec<PathBuf> {
        let mut roots: Vec<PathBuf> = Vec::new();
        let candidates = self
            .media_dirs
            .all()
            .into_iter()
            .map(Path::to_path_buf)
            .chain(self.language_dirs.iter().map(|l| l.path.clone()));
        for root in candidates {
            if !roots.contains(&root) {
                roots.push(root);
            }
        }
        roots
    }

    /// Library roots that hold sorted media (everything except unsorted
    /// download directories).
    pub fn final_media_dirs(&self) -> Vec<PathBuf> {
        self.library_roots()
            .into_iter()
            .filter(|d| !self.unsorted_media_dirs.contains(d))
            .collect()
    }

    /// First configured language directory whose language is one of
    /// `languages` (lower-case names). Config order is the priority order.
    pub fn language_dir(&self, languages: &BTreeSet<String>) -> Option<&Path> {
        self.language_dirs
            .iter()
            .find(|l| languages.contains(&l.language.to_lowercase()))
            .map(|l| l.path.as_path())
    }

    /// TMDB key from the config file or the environment.
    pub fn tmdb_api_key(&self) -> Option<String> {
        self.tmdb
            .api_key
            .clone()
            .or_else(|| std::env::var("TMDB_API_KEY").ok())
            .filter(|k| !k.trim().is_empty())
    }

    /// OMDb key from the config file or the environment.
    pub fn omdb_api_key(&self) -> Option<String> {
        self.omdb
            .api_key
            .clone()
            .or_else(|| std::env::var("OMDB_API_KEY").ok())
            .filter(|k| !k.trim().is_empty())
    }

    /// Check the configuration for values that would make a run unsafe.
    pub fn validate(&self) -> Result<()> {
        for (name, dir) in [
            ("movies", &self.media_dirs.movies),
            ("series", &self.media_dirs.series),
            ("documentaries", &self.media_dirs.documentaries),
            ("unsorted", &self.media_dirs.unsorted),
        ] {
            if dir.as_os_str().is_empty() {
                return Err(Error::Config(format!("media_dirs.{} is empty", name)));
            }
        }
        if self.deleted_media_dir.as_os_str().is_empty() {
            return Err(Error::Config("deleted_media_dir is empty".to_string()));
        }
        if self.library_roots().contains(&self.deleted_media_dir) {
            return Err(Error::Config(
                "deleted_media_dir must not be a library root".to_string(),
            ));
        }
        if self.concurrency.classify == 0 || self.concurrency.io == 0 {
            return Err(Error::Config(
                "concurrency widths must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Get the configuration directory path.
fn dirs_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("media_housekeeper")
}

/// Default configuration file location.
pub fn default_config_path() -> PathBuf {
    dirs_config_path().join("config.toml")
}

/// Parse a configuration from TOML text.
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

/// Load configuration from file.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let config_path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(default_config_path);

    if !config_path.exists() {
        return Err(Error::Config(format!(
            "config file not found: {}",
            config_path.display()
        )));
    }

    let content = std::fs::read_to_string(&config_path)?;
    let config = parse_config(&content)?;
    tracing::debug!("Loaded configuration from {:?}", config_path);
    Ok(config)
}
