//! Metadata provider interface.

use crate::models::media::CatalogMatch;
use crate::{Error, Result};
use async_trait::async_trait;

/// HTTP statuses catalog services use for throttling.
pub const RATE_LIMIT_STATUSES: [u16; 3] = [429, 503, 403];

/// A title lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CatalogQuery {
    pub title: String,
    pub year: Option<u16>,
}

impl CatalogQuery {
    pub fn new(title: impl Into<String>, year: Option<u16>) -> Self {
        Self {
            title: title.into(),
            year,
        }
    }

    /// Cache key: `"{title} {year}"` or `"{title}"`.
    pub fn key(&self) -> String {
        match self.year {
            Some(year) => format!("{} {}", self.title, year),
            None => self.title.clone(),
        }
    }
}

impl std::fmt::Display for CatalogQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// External catalog that maps a free-text title to canonical data.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Look up a title. `Ok(None)` means the catalog has no match;
    /// throttling is reported as [`Error::RateLimited`].
    async fn search(&self, query: &CatalogQuery) -> Result<Option<CatalogMatch>>;
}

/// Turn a non-success HTTP status into the matching error.
pub fn status_error(provider: &str, status: reqwest::StatusCode) -> Error {
    let code = status.as_u16();
    if RATE_LIMIT_STATUSES.contains(&code) {
        Error::RateLimited(code)
    } else {
        Error::Provider(format!("{} returned HTTP {}", provider, code))
    }
}

/// Map an ISO 639-1 code to the language name used for directory matching.
pub fn language_name(code: &str) -> String {
    match code.to_lowercase().as_str() {
        "en" => "english".to_string(),
        "fr" => "french".to_string(),
        "es" => "spanish".to_string(),
        "de" => "german".to_string(),
        "it" => "italian".to_string(),
        "pt" => "portuguese".to_string(),
        "nl" => "dutch".to_string(),
        "sv" => "swedish".to_string(),
        "no" | "nb" => "norwegian".to_string(),
        "da" => "danish".to_string(),
        "fi" => "finnish".to_string(),
        "pl" => "polish".to_string(),
        "ru" => "russian".to_string(),
        "uk" => "ukrainian".to_string(),
        "tr" => "turkish".to_string(),
        "ar" => "arabic".to_string(),
        "he" => "hebrew".to_string(),
        "hi" => "hindi".to_string(),
        "ta" => "tamil".to_string(),
        "te" => "telugu".to_string(),
        "th" => "thai".to_string(),
        "ja" => "japanese".to_string(),
        "ko" => "korean".to_string(),
        "zh" | "cn" => "chinese".to_string(),
        other => other.to_string(),
    }
}
