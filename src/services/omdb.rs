//! OMDb (IMDb data) API client.

use crate::models::media::{CatalogMatch, MediaKind};
use crate::services::provider::{status_error, CatalogQuery, MetadataProvider};
use crate::Result;
use async_trait::async_trait;
use serde::Deserialize;

const OMDB_BASE_URL: &str = "https://www.omdbapi.com/";

/// OMDb API client.
pub struct OmdbClient {
    api_key: String,
    client: reqwest::Client,
}

/// Title lookup response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OmdbTitle {
    pub response: String,
    pub title: Option<String>,
    pub year: Option<String>,
    #[serde(rename = "Type")]
    pub kind: Option<String>,
    pub genre: Option<String>,
    pub language: Option<String>,
    pub error: Option<String>,
}

impl OmdbTitle {
    fn found(&self) -> bool {
        self.response.eq_ignore_ascii_case("true")
    }

    /// First four digits of the year field ("2011–2019" is a series run).
    fn first_year(&self) -> Option<u16> {
        let digits: String = self
            .year
            .as_deref()?
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        digits.get(..4)?.parse().ok()
    }

    fn into_match(self) -> CatalogMatch {
        let year = self.first_year();
        CatalogMatch {
            title: self.title,
            year,
            kind: self.kind.as_deref().map(|k| {
                if k.eq_ignore_ascii_case("movie") {
                    MediaKind::Movie
                } else {
                    MediaKind::Series
                }
            }),
            genres: split_list(self.genre.as_deref()),
            languages: split_list(self.language.as_deref())
                .into_iter()
                .map(|l| l.to_lowercase())
                .collect(),
        }
    }
}

/// Split a comma separated OMDb field, dropping "N/A".
fn split_list(field: Option<&str>) -> Vec<String> {
    field
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != "N/A")
        .map(str::to_string)
        .collect()
}

impl OmdbClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            client: reqwest::Client::new(),
        }
    }

    fn build_url(&self, query: &CatalogQuery) -> String {
        let mut url = format!(
            "{}?apikey={}&t={}",
            OMDB_BASE_URL,
            self.api_key,
            urlencoding::encode(&query.title)
        );
        if let Some(year) = query.year {
            url.push_str(&format!("&y={}", year));
        }
        url
    }
}

#[async_trait]
impl MetadataProvider for OmdbClient {
    fn name(&self) -> &str {
        "omdb"
    }

    async fn search(&self, query: &CatalogQuery) -> Result<Option<CatalogMatch>> {
        tracing::info!("Searching OMDb for {}", query);
        let resp = self.client.get(self.build_url(query)).send().await?;
        if !resp.status().is_success() {
            return Err(status_error("omdb", resp.status()));
        }

        let title: OmdbTitle = resp.json().await?;
        if !title.found() {
            tracing::debug!(
                "OMDb has no match for {}: {}",
                query,
                title.error.as_deref().unwrap_or("unknown")
            );
            return Ok(None);
        }
        Ok(Some(title.into_match()))
    }
}
