//! TMDB API client.

use crate::models::media::{CatalogMatch, MediaKind};
use crate::services::provider::{language_name, status_error, CatalogQuery, MetadataProvider};
use crate::{Error, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use tokio::sync::OnceCell;

const TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";

/// TMDB client configuration.
#[derive(Debug, Clone)]
pub struct TmdbConfig {
    /// API key or Bearer token (JWT)
    pub api_key: String,
    pub language: String,
    /// Whether to use Bearer token authentication (API v4 style)
    pub use_bearer: bool,
}

impl TmdbConfig {
    /// Create config from a key, detecting the auth style.
    pub fn new(api_key: impl Into<String>, language: impl Into<String>) -> Self {
        let api_key = api_key.into();
        // Bearer tokens start with "eyJ" (base64 encoded JWT header)
        let use_bearer = api_key.starts_with("eyJ");
        Self {
            api_key,
            language: language.into(),
            use_bearer,
        }
    }
}

/// TMDB API client.
pub struct TmdbClient {
    config: TmdbConfig,
    client: reqwest::Client,
    genres: OnceCell<HashMap<u64, String>>,
}

/// Multi search result.
#[derive(Debug, Deserialize)]
pub struct MultiSearchResult {
    pub results: Vec<MultiSearchItem>,
}

/// Multi search item (movie, tv or person).
#[derive(Debug, Deserialize)]
pub struct MultiSearchItem {
    pub id: u64,
    pub media_type: String,
    /// Movie title.
    pub title: Option<String>,
    /// TV show name.
    pub name: Option<String>,
    pub release_date: Option<String>,
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<u64>,
    pub original_language: Option<String>,
}

impl MultiSearchItem {
    fn year(&self) -> Option<u16> {
        self.release_date
            .as_deref()
            .or(self.first_air_date.as_deref())
            .and_then(|d| d.get(..4))
            .and_then(|y| y.parse().ok())
    }

    fn display_title(&self) -> Option<&str> {
        self.title.as_deref().or(self.name.as_deref())
    }
}

/// Genre list.
#[derive(Debug, Deserialize)]
pub struct GenreList {
    pub genres: Vec<Genre>,
}

/// Genre.
#[derive(Debug, Deserialize)]
pub struct Genre {
    pub id: u64,
    pub name: String,
}

impl TmdbClient {
    /// Create a new TMDB client.
    pub fn new(config: TmdbConfig) -> Self {
        let client = reqwest::Client::new();
        Self {
            config,
            client,
            genres: OnceCell::new(),
        }
    }

    /// Build a request with proper authentication.
    fn build_request(&self, url: &str) -> reqwest::RequestBuilder {
        let request = self.client.get(url);
        if self.config.use_bearer {
            request.header("Authorization", format!("Bearer {}", self.config.api_key))
        } else {
            request
        }
    }

    /// Build URL with optional api_key parameter (only for v3 style).
    fn build_url(&self, path: &str, extra_params: &str) -> String {
        if self.config.use_bearer {
            format!(
                "{}/{}?language={}{}",
                TMDB_BASE_URL, path, self.config.language, extra_params
            )
        } else {
            format!(
                "{}/{}?api_key={}&language={}{}",
                TMDB_BASE_URL, path, self.config.api_key, self.config.language, extra_params
            )
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let resp = self.build_request(url).send().await?;
        if !resp.status().is_success() {
            return Err(status_error("tmdb", resp.status()));
        }
        Ok(resp.json().await?)
    }

    /// Search movies and TV shows at once.
    pub async fn search_multi(&self, query: &str) -> Result<Vec<MultiSearchItem>> {
        let url = self.build_url(
            "search/multi",
            &format!("&query={}", urlencoding::encode(query)),
        );
        let resp: MultiSearchResult = self.get_json(&url).await?;
        Ok(resp.results)
    }

    /// Movie and TV genre names by ID, fetched once per client.
    pub async fn genre_names(&self) -> Result<&HashMap<u64, String>> {
        self.genres
            .get_or_try_init(|| async {
                let movie: GenreList = self.get_json(&self.build_url("genre/movie/list", "")).await?;
                let tv: GenreList = self.get_json(&self.build_url("genre/tv/list", "")).await?;
                Ok::<_, Error>(
                    movie
                        .genres
                        .into_iter()
                        .chain(tv.genres)
                        .map(|g| (g.id, g.name))
                        .collect(),
                )
            })
            .await
    }
}

/// Pick the first movie/tv result, preferring one released in `year`.
fn select_best_match(items: &[MultiSearchItem], year: Option<u16>) -> Option<&MultiSearchItem> {
    let mut candidates = items
        .iter()
        .filter(|i| i.media_type == "movie" || i.media_type == "tv");
    match year {
        Some(y) => {
            let all: Vec<_> = candidates.collect();
            all.iter()
                .find(|i| i.year() == Some(y))
                .or_else(|| all.first())
                .copied()
        }
        None => candidates.next(),
    }
}

#[async_trait]
impl MetadataProvider for TmdbClient {
    fn name(&self) -> &str {
        "tmdb"
    }

    async fn search(&self, query: &CatalogQuery) -> Result<Option<CatalogMatch>> {
        tracing::info!("Searching TMDB for {}", query);
        let results = self.search_multi(&query.title).await?;
        let Some(item) = select_best_match(&results, query.year) else {
            return Ok(None);
        };
        tracing::debug!("TMDB match for {}: id {}", query, item.id);

        let genres = match self.genre_names().await {
            Ok(names) => item
                .genre_ids
                .iter()
                .filter_map(|id| names.get(id).cloned())
                .collect(),
            Err(e) => {
                tracing::debug!("TMDB genre list unavailable: {}", e);
                Vec::new()
            }
        };

        Ok(Some(CatalogMatch {
            title: item.display_title().map(str::to_string),
            year: item.year(),
            kind: Some(if item.media_type == "movie" {
                MediaKind::Movie
            } else {
                MediaKind::Series
            }),
            genres,
            languages: item
                .original_language
                .as_deref()
                .map(language_name)
                .into_iter()
                .collect(),
        }))
    }
}
