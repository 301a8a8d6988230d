//! Metadata resolution.
//!
//! Cache first, then every provider in priority order until one has a match.
//! Failures never escape: the caller falls back to parser-only data.

use crate::models::media::CatalogMatch;
use crate::services::cache::MetadataCache;
use crate::services::provider::{CatalogQuery, MetadataProvider};
use std::sync::Arc;
use std::time::Duration;

/// Retries after the first attempt for throttled lookups.
pub const MAX_RETRIES: u32 = 5;

const DEFAULT_BACKOFF_STEP: Duration = Duration::from_secs(1);

/// Cache-backed lookup over an ordered list of providers.
pub struct MetadataResolver {
    providers: Vec<Arc<dyn MetadataProvider>>,
    cache: Arc<dyn MetadataCache>,
    backoff_step: Duration,
    expire: Option<Duration>,
}

impl MetadataResolver {
    pub fn new(providers: Vec<Arc<dyn MetadataProvider>>, cache: Arc<dyn MetadataCache>) -> Self {
        Self {
            providers,
            cache,
            backoff_step: DEFAULT_BACKOFF_STEP,
            expire: None,
        }
    }

    /// Wait `attempt × step` before retry number `attempt`.
    pub fn with_backoff_step(mut self, step: Duration) -> Self {
        self.backoff_step = step;
        self
    }

    /// Expiry handed to the cache for new entries.
    pub fn with_expire(mut self, expire: Option<Duration>) -> Self {
        self.expire = expire;
        self
    }

    /// Resolve a title to catalog data.
    pub async fn resolve(&self, title: &str, year: Option<u16>) -> Option<CatalogMatch> {
        let query = CatalogQuery::new(title, year);
        let key = query.key();

        if let Some(hit) = self.cache.get(&key) {
            tracing::debug!("Metadata cache hit for {}", key);
            return Some(hit);
        }

        for provider in &self.providers {
            if let Some(found) = self.search_with_retry(provider.as_ref(), &query).await {
                self.cache.set(&key, found.clone(), self.expire);
                return Some(found);
            }
        }

        tracing::debug!("No catalog match for {}", key);
        None
    }

    async fn search_with_retry(
        &self,
        provider: &dyn MetadataProvider,
        query: &CatalogQuery,
    ) -> Option<CatalogMatch> {
        let mut attempt = 0;
        loop {
            match provider.search(query).await {
                Ok(found) => return found,
                Err(e) if e.is_transient() && attempt < MAX_RETRIES => {
                    attempt += 1;
                    tracing::warn!(
                        "{} throttled on {} ({}), retry {}/{}",
                        provider.name(),
                        query,
                        e,
                        attempt,
                        MAX_RETRIES
                    );
                    tokio::time::sleep(self.backoff_step * attempt).await;
                }
                Err(e) => {
                    tracing::warn!("{} lookup failed for {}: {}", provider.name(), query, e);
                    return None;
                }
            }
        }
    }
}
