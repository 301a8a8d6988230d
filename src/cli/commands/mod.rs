//! CLI command implementations.

pub mod classify;
pub mod clean;
pub mod dedupe;
pub mod execute;
pub mod sort;

use crate::core::classifier::Classifier;
use crate::core::executor::Executor;
use crate::core::resolver::MetadataResolver;
use crate::models::config::Config;
use crate::services::{JsonFileCache, MetadataProvider, OmdbClient, TmdbClient, TmdbConfig};
use crate::utils::fs::FsMover;
use crate::Result;
use std::sync::Arc;
use std::time::Duration;

/// Shared services for one command run.
pub struct App {
    pub config: Arc<Config>,
    pub classifier: Classifier,
    pub executor: Executor,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let config = Arc::new(config);
        let resolver = Arc::new(build_resolver(&config)?);
        let classifier = Classifier::new(config.clone(), resolver);
        let executor = Executor::new(Arc::new(FsMover::new(&config)), config.concurrency.io);
        Ok(Self {
            config,
            classifier,
            executor,
        })
    }
}

/// Resolver with OMDb first and TMDB second, backed by the JSON cache.
pub fn build_resolver(config: &Config) -> Result<MetadataResolver> {
    let mut providers: Vec<Arc<dyn MetadataProvider>> = Vec::new();
    if let Some(key) = config.omdb_api_key() {
        providers.push(Arc::new(OmdbClient::new(key)));
    }
    if let Some(key) = config.tmdb_api_key() {
        providers.push(Arc::new(TmdbClient::new(TmdbConfig::new(
            key,
            config.tmdb.language.clone(),
        ))));
    }
    if providers.is_empty() {
        tracing::warn!("No metadata API key configured; using filename data only");
    }

    let expire = config
        .cache
        .ttl_days
        .map(|days| Duration::from_secs(u64::from(days) * 24 * 60 * 60));
    let cache = JsonFileCache::open(&config.cache.path, expire)?;

    Ok(MetadataResolver::new(providers, Arc::new(cache)).with_expire(expire))
}
