//! External services.

pub mod cache;
pub mod omdb;
pub mod provider;
pub mod tmdb;

pub use cache::{JsonFileCache, MemoryCache, MetadataCache};
pub use omdb::OmdbClient;
pub use provider::{CatalogQuery, MetadataProvider};
pub use tmdb::{TmdbClient, TmdbConfig};
