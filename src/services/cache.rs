//! Metadata cache.
//!
//! Resolved catalog matches are stored under their query key. The core only
//! ever sets and reads entries; expiry is the cache's own business.

use crate::models::media::CatalogMatch;
use crate::Result;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Key/value store for resolved metadata.
pub trait MetadataCache: Send + Sync {
    fn get(&self, key: &str) -> Option<CatalogMatch>;
    fn set(&self, key: &str, value: CatalogMatch, expire: Option<Duration>);
    fn delete(&self, key: &str);
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    value: CatalogMatch,
    #[serde(skip_serializing_if = "Option::is_none")]
    expires_at: Option<DateTime<Utc>>,
}

impl CacheEntry {
    fn new(value: CatalogMatch, expire: Option<Duration>) -> Self {
        let expires_at = expire
            .and_then(|d| chrono::Duration::from_std(d).ok())
            .map(|d| Utc::now() + d);
        Self { value, expires_at }
    }

    fn is_live(&self) -> bool {
        self.expires_at.map(|t| t > Utc::now()).unwrap_or(true)
    }
}

/// Process-local cache, used in tests and for one-off runs.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.entries.read().values().filter(|e| e.is_live()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MetadataCache for MemoryCache {
    fn get(&self, key: &str) -> Option<CatalogMatch> {
        self.entries
            .read()
            .get(key)
            .filter(|e| e.is_live())
            .map(|e| e.value.clone())
    }

    fn set(&self, key: &str, value: CatalogMatch, expire: Option<Duration>) {
        self.entries
            .write()
            .insert(key.to_string(), CacheEntry::new(value, expire));
    }

    fn delete(&self, key: &str) {
        self.entries.write().remove(key);
    }
}

/// Cache persisted as a JSON file, rewritten on every change.
#[derive(Debug)]
pub struct JsonFileCache {
    path: PathBuf,
    default_expire: Option<Duration>,
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl JsonFileCache {
    /// Open (or create) the cache file at `path`.
    ///
    /// A corrupt file is logged and replaced by an empty cache.
    pub fn open(path: &Path, default_expire: Option<Duration>) -> Result<Self> {
        let entries = if path.exists() {
            let content = fs::read_to_string(path)?;
            match serde_json::from_str::<HashMap<String, CacheEntry>>(&content) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!("Ignoring unreadable metadata cache {:?}: {}", path, e);
                    HashMap::new()
                }
            }
        } else {
            HashMap::new()
        };

        tracing::debug!("Opened metadata cache {:?} ({} entries)", path, entries.len());
        Ok(Self {
            path: path.to_path_buf(),
            default_expire,
            entries: RwLock::new(entries),
        })
    }

    fn persist(&self, entries: &HashMap<String, CacheEntry>) {
        let result = (|| -> Result<()> {
            if let Some(parent) = self.path.parent() {
                fs::create_dir_all(parent)?;
            }
            let json = serde_json::to_string_pretty(entries)?;
            let tmp = self.path.with_extension("json.tmp");
            fs::write(&tmp, json)?;
            fs::rename(&tmp, &self.path)?;
            Ok(())
        })();

        if let Err(e) = result {
            tracing::warn!("Failed to persist metadata cache {:?}: {}", self.path, e);
        }
    }
}

impl MetadataCache for JsonFileCache {
    fn get(&self, key: &str) -> Option<CatalogMatch> {
        self.entries
            .read()
            .get(key)
            .filter(|e| e.is_live())
            .map(|e| e.value.clone())
    }

    fn set(&self, key: &str, value: CatalogMatch, expire: Option<Duration>) {
        let mut entries = self.entries.write();
        entries.insert(
            key.to_string(),
            CacheEntry::new(value, expire.or(self.default_expire)),
        );
        self.persist(&entries);
    }

    fn delete(&self, key: &str) {
        let mut entries = self.entries.write();
        if entries.remove(key).is_some() {
            self.persist(&entries);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::media::MediaKind;

    fn sample() -> CatalogMatch {
        CatalogMatch {
            title: Some("Inception".to_string()),
            year: Some(2010),
            kind: Some(MediaKind::Movie),
            genres: vec!["Action".to_string()],
            languages: vec!["english".to_string()],
        }
    }

    #[test]
    fn test_memory_cache_set_get_delete() {
        let cache = MemoryCache::new();
        assert!(cache.get("Inception 2010").is_none());

        cache.set("Inception 2010", sample(), None);
        assert_eq!(cache.get("Inception 2010"), Some(sample()));

        cache.delete("Inception 2010");
        assert!(cache.is_empty());
    }

    #[test]
    fn test_expired_entries_are_misses() {
        let cache = MemoryCache::new();
        cache.set("k", sample(), Some(Duration::ZERO));
        assert!(cache.get("k").is_none());
    }

    #[test]
    fn test_json_cache_survives_reopen() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("metadata.json");

        let cache = JsonFileCache::open(&path, None).unwrap();
        cache.set("Inception 2010", sample(), None);
        drop(cache);

        let reopened = JsonFileCache::open(&path, None).unwrap();
        assert_eq!(reopened.get("Inception 2010"), Some(sample()));
    }

    #[test]
    fn test_json_cache_ignores_corrupt_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("metadata.json");
        fs::write(&path, "not json").unwrap();

        let cache = JsonFileCache::open(&path, None).unwrap();
        assert!(cache.get("anything").is_none());
    }
}
