// Cache Store
//
// Versioned named caches of captured responses. The store itself is an
// injected interface so tests and the demo binary can run against the
// in-memory implementation while a runtime adapter can bridge to real
// cache storage.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::worker::error::{Result, WorkerError};
use crate::worker::types::{CacheName, CapturedResponse};

/// Abstract named-cache key-value store. Implementations provide atomic
/// per-key put/get; no cross-key transaction is ever assumed.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Store a response under `key` in the named cache, overwriting any
    /// previous entry for the same key.
    async fn put(&self, cache: &str, key: &str, response: CapturedResponse) -> Result<()>;

    /// Look up a response by key in the named cache.
    async fn get(&self, cache: &str, key: &str) -> Result<Option<CapturedResponse>>;

    /// Remove a single entry. Returns whether an entry existed.
    async fn delete(&self, cache: &str, key: &str) -> Result<bool>;

    /// Remove an entire named cache and all of its entries.
    async fn delete_cache(&self, cache: &str) -> Result<bool>;

    /// Names of all caches currently present.
    async fn cache_names(&self) -> Result<Vec<CacheName>>;
}

/// A versioned cache generation. Exactly one generation is current at any
/// time; any cache whose name differs from the current generation's name is
/// stale and gets evicted at activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheGeneration {
    prefix: String,
    version: String,
}

impl CacheGeneration {
    pub fn new(prefix: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            version: version.into(),
        }
    }

    /// Full cache name with the embedded version tag, e.g. `threefold-v1`
    pub fn name(&self) -> String {
        format!("{}-{}", self.prefix, self.version)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Whether an existing cache name belongs to a superseded generation
    pub fn is_stale(&self, cache_name: &str) -> bool {
        cache_name != self.name()
    }
}

/// In-memory cache store used by tests and the demo binary.
///
/// An optional per-cache entry capacity simulates storage quota: a put into
/// a full cache fails with `QuotaExceeded` unless it overwrites an existing
/// key.
pub struct MemoryCacheStore {
    caches: Arc<RwLock<HashMap<CacheName, HashMap<String, CapturedResponse>>>>,
    capacity: Option<usize>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self {
            caches: Arc::new(RwLock::new(HashMap::new())),
            capacity: None,
        }
    }

    /// Store that rejects puts beyond `capacity` entries per cache
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            caches: Arc::new(RwLock::new(HashMap::new())),
            capacity: Some(capacity),
        }
    }

    /// Number of entries in a named cache
    pub async fn entry_count(&self, cache: &str) -> usize {
        let caches = self.caches.read().await;
        caches.get(cache).map(|c| c.len()).unwrap_or(0)
    }
}

impl Default for MemoryCacheStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn put(&self, cache: &str, key: &str, response: CapturedResponse) -> Result<()> {
        let mut caches = self.caches.write().await;
        let entries = caches.entry(cache.to_string()).or_default();

        if let Some(capacity) = self.capacity {
            if entries.len() >= capacity && !entries.contains_key(key) {
                return Err(WorkerError::QuotaExceeded {
                    cache: cache.to_string(),
                });
            }
        }

        entries.insert(key.to_string(), response);
        Ok(())
    }

    async fn get(&self, cache: &str, key: &str) -> Result<Option<CapturedResponse>> {
        let caches = self.caches.read().await;
        Ok(caches.get(cache).and_then(|c| c.get(key)).cloned())
    }

    async fn delete(&self, cache: &str, key: &str) -> Result<bool> {
        let mut caches = self.caches.write().await;
        Ok(caches
            .get_mut(cache)
            .map(|c| c.remove(key).is_some())
            .unwrap_or(false))
    }

    async fn delete_cache(&self, cache: &str) -> Result<bool> {
        let mut caches = self.caches.write().await;
        Ok(caches.remove(cache).is_some())
    }

    async fn cache_names(&self) -> Result<Vec<CacheName>> {
        let caches = self.caches.read().await;
        let mut names: Vec<CacheName> = caches.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_name_embeds_version() {
        let generation = CacheGeneration::new("threefold", "v1");
        assert_eq!(generation.name(), "threefold-v1");
    }

    #[test]
    fn test_generation_staleness() {
        let generation = CacheGeneration::new("threefold", "v1");
        assert!(!generation.is_stale("threefold-v1"));
        assert!(generation.is_stale("threefold-v0"));
        assert!(generation.is_stale("other-cache"));
    }

    #[tokio::test]
    async fn test_put_then_get_round_trip() {
        let store = MemoryCacheStore::new();
        let response = CapturedResponse::ok(b"<html>".to_vec());

        store
            .put("threefold-v1", "GET https://cleave.app/", response.clone())
            .await
            .unwrap();

        let found = store
            .get("threefold-v1", "GET https://cleave.app/")
            .await
            .unwrap();
        assert_eq!(found, Some(response));
    }

    #[tokio::test]
    async fn test_put_overwrites_existing_key() {
        let store = MemoryCacheStore::new();
        let key = "GET https://cleave.app/";

        store
            .put("threefold-v1", key, CapturedResponse::ok(b"old".to_vec()))
            .await
            .unwrap();
        store
            .put("threefold-v1", key, CapturedResponse::ok(b"new".to_vec()))
            .await
            .unwrap();

        let found = store.get("threefold-v1", key).await.unwrap().unwrap();
        assert_eq!(found.body, b"new");
        assert_eq!(store.entry_count("threefold-v1").await, 1);
    }

    #[tokio::test]
    async fn test_get_missing_cache_is_none() {
        let store = MemoryCacheStore::new();
        let found = store.get("absent", "GET https://cleave.app/").await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_delete_cache_removes_all_entries() {
        let store = MemoryCacheStore::new();
        store
            .put("threefold-v0", "a", CapturedResponse::ok(b"1".to_vec()))
            .await
            .unwrap();
        store
            .put("threefold-v0", "b", CapturedResponse::ok(b"2".to_vec()))
            .await
            .unwrap();

        assert!(store.delete_cache("threefold-v0").await.unwrap());
        assert!(!store.delete_cache("threefold-v0").await.unwrap());
        assert!(store.get("threefold-v0", "a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cache_names_lists_all() {
        let store = MemoryCacheStore::new();
        store
            .put("threefold-v0", "a", CapturedResponse::ok(b"".to_vec()))
            .await
            .unwrap();
        store
            .put("threefold-v1", "a", CapturedResponse::ok(b"".to_vec()))
            .await
            .unwrap();

        let names = store.cache_names().await.unwrap();
        assert_eq!(names, vec!["threefold-v0".to_string(), "threefold-v1".to_string()]);
    }

    #[tokio::test]
    async fn test_capacity_rejects_new_keys_when_full() {
        let store = MemoryCacheStore::with_capacity(1);
        store
            .put("threefold-v1", "a", CapturedResponse::ok(b"1".to_vec()))
            .await
            .unwrap();

        let err = store
            .put("threefold-v1", "b", CapturedResponse::ok(b"2".to_vec()))
            .await
            .unwrap_err();
        assert!(matches!(err, WorkerError::QuotaExceeded { .. }));

        // Overwriting an existing key is still allowed
        store
            .put("threefold-v1", "a", CapturedResponse::ok(b"3".to_vec()))
            .await
            .unwrap();
    }
}
