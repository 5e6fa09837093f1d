use crate::domain::ports::CacheStore;
use crate::utils::error::{DiscoveryError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

#[derive(Clone, Debug)]
struct CacheEntry {
    value: String,
    expires_at: Instant,
}

impl CacheEntry {
    fn new(value: String, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Process-local stand-in for an external key-value cache. Clones share
/// the same entries.
#[derive(Clone, Debug)]
pub struct InMemoryCache {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
    reachable: Arc<AtomicBool>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            reachable: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Simulates the cache process going away and coming back.
    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    /// Drops expired entries; returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired());
        let removed = before - entries.len();
        if removed > 0 {
            tracing::debug!(
                "Cache cleanup: removed {} expired entries ({} remaining)",
                removed,
                entries.len()
            );
        }
        removed
    }

    fn check_reachable(&self) -> Result<()> {
        if !self.reachable.load(Ordering::SeqCst) {
            return Err(DiscoveryError::cache("in-memory cache is marked unreachable"));
        }
        Ok(())
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for InMemoryCache {
    async fn is_reachable(&self) -> bool {
        self.reachable.load(Ordering::SeqCst)
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.check_reachable()?;
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.value.clone()))
    }

    async fn set_with_expiry(&self, key: &str, ttl_seconds: u64, value: String) -> Result<()> {
        self.check_reachable()?;
        let mut entries = self.entries.write().await;
        entries.insert(
            key.to_string(),
            CacheEntry::new(value, Duration::from_secs(ttl_seconds)),
        );
        Ok(())
    }
}

/// A cache that is never there. Reads miss, writes vanish.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpCache;

#[async_trait]
impl CacheStore for NoOpCache {
    async fn is_reachable(&self) -> bool {
        false
    }

    async fn get(&self, _key: &str) -> Result<Option<String>> {
        Ok(None)
    }

    async fn set_with_expiry(&self, _key: &str, _ttl_seconds: u64, _value: String) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = InMemoryCache::new();
        cache
            .set_with_expiry("tdr1v9q", 60, "[]".to_string())
            .await
            .unwrap();
        assert_eq!(cache.get("tdr1v9q").await.unwrap().as_deref(), Some("[]"));
        assert_eq!(cache.get("tdr1v9r").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_write_replaces_entry() {
        let cache = InMemoryCache::new();
        cache.set_with_expiry("k", 60, "old".to_string()).await.unwrap();
        cache.set_with_expiry("k", 60, "new".to_string()).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("new"));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_zero_ttl_expires_immediately() {
        let cache = InMemoryCache::new();
        cache.set_with_expiry("k", 0, "gone".to_string()).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), None);
        assert_eq!(cache.purge_expired().await, 1);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_unreachable_cache_errors() {
        let cache = InMemoryCache::new();
        let shared = cache.clone();
        shared.set_reachable(false);

        assert!(!cache.is_reachable().await);
        assert!(cache.get("k").await.is_err());
        assert!(cache.set_with_expiry("k", 60, "v".to_string()).await.is_err());
    }

    #[test]
    fn test_noop_cache() {
        tokio_test::block_on(async {
            let cache = NoOpCache;
            assert!(!cache.is_reachable().await);
            cache.set_with_expiry("k", 60, "v".to_string()).await.unwrap();
            assert_eq!(cache.get("k").await.unwrap(), None);
        });
    }
}
