use crate::core::geohash;
use crate::domain::model::{Coordinate, Restaurant};
use crate::domain::ports::CacheStore;
use crate::utils::error::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::timeout;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub enabled: bool,
    pub ttl_seconds: u64,
    pub precision: usize,
    pub timeout_ms: u64,
    pub require_cache_for_proximity: bool,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_seconds: 3600,
            precision: geohash::DEFAULT_PRECISION,
            timeout_ms: 250,
            require_cache_for_proximity: false,
        }
    }
}

impl CacheSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

pub fn serialize_restaurants(restaurants: &[Restaurant]) -> Result<String> {
    Ok(serde_json::to_string(restaurants)?)
}

pub fn deserialize_restaurants(payload: &str) -> Result<Vec<Restaurant>> {
    Ok(serde_json::from_str(payload)?)
}

/// Cache-aside access to nearby results. Nothing here returns an error to
/// the caller: unreachable caches, timeouts and undecodable payloads all
/// read as a miss, and failed writes are only logged.
pub struct CacheAside<C: CacheStore> {
    cache: C,
    settings: CacheSettings,
}

impl<C: CacheStore> CacheAside<C> {
    pub fn new(cache: C, settings: CacheSettings) -> Self {
        Self { cache, settings }
    }

    pub fn settings(&self) -> &CacheSettings {
        &self.settings
    }

    pub fn store(&self) -> &C {
        &self.cache
    }

    pub fn key_for(&self, location: &Coordinate) -> Result<String> {
        geohash::encode(location, self.settings.precision)
    }

    /// One reachability probe per query, bounded by the cache timeout.
    pub async fn is_available(&self) -> bool {
        if !self.settings.enabled {
            return false;
        }
        match timeout(self.settings.timeout(), self.cache.is_reachable()).await {
            Ok(reachable) => {
                if !reachable {
                    tracing::warn!("Cache unreachable, answering from the store");
                }
                reachable
            }
            Err(_) => {
                tracing::warn!(
                    "Cache reachability probe timed out after {}ms",
                    self.settings.timeout_ms
                );
                false
            }
        }
    }

    pub async fn get(&self, key: &str) -> Option<Vec<Restaurant>> {
        let payload = match timeout(self.settings.timeout(), self.cache.get(key)).await {
            Ok(Ok(Some(payload))) => payload,
            Ok(Ok(None)) => {
                tracing::debug!("Cache MISS for key: {}", key);
                return None;
            }
            Ok(Err(e)) => {
                tracing::warn!("Cache read failed for key {}: {}", key, e);
                return None;
            }
            Err(_) => {
                tracing::warn!("Cache read timed out for key: {}", key);
                return None;
            }
        };

        match deserialize_restaurants(&payload) {
            Ok(restaurants) => {
                tracing::debug!(
                    "Cache HIT for key: {} ({} restaurants)",
                    key,
                    restaurants.len()
                );
                Some(restaurants)
            }
            Err(e) => {
                tracing::warn!("Discarding undecodable cache entry {}: {}", key, e);
                None
            }
        }
    }

    /// Replaces the whole entry. Failures are logged and dropped.
    pub async fn set(&self, key: &str, restaurants: &[Restaurant]) {
        let payload = match serialize_restaurants(restaurants) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!("Could not encode cache entry {}: {}", key, e);
                return;
            }
        };

        let write = self
            .cache
            .set_with_expiry(key, self.settings.ttl_seconds, payload);
        match timeout(self.settings.timeout(), write).await {
            Ok(Ok(())) => tracing::debug!(
                "Cache SET for key: {} (TTL: {}s)",
                key,
                self.settings.ttl_seconds
            ),
            Ok(Err(e)) => tracing::warn!("Cache write failed for key {}: {}", key, e),
            Err(_) => tracing::warn!("Cache write timed out for key: {}", key),
        }
    }
}
