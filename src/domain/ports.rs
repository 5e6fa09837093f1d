use crate::domain::model::{Item, Menu, Restaurant};
use crate::utils::error::Result;
use async_trait::async_trait;
use regex::Regex;

/// The system of record for restaurants, menus and items.
///
/// Every failure is reported as `DiscoveryError::StoreUnavailable`; the
/// discovery service never retries.
#[async_trait]
pub trait RestaurantStore: Send + Sync {
    async fn list_all_restaurants(&self) -> Result<Vec<Restaurant>>;

    async fn find_restaurants_by_name_exact(&self, name: &str) -> Result<Vec<Restaurant>>;

    async fn find_restaurants_by_name_fuzzy(&self, pattern: &Regex) -> Result<Vec<Restaurant>>;

    /// Restaurants where every pattern matches at least one attribute.
    async fn find_restaurants_matching_attribute_patterns(
        &self,
        patterns: &[Regex],
    ) -> Result<Vec<Restaurant>>;

    async fn find_items_by_name_exact(&self, name: &str) -> Result<Vec<Item>>;

    /// Items whose name matches any of the patterns.
    async fn find_items_by_name_fuzzy(&self, patterns: &[Regex]) -> Result<Vec<Item>>;

    /// Items where every pattern matches at least one attribute.
    async fn find_items_matching_attribute_patterns(&self, patterns: &[Regex])
        -> Result<Vec<Item>>;

    async fn find_menus_containing_any_item(&self, item_ids: &[String]) -> Result<Vec<Menu>>;

    async fn find_restaurants_by_id(&self, restaurant_ids: &[String]) -> Result<Vec<Restaurant>>;

    /// Persists a restaurant whose id has already been assigned.
    async fn create_restaurant(&self, restaurant: Restaurant) -> Result<Restaurant>;
}

/// An external key-value cache with per-entry expiry.
///
/// Implementations report their own failures as errors; the cache-aside
/// layer decides that none of them are fatal.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn is_reachable(&self) -> bool;

    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set_with_expiry(&self, key: &str, ttl_seconds: u64, value: String) -> Result<()>;
}

/// Hands out monotonically increasing ids per named sequence.
#[async_trait]
pub trait SequenceGenerator: Send + Sync {
    async fn next_id(&self, sequence_name: &str) -> Result<u64>;
}
