use crate::core::availability::is_open;
use crate::core::cache_aside::{CacheAside, CacheSettings};
use crate::core::geo::is_within_radius;
use crate::core::matcher::{Deduplicator, SearchLimits, TokenPatterns};
use crate::domain::model::{
    Coordinate, DiscoveryQuery, Item, Restaurant, SearchMode, SearchQuery,
};
use crate::domain::ports::{CacheStore, RestaurantStore, SequenceGenerator};
use crate::utils::error::{DiscoveryError, Result};
use crate::utils::validation::Validate;
use chrono::NaiveTime;
use std::collections::HashSet;

pub const RESTAURANT_SEQUENCE: &str = "restaurant_sequence";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscoverySettings {
    pub cache: CacheSettings,
    pub search: SearchLimits,
}

/// Finds open restaurants near a point, optionally filtered by search text.
///
/// Nearby queries without text go through the cache when it answers the
/// reachability probe; searches always read the store. Results keep the
/// order in which restaurants were first matched.
pub struct DiscoveryService<S, C, G>
where
    S: RestaurantStore,
    C: CacheStore,
    G: SequenceGenerator,
{
    store: S,
    cache: CacheAside<C>,
    sequence: G,
    limits: SearchLimits,
}

impl<S, C, G> DiscoveryService<S, C, G>
where
    S: RestaurantStore,
    C: CacheStore,
    G: SequenceGenerator,
{
    pub fn new(store: S, cache: C, sequence: G, settings: DiscoverySettings) -> Self {
        Self {
            store,
            cache: CacheAside::new(cache, settings.cache),
            sequence,
            limits: settings.search,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn cache(&self) -> &C {
        self.cache.store()
    }

    pub async fn discover(&self, query: &DiscoveryQuery) -> Result<Vec<Restaurant>> {
        query.validate()?;

        match &query.search {
            None => self.nearby(query).await,
            Some(SearchQuery { text, mode }) => {
                let patterns = TokenPatterns::parse(text, &self.limits)?;
                let modes: &[SearchMode] = match mode {
                    Some(mode) => std::slice::from_ref(mode),
                    None => &SearchMode::ALL,
                };

                let mut found = Deduplicator::new();
                for mode in modes {
                    self.search_mode(query, &patterns, *mode, &mut found).await?;
                }
                tracing::debug!("Search '{}' matched {} restaurants", text, found.len());
                Ok(found.into_vec())
            }
        }
    }

    pub async fn discover_nearby(
        &self,
        location: Coordinate,
        serving_radius_km: f64,
        now: NaiveTime,
    ) -> Result<Vec<Restaurant>> {
        self.discover(&DiscoveryQuery::nearby(location, now, serving_radius_km))
            .await
    }

    pub async fn search_by_name(
        &self,
        location: Coordinate,
        serving_radius_km: f64,
        now: NaiveTime,
        text: &str,
    ) -> Result<Vec<Restaurant>> {
        self.search(location, serving_radius_km, now, text, Some(SearchMode::Name))
            .await
    }

    pub async fn search_by_attributes(
        &self,
        location: Coordinate,
        serving_radius_km: f64,
        now: NaiveTime,
        text: &str,
    ) -> Result<Vec<Restaurant>> {
        self.search(
            location,
            serving_radius_km,
            now,
            text,
            Some(SearchMode::Attributes),
        )
        .await
    }

    /// Restaurants serving an item named exactly `text` come first, then
    /// those serving an item matching any single token.
    pub async fn search_by_item_name(
        &self,
        location: Coordinate,
        serving_radius_km: f64,
        now: NaiveTime,
        text: &str,
    ) -> Result<Vec<Restaurant>> {
        self.search(
            location,
            serving_radius_km,
            now,
            text,
            Some(SearchMode::ItemName),
        )
        .await
    }

    pub async fn search_by_item_attributes(
        &self,
        location: Coordinate,
        serving_radius_km: f64,
        now: NaiveTime,
        text: &str,
    ) -> Result<Vec<Restaurant>> {
        self.search(
            location,
            serving_radius_km,
            now,
            text,
            Some(SearchMode::ItemAttributes),
        )
        .await
    }

    /// Every search mode, merged: name, attributes, item name, item attributes.
    pub async fn search_all(
        &self,
        location: Coordinate,
        serving_radius_km: f64,
        now: NaiveTime,
        text: &str,
    ) -> Result<Vec<Restaurant>> {
        self.search(location, serving_radius_km, now, text, None)
            .await
    }

    /// Assigns the next `restaurant_sequence` id and persists. Cached nearby
    /// results are left alone and may miss the new restaurant until they
    /// expire.
    pub async fn create_restaurant(&self, mut restaurant: Restaurant) -> Result<Restaurant> {
        restaurant.validate()?;

        let id = self.sequence.next_id(RESTAURANT_SEQUENCE).await?;
        restaurant.restaurant_id = id.to_string();

        let created = self.store.create_restaurant(restaurant).await?;
        tracing::info!(
            "Created restaurant {} ({})",
            created.restaurant_id,
            created.name
        );
        Ok(created)
    }

    async fn search(
        &self,
        location: Coordinate,
        serving_radius_km: f64,
        now: NaiveTime,
        text: &str,
        mode: Option<SearchMode>,
    ) -> Result<Vec<Restaurant>> {
        let query = DiscoveryQuery::nearby(location, now, serving_radius_km).with_search(text, mode);
        self.discover(&query).await
    }

    async fn nearby(&self, query: &DiscoveryQuery) -> Result<Vec<Restaurant>> {
        if !self.cache.is_available().await {
            if self.cache.settings().require_cache_for_proximity {
                return Err(DiscoveryError::cache(
                    "nearby queries require the cache and it is unreachable",
                ));
            }
            return self.nearby_from_store(query).await;
        }

        let key = match self.cache.key_for(&query.location) {
            Ok(key) => key,
            Err(e) => {
                tracing::warn!("No cache key for {:?}: {}", query.location, e);
                return self.nearby_from_store(query).await;
            }
        };

        if let Some(cached) = self.cache.get(&key).await {
            return Ok(cached);
        }

        let restaurants = self.nearby_from_store(query).await?;
        self.cache.set(&key, &restaurants).await;
        Ok(restaurants)
    }

    async fn nearby_from_store(&self, query: &DiscoveryQuery) -> Result<Vec<Restaurant>> {
        let all = self.store.list_all_restaurants().await?;
        let total = all.len();
        let nearby: Vec<Restaurant> = all
            .into_iter()
            .filter(|r| serves(query, r))
            .collect();
        tracing::debug!(
            "{} of {} restaurants open within {}km",
            nearby.len(),
            total,
            query.serving_radius_km
        );
        Ok(nearby)
    }

    async fn search_mode(
        &self,
        query: &DiscoveryQuery,
        patterns: &TokenPatterns,
        mode: SearchMode,
        found: &mut Deduplicator,
    ) -> Result<()> {
        let candidates = match mode {
            SearchMode::Name => {
                let mut exact = self
                    .store
                    .find_restaurants_by_name_exact(patterns.text())
                    .await?;
                let fuzzy = self
                    .store
                    .find_restaurants_by_name_fuzzy(&patterns.whole_pattern()?)
                    .await?;
                exact.extend(fuzzy);
                exact
            }
            SearchMode::Attributes => {
                self.store
                    .find_restaurants_matching_attribute_patterns(&patterns.per_token_patterns()?)
                    .await?
            }
            SearchMode::ItemName => {
                // Joined separately so exact-item restaurants come first.
                let exact = self.store.find_items_by_name_exact(patterns.text()).await?;
                let fuzzy = self
                    .store
                    .find_items_by_name_fuzzy(&patterns.per_token_patterns()?)
                    .await?;
                let mut restaurants = self.restaurants_serving(&exact).await?;
                restaurants.extend(self.restaurants_serving(&fuzzy).await?);
                restaurants
            }
            SearchMode::ItemAttributes => {
                let items = self
                    .store
                    .find_items_matching_attribute_patterns(&patterns.per_token_patterns()?)
                    .await?;
                self.restaurants_serving(&items).await?
            }
        };

        tracing::debug!("{:?} search: {} candidates", mode, candidates.len());
        found.extend(candidates.into_iter().filter(|r| serves(query, r)));
        Ok(())
    }

    /// item -> menu -> restaurant join.
    async fn restaurants_serving(&self, items: &[Item]) -> Result<Vec<Restaurant>> {
        let item_ids = unique(items.iter().map(|i| i.item_id.clone()));
        if item_ids.is_empty() {
            return Ok(Vec::new());
        }

        let menus = self.store.find_menus_containing_any_item(&item_ids).await?;
        let restaurant_ids = unique(menus.into_iter().map(|m| m.restaurant_id));
        if restaurant_ids.is_empty() {
            return Ok(Vec::new());
        }

        self.store.find_restaurants_by_id(&restaurant_ids).await
    }
}

fn serves(query: &DiscoveryQuery, restaurant: &Restaurant) -> bool {
    is_open(query.current_time, &restaurant.hours)
        && is_within_radius(
            &query.location,
            &restaurant.location,
            query.serving_radius_km,
        )
}

fn unique<I: IntoIterator<Item = String>>(ids: I) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(id.clone())).collect()
}
