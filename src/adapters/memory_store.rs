use crate::core::matcher::{all_patterns_match_attributes, matches_exact};
use crate::domain::model::{Item, Menu, Restaurant};
use crate::domain::ports::RestaurantStore;
use crate::utils::error::{DiscoveryError, Result};
use crate::utils::validation::validate_non_empty_string;
use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

/// Seed data for the in-memory store, as read from a JSON dataset file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub restaurants: Vec<Restaurant>,
    #[serde(default)]
    pub menus: Vec<Menu>,
}

impl Dataset {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Parses a dataset. Every restaurant needs its own non-empty id, since
    /// searches merge results by id.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let dataset: Self = serde_json::from_str(content)?;
        let mut seen = HashSet::new();
        for restaurant in &dataset.restaurants {
            validate_non_empty_string("restaurant_id", &restaurant.restaurant_id)?;
            if !seen.insert(restaurant.restaurant_id.as_str()) {
                return Err(DiscoveryError::validation(
                    "restaurant_id",
                    &restaurant.restaurant_id,
                    "appears more than once in the dataset",
                ));
            }
        }
        Ok(dataset)
    }

    /// Largest numeric restaurant id, so new ids can continue after it.
    pub fn max_restaurant_id(&self) -> u64 {
        self.restaurants
            .iter()
            .filter_map(|r| r.restaurant_id.parse::<u64>().ok())
            .max()
            .unwrap_or(0)
    }
}

/// Restaurants and menus held in process. Results keep insertion order.
#[derive(Debug, Default)]
pub struct InMemoryRestaurantStore {
    data: RwLock<Dataset>,
    unavailable: AtomicBool,
}

impl InMemoryRestaurantStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dataset(dataset: Dataset) -> Self {
        Self {
            data: RwLock::new(dataset),
            unavailable: AtomicBool::new(false),
        }
    }

    pub async fn insert_restaurant(&self, restaurant: Restaurant) {
        self.data.write().await.restaurants.push(restaurant);
    }

    pub async fn insert_menu(&self, menu: Menu) {
        self.data.write().await.menus.push(menu);
    }

    /// Simulates losing the connection to the store.
    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DiscoveryError::store("in-memory store is marked unavailable"));
        }
        Ok(())
    }

    async fn restaurants_where<F>(&self, predicate: F) -> Result<Vec<Restaurant>>
    where
        F: Fn(&Restaurant) -> bool + Send,
    {
        self.check_available()?;
        let data = self.data.read().await;
        Ok(data
            .restaurants
            .iter()
            .filter(|r| predicate(r))
            .cloned()
            .collect())
    }

    async fn items_where<F>(&self, predicate: F) -> Result<Vec<Item>>
    where
        F: Fn(&Item) -> bool + Send,
    {
        self.check_available()?;
        let data = self.data.read().await;
        Ok(data
            .menus
            .iter()
            .flat_map(|m| m.items.iter())
            .filter(|i| predicate(i))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl RestaurantStore for InMemoryRestaurantStore {
    async fn list_all_restaurants(&self) -> Result<Vec<Restaurant>> {
        self.restaurants_where(|_| true).await
    }

    async fn find_restaurants_by_name_exact(&self, name: &str) -> Result<Vec<Restaurant>> {
        self.restaurants_where(|r| matches_exact(&r.name, name)).await
    }

    async fn find_restaurants_by_name_fuzzy(&self, pattern: &Regex) -> Result<Vec<Restaurant>> {
        self.restaurants_where(|r| pattern.is_match(&r.name)).await
    }

    async fn find_restaurants_matching_attribute_patterns(
        &self,
        patterns: &[Regex],
    ) -> Result<Vec<Restaurant>> {
        self.restaurants_where(|r| all_patterns_match_attributes(&r.attributes, patterns))
            .await
    }

    async fn find_items_by_name_exact(&self, name: &str) -> Result<Vec<Item>> {
        self.items_where(|i| matches_exact(&i.name, name)).await
    }

    async fn find_items_by_name_fuzzy(&self, patterns: &[Regex]) -> Result<Vec<Item>> {
        self.items_where(|i| patterns.iter().any(|p| p.is_match(&i.name)))
            .await
    }

    async fn find_items_matching_attribute_patterns(
        &self,
        patterns: &[Regex],
    ) -> Result<Vec<Item>> {
        self.items_where(|i| all_patterns_match_attributes(&i.attributes, patterns))
            .await
    }

    async fn find_menus_containing_any_item(&self, item_ids: &[String]) -> Result<Vec<Menu>> {
        self.check_available()?;
        let data = self.data.read().await;
        Ok(data
            .menus
            .iter()
            .filter(|m| m.contains_any_item(item_ids))
            .cloned()
            .collect())
    }

    /// Returned in the order the ids were asked for; unknown ids are skipped.
    async fn find_restaurants_by_id(&self, restaurant_ids: &[String]) -> Result<Vec<Restaurant>> {
        self.check_available()?;
        let data = self.data.read().await;
        Ok(restaurant_ids
            .iter()
            .filter_map(|id| data.restaurants.iter().find(|r| r.restaurant_id == *id))
            .cloned()
            .collect())
    }

    async fn create_restaurant(&self, restaurant: Restaurant) -> Result<Restaurant> {
        self.check_available()?;
        let mut data = self.data.write().await;
        if data
            .restaurants
            .iter()
            .any(|r| r.restaurant_id == restaurant.restaurant_id)
        {
            return Err(DiscoveryError::validation(
                "restaurant_id",
                &restaurant.restaurant_id,
                "A restaurant with this id already exists",
            ));
        }
        data.restaurants.push(restaurant.clone());
        Ok(restaurant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Coordinate, OperatingWindow};

    const DATASET: &str = r#"{
        "restaurants": [
            {"restaurant_id": "1", "name": "Empire", "latitude": 12.97, "longitude": 77.60,
             "opens_at": "11:00", "closes_at": "23:59", "attributes": ["North Indian", "Mughlai"]},
            {"restaurant_id": "7", "name": "Vidyarthi Bhavan", "city": "Bengaluru",
             "latitude": 12.94, "longitude": 77.57, "opens_at": "06:30", "closes_at": "20:00",
             "attributes": ["South Indian", "Vegetarian"]}
        ],
        "menus": [
            {"menu_id": "m1", "restaurant_id": "1", "items": [
                {"item_id": "i1", "name": "Chicken Kebab", "price": 220.0, "attributes": ["Non-Veg", "Starter"]}
            ]},
            {"menu_id": "m7", "restaurant_id": "7", "items": [
                {"item_id": "i7", "name": "Masala Dosa", "price": 60.0, "attributes": ["Veg", "Breakfast"]},
                {"item_id": "i8", "name": "Kesari Bath", "attributes": ["Veg", "Sweet"]}
            ]}
        ]
    }"#;

    fn store() -> InMemoryRestaurantStore {
        InMemoryRestaurantStore::with_dataset(Dataset::from_json_str(DATASET).unwrap())
    }

    fn ci(pattern: &str) -> Regex {
        regex::RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .unwrap()
    }

    #[test]
    fn test_dataset_rejects_missing_and_repeated_ids() {
        let missing = r#"{"restaurants": [
            {"name": "A", "latitude": 1.0, "longitude": 1.0, "opens_at": "09:00", "closes_at": "17:00"},
            {"name": "B", "latitude": 1.0, "longitude": 1.0, "opens_at": "09:00", "closes_at": "17:00"}
        ]}"#;
        assert!(matches!(
            Dataset::from_json_str(missing),
            Err(DiscoveryError::ValidationError { ref field, .. }) if field == "restaurant_id"
        ));

        let repeated = r#"{"restaurants": [
            {"restaurant_id": "3", "name": "A", "latitude": 1.0, "longitude": 1.0, "opens_at": "09:00", "closes_at": "17:00"},
            {"restaurant_id": "3", "name": "B", "latitude": 1.0, "longitude": 1.0, "opens_at": "09:00", "closes_at": "17:00"}
        ]}"#;
        assert!(matches!(
            Dataset::from_json_str(repeated),
            Err(DiscoveryError::ValidationError { .. })
        ));
    }

    #[tokio::test]
    async fn test_item_fuzzy_matches_any_pattern() {
        let store = store();
        let items = store
            .find_items_by_name_fuzzy(&[ci("kebab"), ci("bath")])
            .await
            .unwrap();
        let ids: Vec<&str> = items.iter().map(|i| i.item_id.as_str()).collect();
        assert_eq!(ids, vec!["i1", "i8"]);
        assert!(store.find_items_by_name_fuzzy(&[]).await.unwrap().is_empty());
    }

    #[test]
    fn test_dataset_max_id() {
        assert_eq!(Dataset::from_json_str(DATASET).unwrap().max_restaurant_id(), 7);
        assert_eq!(Dataset::default().max_restaurant_id(), 0);
    }

    #[tokio::test]
    async fn test_name_lookups() {
        let store = store();
        assert_eq!(store.find_restaurants_by_name_exact("Empire").await.unwrap().len(), 1);
        assert!(store.find_restaurants_by_name_exact("empire").await.unwrap().is_empty());
        assert_eq!(
            store.find_restaurants_by_name_fuzzy(&ci("bhavan")).await.unwrap()[0].restaurant_id,
            "7"
        );
    }

    #[tokio::test]
    async fn test_attribute_patterns_need_every_token() {
        let store = store();
        let both = store
            .find_restaurants_matching_attribute_patterns(&[ci("south"), ci("veg")])
            .await
            .unwrap();
        assert_eq!(both.len(), 1);
        assert_eq!(both[0].restaurant_id, "7");

        let none = store
            .find_restaurants_matching_attribute_patterns(&[ci("south"), ci("mughlai")])
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_item_to_menu_lookup() {
        let store = store();
        let items = store
            .find_items_matching_attribute_patterns(&[ci("veg")])
            .await
            .unwrap();
        // "Non-Veg" contains "veg" too.
        assert_eq!(items.len(), 3);

        let menus = store
            .find_menus_containing_any_item(&["i8".to_string()])
            .await
            .unwrap();
        assert_eq!(menus.len(), 1);
        assert_eq!(menus[0].restaurant_id, "7");
    }

    #[tokio::test]
    async fn test_find_by_id_keeps_requested_order() {
        let store = store();
        let ids = vec!["7".to_string(), "missing".to_string(), "1".to_string()];
        let found: Vec<String> = store
            .find_restaurants_by_id(&ids)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.restaurant_id)
            .collect();
        assert_eq!(found, vec!["7", "1"]);
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_id() {
        let store = store();
        let restaurant = Restaurant {
            restaurant_id: "1".to_string(),
            name: "Copy".to_string(),
            city: String::new(),
            image_url: String::new(),
            location: Coordinate {
                latitude: 0.0,
                longitude: 0.0,
            },
            hours: OperatingWindow::parse("10:00", "20:00").unwrap(),
            attributes: vec![],
        };
        assert!(store.create_restaurant(restaurant).await.is_err());
    }

    #[tokio::test]
    async fn test_unavailable_store_errors() {
        let store = store();
        store.set_available(false);
        assert!(matches!(
            store.list_all_restaurants().await,
            Err(DiscoveryError::StoreUnavailable { .. })
        ));
        store.set_available(true);
        assert_eq!(store.list_all_restaurants().await.unwrap().len(), 2);
    }
}
