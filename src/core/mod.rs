pub mod availability;
pub mod cache_aside;
pub mod discovery;
pub mod geo;
pub mod geohash;
pub mod matcher;

pub use crate::domain::model::{Coordinate, DiscoveryQuery, Restaurant, SearchMode};
pub use crate::domain::ports::{CacheStore, RestaurantStore, SequenceGenerator};
pub use crate::utils::error::Result;
