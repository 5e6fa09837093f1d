pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::adapters::{
    AtomicSequenceGenerator, Dataset, InMemoryCache, InMemoryRestaurantStore, NoOpCache,
};
pub use crate::config::DiscoveryConfig;
pub use crate::core::discovery::{DiscoveryService, DiscoverySettings, RESTAURANT_SEQUENCE};
pub use crate::domain::model::{
    Coordinate, DiscoveryQuery, Item, Menu, OperatingWindow, Restaurant, SearchMode,
};
pub use crate::utils::error::{DiscoveryError, Result};
