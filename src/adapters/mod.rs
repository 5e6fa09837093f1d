// Adapters layer: in-process implementations of the store, cache and id ports.

pub mod memory_cache;
pub mod memory_store;
pub mod sequence;

pub use memory_cache::{InMemoryCache, NoOpCache};
pub use memory_store::{Dataset, InMemoryRestaurantStore};
pub use sequence::AtomicSequenceGenerator;
