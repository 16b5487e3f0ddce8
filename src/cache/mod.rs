//! Generic session cache for service decorators.
//!
//! This module provides a domain-agnostic caching mechanism that:
//! - Caches full lists under a collection key and single entities by type + key
//! - Serves single entities out of a cached list when possible
//! - Never expires entries; writes invalidate them explicitly
//! - Refuses to store results fetched across an invalidation

mod layer;
mod storage;
mod traits;

pub use layer::CacheLayer;
pub use storage::{CacheStorage, MemoryStorage};
pub use traits::{CacheResult, CacheSource, Cacheable};
