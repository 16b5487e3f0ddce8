//! Core traits and types for the caching system.

use chrono::{DateTime, Utc};

/// Trait for entities that can be cached.
///
/// Implementors must provide a unique cache key within their entity type.
pub trait Cacheable: Clone + Send + Sync + 'static {
  /// Unique identifier for this entity (e.g., the numeric id as a string)
  fn cache_key(&self) -> String;

  /// Entity type name for storage organization (e.g., "brand", "item")
  fn entity_type() -> &'static str;
}

/// Result from a cache operation, including data and metadata about the source.
#[derive(Debug, Clone)]
pub struct CacheResult<T> {
  /// The actual data
  pub data: T,
  /// Where the data came from
  pub source: CacheSource,
  /// When the data was cached (if from cache)
  pub cached_at: Option<DateTime<Utc>>,
}

impl<T> CacheResult<T> {
  /// Create a new cache result from fresh network data.
  pub fn from_network(data: T) -> Self {
    Self {
      data,
      source: CacheSource::Network,
      cached_at: None,
    }
  }

  /// Create a new cache result from cached data.
  pub fn from_cache(data: T, cached_at: DateTime<Utc>) -> Self {
    Self {
      data,
      source: CacheSource::Cache,
      cached_at: Some(cached_at),
    }
  }
}

/// Indicates where data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheSource {
  /// Fetched through the wrapped service
  Network,
  /// Served from the session cache
  Cache,
}
