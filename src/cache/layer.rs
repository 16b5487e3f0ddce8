//! Cache layer that orchestrates caching logic with network fetching.

use color_eyre::Result;
use std::future::Future;
use std::sync::Arc;

use super::storage::CacheStorage;
use super::traits::{CacheResult, Cacheable};

/// Cache layer that manages read-through caching and invalidation.
///
/// This layer sits between a service decorator and the service it wraps.
/// Entries never expire on their own; they live until invalidated.
pub struct CacheLayer<S: CacheStorage> {
  storage: Arc<S>,
}

impl<S: CacheStorage> CacheLayer<S> {
  /// Create a new cache layer with the given storage backend.
  pub fn new(storage: S) -> Self {
    Self {
      storage: Arc::new(storage),
    }
  }

  /// Fetch a list with cache-first strategy.
  ///
  /// 1. Check cache - if present, return immediately
  /// 2. If missing, fetch through the fetcher
  /// 3. Store a `Some` result; `None` is passed through and never cached
  pub async fn fetch_list<T, F, Fut>(&self, key: &str, fetcher: F) -> Result<Option<CacheResult<Vec<T>>>>
  where
    T: Cacheable,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Option<Vec<T>>>>,
  {
    if let Some(cached) = self.storage.get_query_result::<T>(key)? {
      tracing::debug!("Cache hit for {}", key);
      return Ok(Some(CacheResult::from_cache(
        cached.entities,
        cached.cached_at,
      )));
    }

    tracing::debug!("Cache miss for {}", key);
    let generation = self.storage.generation()?;

    let Some(data) = fetcher().await? else {
      return Ok(None);
    };

    if !self.storage.store_query_result(key, &data, generation)? {
      tracing::debug!("Not caching {}: invalidated while fetching", key);
    }

    Ok(Some(CacheResult::from_network(data)))
  }

  /// Fetch a single entity with caching.
  ///
  /// A cached list under `list_key` containing the entity also counts as a hit.
  pub async fn fetch_one<T, F, Fut>(
    &self,
    list_key: &str,
    entity_key: &str,
    fetcher: F,
  ) -> Result<Option<CacheResult<T>>>
  where
    T: Cacheable,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
  {
    if let Some(cached) = self.storage.get_entity::<T>(entity_key)? {
      tracing::debug!("Cache hit for {} {}", T::entity_type(), entity_key);
      return Ok(Some(CacheResult::from_cache(cached.entity, cached.cached_at)));
    }

    if let Some(cached) = self.storage.get_query_result::<T>(list_key)? {
      if let Some(entity) = cached
        .entities
        .into_iter()
        .find(|e| e.cache_key() == entity_key)
      {
        tracing::debug!("Cache hit for {} {} in {}", T::entity_type(), entity_key, list_key);
        return Ok(Some(CacheResult::from_cache(entity, cached.cached_at)));
      }
    }

    tracing::debug!("Cache miss for {} {}", T::entity_type(), entity_key);
    let generation = self.storage.generation()?;

    let Some(data) = fetcher().await? else {
      return Ok(None);
    };

    if !self.storage.store_entity(&data, generation)? {
      tracing::debug!("Not caching {} {}: invalidated while fetching", T::entity_type(), entity_key);
    }

    Ok(Some(CacheResult::from_network(data)))
  }

  /// Drop the list under `list_key` and, if given, one entity of type `T`.
  pub fn invalidate<T: Cacheable>(&self, list_key: &str, entity_key: Option<&str>) -> Result<()> {
    tracing::debug!("Invalidating {}", list_key);
    self.storage.invalidate_query(list_key)?;

    if let Some(entity_key) = entity_key {
      tracing::debug!("Invalidating {} {}", T::entity_type(), entity_key);
      self.storage.invalidate_entity::<T>(entity_key)?;
    }

    Ok(())
  }
}

impl<S: CacheStorage> Clone for CacheLayer<S> {
  fn clone(&self) -> Self {
    Self {
      storage: Arc::clone(&self.storage),
    }
  }
}
