//! Cache storage trait and in-memory implementation.

use chrono::{DateTime, Utc};
use color_eyre::{eyre::eyre, Result};
use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::traits::Cacheable;

/// Result of a cached query lookup.
#[derive(Debug, Clone)]
pub struct CachedQueryResult<T> {
  /// The cached entities in order
  pub entities: Vec<T>,
  /// When the query result was cached
  pub cached_at: DateTime<Utc>,
}

/// A single cached entity.
#[derive(Debug, Clone)]
pub struct CachedEntity<T> {
  /// The cached entity
  pub entity: T,
  /// When the entity was cached
  pub cached_at: DateTime<Utc>,
}

/// Trait for cache storage backends.
///
/// Every invalidation advances a generation counter. Stores take the
/// generation observed before the fetch started and are discarded if an
/// invalidation happened in between, so an in-flight read can never
/// resurrect an entry a write just removed.
pub trait CacheStorage: Send + Sync {
  /// Current invalidation generation.
  fn generation(&self) -> Result<u64>;

  /// Store entities from a query result. Returns false if the store was discarded.
  fn store_query_result<T: Cacheable>(&self, key: &str, entities: &[T], generation: u64) -> Result<bool>;

  /// Get cached entities for a query.
  fn get_query_result<T: Cacheable>(&self, key: &str) -> Result<Option<CachedQueryResult<T>>>;

  /// Get a single entity by key.
  fn get_entity<T: Cacheable>(&self, entity_key: &str) -> Result<Option<CachedEntity<T>>>;

  /// Store a single entity. Returns false if the store was discarded.
  fn store_entity<T: Cacheable>(&self, entity: &T, generation: u64) -> Result<bool>;

  /// Remove a query result.
  fn invalidate_query(&self, key: &str) -> Result<()>;

  /// Remove a single entity.
  fn invalidate_entity<T: Cacheable>(&self, entity_key: &str) -> Result<()>;
}

type Snapshot = Arc<dyn Any + Send + Sync>;

struct Slot {
  entity_type: &'static str,
  value: Snapshot,
  cached_at: DateTime<Utc>,
}

#[derive(Default)]
struct MemoryState {
  generation: u64,
  queries: HashMap<String, Slot>,
  entities: HashMap<(&'static str, String), Slot>,
}

/// Process-local storage, owned by a single session.
#[derive(Default)]
pub struct MemoryStorage {
  state: Mutex<MemoryState>,
}

impl MemoryStorage {
  pub fn new() -> Self {
    Self::default()
  }

  fn lock(&self) -> Result<MutexGuard<'_, MemoryState>> {
    self.state.lock().map_err(|e| eyre!("Lock poisoned: {}", e))
  }
}

impl CacheStorage for MemoryStorage {
  fn generation(&self) -> Result<u64> {
    Ok(self.lock()?.generation)
  }

  fn store_query_result<T: Cacheable>(&self, key: &str, entities: &[T], generation: u64) -> Result<bool> {
    let mut state = self.lock()?;
    if state.generation != generation {
      return Ok(false);
    }

    state.queries.insert(
      key.to_string(),
      Slot {
        entity_type: T::entity_type(),
        value: Arc::new(entities.to_vec()),
        cached_at: Utc::now(),
      },
    );

    Ok(true)
  }

  fn get_query_result<T: Cacheable>(&self, key: &str) -> Result<Option<CachedQueryResult<T>>> {
    let state = self.lock()?;

    let result = state
      .queries
      .get(key)
      .filter(|slot| slot.entity_type == T::entity_type())
      .and_then(|slot| {
        slot
          .value
          .downcast_ref::<Vec<T>>()
          .map(|entities| CachedQueryResult {
            entities: entities.clone(),
            cached_at: slot.cached_at,
          })
      });

    Ok(result)
  }

  fn get_entity<T: Cacheable>(&self, entity_key: &str) -> Result<Option<CachedEntity<T>>> {
    let state = self.lock()?;

    let result = state
      .entities
      .get(&(T::entity_type(), entity_key.to_string()))
      .and_then(|slot| {
        slot.value.downcast_ref::<T>().map(|entity| CachedEntity {
          entity: entity.clone(),
          cached_at: slot.cached_at,
        })
      });

    Ok(result)
  }

  fn store_entity<T: Cacheable>(&self, entity: &T, generation: u64) -> Result<bool> {
    let mut state = self.lock()?;
    if state.generation != generation {
      return Ok(false);
    }

    state.entities.insert(
      (T::entity_type(), entity.cache_key()),
      Slot {
        entity_type: T::entity_type(),
        value: Arc::new(entity.clone()),
        cached_at: Utc::now(),
      },
    );

    Ok(true)
  }

  fn invalidate_query(&self, key: &str) -> Result<()> {
    let mut state = self.lock()?;
    state.generation += 1;
    state.queries.remove(key);
    Ok(())
  }

  fn invalidate_entity<T: Cacheable>(&self, entity_key: &str) -> Result<()> {
    let mut state = self.lock()?;
    state.generation += 1;
    state
      .entities
      .remove(&(T::entity_type(), entity_key.to_string()));
    Ok(())
  }
}
