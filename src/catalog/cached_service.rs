//! Catalog service decorator with transparent session caching.

use async_trait::async_trait;
use color_eyre::Result;
use std::marker::PhantomData;

use crate::cache::{CacheLayer, CacheResult, CacheSource, CacheStorage, MemoryStorage};

use super::entity::CatalogEntity;
use super::service::CatalogService;
use super::types::DeleteResponse;

/// Catalog service with read-through caching.
///
/// This wraps another `CatalogService` for the same entity kind and exposes
/// the same verbs. Reads are served from the cache when possible; writes go
/// to the wrapped service first and then invalidate the collection and the
/// touched item. A write that reported failure (`Ok(None)`) leaves the cache
/// alone. A write that errored may still have reached the server, so it
/// invalidates too.
pub struct CachedCatalogService<E, S, St: CacheStorage = MemoryStorage> {
  inner: S,
  cache: CacheLayer<St>,
  _entity: PhantomData<fn() -> E>,
}

impl<E, S, St> CachedCatalogService<E, S, St>
where
  E: CatalogEntity,
  S: CatalogService<E>,
  St: CacheStorage,
{
  pub fn new(inner: S, cache: CacheLayer<St>) -> Self {
    Self {
      inner,
      cache,
      _entity: PhantomData,
    }
  }

  fn invalidate_after<T>(&self, outcome: &Result<Option<T>>, id: Option<i32>) -> Result<()> {
    if matches!(outcome, Ok(None)) {
      return Ok(());
    }

    let entity_key = id.map(|id| id.to_string());
    self
      .cache
      .invalidate::<E>(E::COLLECTION_KEY, entity_key.as_deref())
  }
}

#[async_trait]
impl<E, S, St> CatalogService<E> for CachedCatalogService<E, S, St>
where
  E: CatalogEntity,
  S: CatalogService<E>,
  St: CacheStorage + 'static,
{
  async fn list(&self) -> Result<Option<Vec<E>>> {
    let result = self
      .cache
      .fetch_list(E::COLLECTION_KEY, || self.inner.list())
      .await?;

    Ok(result.map(|r| served::<E, _>("list", r)))
  }

  async fn get(&self, id: i32) -> Result<Option<E>> {
    let result = self
      .cache
      .fetch_one(E::COLLECTION_KEY, &id.to_string(), || self.inner.get(id))
      .await?;

    Ok(result.map(|r| served::<E, _>("get", r)))
  }

  async fn create(&self, request: &E::Create) -> Result<Option<E>> {
    let created = self.inner.create(request).await;
    let id = match &created {
      Ok(Some(entity)) => Some(entity.id()),
      _ => None,
    };
    self.invalidate_after(&created, id)?;
    created
  }

  async fn update(&self, entity: &E) -> Result<Option<E>> {
    let updated = self.inner.update(entity).await;
    self.invalidate_after(&updated, Some(entity.id()))?;
    updated
  }

  async fn delete(&self, id: i32) -> Result<Option<DeleteResponse>> {
    let deleted = self.inner.delete(id).await;
    self.invalidate_after(&deleted, Some(id))?;
    deleted
  }
}

fn served<E: CatalogEntity, T>(verb: &str, result: CacheResult<T>) -> T {
  if let (CacheSource::Cache, Some(at)) = (result.source, result.cached_at) {
    tracing::debug!("{} {} served from cache stored at {}", E::entity_type(), verb, at);
  }
  result.data
}
