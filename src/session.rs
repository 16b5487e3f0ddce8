//! Per-session service graph.
//!
//! A session owns its transport, cache and services. Nothing is shared
//! between sessions, so concurrent sessions never race on cache state.

use color_eyre::Result;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{CacheLayer, MemoryStorage};
use crate::catalog::{
  CachedCatalogService, CatalogBrand, CatalogEntity, CatalogItem, CatalogItemView, CatalogService,
  CatalogType, HttpCatalogService,
};
use crate::config::Config;
use crate::http::HttpService;
use crate::telemetry::Telemetry;

pub struct Session {
  pub brands: Arc<dyn CatalogService<CatalogBrand>>,
  pub types: Arc<dyn CatalogService<CatalogType>>,
  pub items: Arc<dyn CatalogService<CatalogItem>>,
  telemetry: Telemetry,
}

impl Session {
  /// Build a session from configuration.
  ///
  /// Fails if the API base URL is missing or malformed, or the telemetry
  /// settings are invalid.
  pub fn build(config: &Config) -> Result<Self> {
    let api_base = config.api_base()?;
    let telemetry = Telemetry::from_config(&config.telemetry)?;
    tracing::info!(
      "Session against {} (cache: {}, telemetry: {})",
      api_base,
      config.cache.enabled,
      telemetry.is_enabled()
    );

    let http = HttpService::new(api_base, telemetry);
    Ok(Self::wire(http, config.cache.enabled))
  }

  fn wire(http: HttpService, cached: bool) -> Self {
    let cache = cached.then(|| CacheLayer::new(MemoryStorage::new()));

    Self {
      brands: service(&http, cache.as_ref()),
      types: service(&http, cache.as_ref()),
      items: service(&http, cache.as_ref()),
      telemetry: http.telemetry().clone(),
    }
  }

  /// Flush dependency records still being delivered, waiting at most `timeout`.
  pub async fn shutdown(&self, timeout: Duration) {
    self.telemetry.shutdown(timeout).await;
  }

  /// List items with the display names of their brand and type.
  ///
  /// Brands and types are fetched alongside the items. If either lookup
  /// fails, the affected names are left empty; if the item list fails the
  /// whole result is `None`.
  pub async fn list_items_detailed(&self) -> Result<Option<Vec<CatalogItemView>>> {
    let (items, brands, types) =
      futures::try_join!(self.items.list(), self.brands.list(), self.types.list())?;

    let Some(items) = items else {
      return Ok(None);
    };

    let brand_names = names(brands.unwrap_or_default(), |b| (b.id, b.name));
    let type_names = names(types.unwrap_or_default(), |t| (t.id, t.name));

    let views = items
      .into_iter()
      .map(|item| CatalogItemView {
        catalog_brand: brand_names.get(&item.catalog_brand_id).cloned(),
        catalog_type: type_names.get(&item.catalog_type_id).cloned(),
        item,
      })
      .collect();

    Ok(Some(views))
  }
}

fn service<E: CatalogEntity>(
  http: &HttpService,
  cache: Option<&CacheLayer<MemoryStorage>>,
) -> Arc<dyn CatalogService<E>> {
  let plain = HttpCatalogService::<E>::new(http.clone());
  match cache {
    Some(cache) => Arc::new(CachedCatalogService::new(plain, cache.clone())),
    None => Arc::new(plain),
  }
}

fn names<T>(entities: Vec<T>, entry: impl Fn(T) -> (i32, String)) -> HashMap<i32, String> {
  entities.into_iter().map(entry).collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::{CreateCatalogBrandRequest, CreateCatalogTypeRequest};
  use crate::telemetry::testing::channel_telemetry;
  use httpmock::prelude::*;
  use serde_json::json;

  fn session(server: &MockServer, cached: bool) -> Session {
    Session::wire(HttpService::new(server.base_url(), Telemetry::disabled()), cached)
  }

  #[tokio::test]
  async fn test_brands_cached_after_first_list() {
    let server = MockServer::start_async().await;
    let list = server
      .mock_async(|when, then| {
        when.method(GET).path("/catalog-brands");
        then
          .status(200)
          .json_body(json!({"catalogBrands": [{"id": 1, "name": "Brand A"}]}));
      })
      .await;

    let session = session(&server, true);
    let first = session.brands.list().await.unwrap();
    let second = session.brands.list().await.unwrap();

    assert_eq!(
      first,
      Some(vec![CatalogBrand {
        id: 1,
        name: "Brand A".to_string()
      }])
    );
    assert_eq!(first, second);
    assert_eq!(list.hits_async().await, 1);
  }

  #[tokio::test]
  async fn test_create_brand_forces_fresh_list() {
    let server = MockServer::start_async().await;
    let list = server
      .mock_async(|when, then| {
        when.method(GET).path("/catalog-brands");
        then
          .status(200)
          .json_body(json!({"catalogBrands": [{"id": 1, "name": "Brand A"}]}));
      })
      .await;
    let create = server
      .mock_async(|when, then| {
        when
          .method(POST)
          .path("/catalog-brands")
          .json_body(json!({"name": "Brand B"}));
        then
          .status(200)
          .json_body(json!({"catalogBrand": {"id": 2, "name": "Brand B"}}));
      })
      .await;

    let session = session(&server, true);
    session.brands.list().await.unwrap();
    let created = session
      .brands
      .create(&CreateCatalogBrandRequest {
        name: "Brand B".to_string(),
      })
      .await
      .unwrap();
    assert_eq!(created.map(|b| b.id), Some(2));

    session.brands.list().await.unwrap();

    create.assert_async().await;
    assert_eq!(list.hits_async().await, 2);
  }

  #[tokio::test]
  async fn test_failed_types_list_is_not_cached() {
    let server = MockServer::start_async().await;
    let list = server
      .mock_async(|when, then| {
        when.method(GET).path("/catalog-types");
        then.status(500);
      })
      .await;

    let session = session(&server, true);
    assert_eq!(session.types.list().await.unwrap(), None);
    assert_eq!(session.types.list().await.unwrap(), None);

    assert_eq!(list.hits_async().await, 2);
  }

  #[tokio::test]
  async fn test_type_writes_are_visible_to_next_read() {
    let server = MockServer::start_async().await;
    let list = server
      .mock_async(|when, then| {
        when.method(GET).path("/catalog-types");
        then
          .status(200)
          .json_body(json!({"catalogTypes": [{"id": 1, "name": "Mug"}]}));
      })
      .await;
    server
      .mock_async(|when, then| {
        when.method(POST).path("/catalog-types");
        then
          .status(200)
          .json_body(json!({"catalogType": {"id": 2, "name": "Cap"}}));
      })
      .await;
    server
      .mock_async(|when, then| {
        when.method(PUT).path("/catalog-types");
        then
          .status(200)
          .json_body(json!({"catalogType": {"id": 1, "name": "Cup"}}));
      })
      .await;

    let session = session(&server, true);
    assert_eq!(session.types.list().await.unwrap().unwrap().len(), 1);

    list.delete_async().await;
    let list = server
      .mock_async(|when, then| {
        when.method(GET).path("/catalog-types");
        then.status(200).json_body(json!({"catalogTypes": [
          {"id": 1, "name": "Mug"}, {"id": 2, "name": "Cap"}
        ]}));
      })
      .await;

    session
      .types
      .create(&CreateCatalogTypeRequest {
        name: "Cap".to_string(),
      })
      .await
      .unwrap();
    let after_create = session.types.list().await.unwrap().unwrap();
    assert_eq!(after_create.len(), 2);
    assert_eq!(list.hits_async().await, 1);

    list.delete_async().await;
    server
      .mock_async(|when, then| {
        when.method(GET).path("/catalog-types");
        then.status(200).json_body(json!({"catalogTypes": [
          {"id": 1, "name": "Cup"}, {"id": 2, "name": "Cap"}
        ]}));
      })
      .await;

    session
      .types
      .update(&CatalogType {
        id: 1,
        name: "Cup".to_string(),
      })
      .await
      .unwrap();
    let after_update = session.types.list().await.unwrap().unwrap();
    assert_eq!(after_update[0].name, "Cup");
  }

  #[tokio::test]
  async fn test_shutdown_flushes_records() {
    let server = MockServer::start_async().await;
    server
      .mock_async(|when, then| {
        when.method(GET).path("/catalog-brands");
        then.status(200).json_body(json!({"catalogBrands": []}));
      })
      .await;

    let (telemetry, mut rx) = channel_telemetry();
    let session = Session::wire(HttpService::new(server.base_url(), telemetry), true);
    session.brands.list().await.unwrap();
    session.shutdown(Duration::from_secs(2)).await;

    assert_eq!(rx.try_recv().unwrap().command_name, "/catalog-brands");
  }

  #[tokio::test]
  async fn test_item_read_after_update_is_fresh() {
    let server = MockServer::start_async().await;
    let get = server
      .mock_async(|when, then| {
        when.method(GET).path("/catalog-items/7");
        then.status(200).json_body(json!({"catalogItem": {
          "id": 7, "name": "Mug", "price": 8.5, "catalogBrandId": 1, "catalogTypeId": 1
        }}));
      })
      .await;
    let put = server
      .mock_async(|when, then| {
        when.method(PUT).path("/catalog-items");
        then.status(200).json_body(json!({"catalogItem": {
          "id": 7, "name": "Mug", "price": 9.0, "catalogBrandId": 1, "catalogTypeId": 1
        }}));
      })
      .await;

    let session = session(&server, true);
    let mut item = session.items.get(7).await.unwrap().unwrap();
    session.items.get(7).await.unwrap();
    assert_eq!(get.hits_async().await, 1);

    item.price = 9.0;
    session.items.update(&item).await.unwrap();
    session.items.get(7).await.unwrap();

    put.assert_async().await;
    assert_eq!(get.hits_async().await, 2);
  }

  #[tokio::test]
  async fn test_uncached_session_always_fetches() {
    let server = MockServer::start_async().await;
    let list = server
      .mock_async(|when, then| {
        when.method(GET).path("/catalog-brands");
        then.status(200).json_body(json!({"catalogBrands": []}));
      })
      .await;

    let session = session(&server, false);
    session.brands.list().await.unwrap();
    session.brands.list().await.unwrap();

    assert_eq!(list.hits_async().await, 2);
  }

  #[tokio::test]
  async fn test_sessions_do_not_share_cache() {
    let server = MockServer::start_async().await;
    let list = server
      .mock_async(|when, then| {
        when.method(GET).path("/catalog-brands");
        then.status(200).json_body(json!({"catalogBrands": []}));
      })
      .await;

    session(&server, true).brands.list().await.unwrap();
    session(&server, true).brands.list().await.unwrap();

    assert_eq!(list.hits_async().await, 2);
  }

  #[tokio::test]
  async fn test_list_items_detailed_resolves_names() {
    let server = MockServer::start_async().await;
    server
      .mock_async(|when, then| {
        when.method(GET).path("/catalog-items");
        then.status(200).json_body(json!({"catalogItems": [
          {"id": 1, "name": "Sweatshirt", "price": 19.5, "catalogBrandId": 2, "catalogTypeId": 2},
          {"id": 2, "name": "Orphan", "price": 1.0, "catalogBrandId": 99, "catalogTypeId": 1}
        ], "pageCount": 1}));
      })
      .await;
    server
      .mock_async(|when, then| {
        when.method(GET).path("/catalog-brands");
        then.status(200).json_body(json!({"catalogBrands": [
          {"id": 1, "name": "Azure"}, {"id": 2, "name": ".NET"}
        ]}));
      })
      .await;
    server
      .mock_async(|when, then| {
        when.method(GET).path("/catalog-types");
        then.status(200).json_body(json!({"catalogTypes": [
          {"id": 1, "name": "Mug"}, {"id": 2, "name": "T-Shirt"}
        ]}));
      })
      .await;

    let session = session(&server, true);
    let views = session.list_items_detailed().await.unwrap().unwrap();

    assert_eq!(views.len(), 2);
    assert_eq!(views[0].catalog_brand.as_deref(), Some(".NET"));
    assert_eq!(views[0].catalog_type.as_deref(), Some("T-Shirt"));
    assert_eq!(views[1].catalog_brand, None);
    assert_eq!(views[1].catalog_type.as_deref(), Some("Mug"));
  }

  #[tokio::test]
  async fn test_list_items_detailed_without_items_is_none() {
    let server = MockServer::start_async().await;
    server
      .mock_async(|when, then| {
        when.method(GET);
        then.status(503);
      })
      .await;

    let session = session(&server, true);
    assert!(session.list_items_detailed().await.unwrap().is_none());
  }

  #[test]
  fn test_build_requires_base_url() {
    assert!(Session::build(&Config::default()).is_err());
  }
}
