//! Per-kind bindings: resource paths, cache keys and envelope types.

use serde::{de::DeserializeOwned, Serialize};
use std::fmt::Debug;

use crate::cache::Cacheable;

use super::api_types::{
  CatalogBrandListResponse, CatalogBrandResponse, CatalogItemResponse, CatalogTypeListResponse,
  CatalogTypeResponse, PagedCatalogItemResponse,
};
use super::types::{
  CatalogBrand, CatalogItem, CatalogType, CreateCatalogBrandRequest, CreateCatalogItemRequest,
  CreateCatalogTypeRequest,
};

/// An entity kind served by the catalog API.
pub trait CatalogEntity: Cacheable + Serialize + DeserializeOwned + Debug {
  /// Body sent when creating an entity of this kind
  type Create: Serialize + Send + Sync;
  /// Envelope returned by the list endpoint
  type ListResponse: DeserializeOwned + Into<Vec<Self>> + Send;
  /// Envelope returned by get, create and update
  type Response: DeserializeOwned + Into<Self> + Send;

  /// Resource path relative to the API base
  const RESOURCE: &'static str;
  /// Cache key of the full collection
  const COLLECTION_KEY: &'static str;

  fn id(&self) -> i32;
}

impl Cacheable for CatalogBrand {
  fn cache_key(&self) -> String {
    self.id.to_string()
  }

  fn entity_type() -> &'static str {
    "brand"
  }
}

impl CatalogEntity for CatalogBrand {
  type Create = CreateCatalogBrandRequest;
  type ListResponse = CatalogBrandListResponse;
  type Response = CatalogBrandResponse;

  const RESOURCE: &'static str = "/catalog-brands";
  const COLLECTION_KEY: &'static str = "brands";

  fn id(&self) -> i32 {
    self.id
  }
}

impl Cacheable for CatalogType {
  fn cache_key(&self) -> String {
    self.id.to_string()
  }

  fn entity_type() -> &'static str {
    "type"
  }
}

impl CatalogEntity for CatalogType {
  type Create = CreateCatalogTypeRequest;
  type ListResponse = CatalogTypeListResponse;
  type Response = CatalogTypeResponse;

  const RESOURCE: &'static str = "/catalog-types";
  const COLLECTION_KEY: &'static str = "types";

  fn id(&self) -> i32 {
    self.id
  }
}

impl Cacheable for CatalogItem {
  fn cache_key(&self) -> String {
    self.id.to_string()
  }

  fn entity_type() -> &'static str {
    "item"
  }
}

impl CatalogEntity for CatalogItem {
  type Create = CreateCatalogItemRequest;
  type ListResponse = PagedCatalogItemResponse;
  type Response = CatalogItemResponse;

  const RESOURCE: &'static str = "/catalog-items";
  const COLLECTION_KEY: &'static str = "items";

  fn id(&self) -> i32 {
    self.id
  }
}
