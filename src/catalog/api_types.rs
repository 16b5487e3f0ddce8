//! Response envelopes wrapping catalog entities.
//!
//! These types are separate from entity types so services can unwrap the
//! envelope and hand plain entities to callers.

use serde::Deserialize;

use super::types::{CatalogBrand, CatalogItem, CatalogType};

// ============================================================================
// Brands
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CatalogBrandListResponse {
  #[serde(default, rename(deserialize = "catalogbrands"))]
  pub catalog_brands: Vec<CatalogBrand>,
}

#[derive(Debug, Deserialize)]
pub struct CatalogBrandResponse {
  #[serde(rename(deserialize = "catalogbrand"))]
  pub catalog_brand: CatalogBrand,
}

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CatalogTypeListResponse {
  #[serde(default, rename(deserialize = "catalogtypes"))]
  pub catalog_types: Vec<CatalogType>,
}

#[derive(Debug, Deserialize)]
pub struct CatalogTypeResponse {
  #[serde(rename(deserialize = "catalogtype"))]
  pub catalog_type: CatalogType,
}

// ============================================================================
// Items
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct PagedCatalogItemResponse {
  #[serde(default, rename(deserialize = "catalogitems"))]
  pub catalog_items: Vec<CatalogItem>,
  #[serde(default, rename(deserialize = "pagecount"))]
  pub page_count: u32,
}

#[derive(Debug, Deserialize)]
pub struct CatalogItemResponse {
  #[serde(rename(deserialize = "catalogitem"))]
  pub catalog_item: CatalogItem,
}

// ============================================================================
// Conversions to entities
// ============================================================================

impl From<CatalogBrandListResponse> for Vec<CatalogBrand> {
  fn from(resp: CatalogBrandListResponse) -> Self {
    resp.catalog_brands
  }
}

impl From<CatalogBrandResponse> for CatalogBrand {
  fn from(resp: CatalogBrandResponse) -> Self {
    resp.catalog_brand
  }
}

impl From<CatalogTypeListResponse> for Vec<CatalogType> {
  fn from(resp: CatalogTypeListResponse) -> Self {
    resp.catalog_types
  }
}

impl From<CatalogTypeResponse> for CatalogType {
  fn from(resp: CatalogTypeResponse) -> Self {
    resp.catalog_type
  }
}

impl From<PagedCatalogItemResponse> for Vec<CatalogItem> {
  fn from(resp: PagedCatalogItemResponse) -> Self {
    tracing::debug!(
      "Received {} items ({} pages)",
      resp.catalog_items.len(),
      resp.page_count
    );
    resp.catalog_items
  }
}

impl From<CatalogItemResponse> for CatalogItem {
  fn from(resp: CatalogItemResponse) -> Self {
    resp.catalog_item
  }
}
