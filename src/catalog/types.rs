//! Catalog entities as exchanged with the API.
//!
//! Fields serialize in camelCase. Deserialization runs on case-folded keys
//! (see `http::json`), hence the lowercase deserialize names.

use serde::{Deserialize, Serialize};

/// Catalog brand
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct CatalogBrand {
  pub id: i32,
  pub name: String,
}

/// Catalog type (product category)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct CatalogType {
  pub id: i32,
  pub name: String,
}

/// Catalog item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct CatalogItem {
  pub id: i32,
  pub name: String,
  #[serde(default)]
  pub description: Option<String>,
  pub price: f64,
  #[serde(default, rename(deserialize = "pictureuri"))]
  pub picture_uri: Option<String>,
  #[serde(rename(deserialize = "catalogbrandid"))]
  pub catalog_brand_id: i32,
  #[serde(rename(deserialize = "catalogtypeid"))]
  pub catalog_type_id: i32,
}

/// Item together with the display names of its brand and type
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItemView {
  #[serde(flatten)]
  pub item: CatalogItem,
  pub catalog_brand: Option<String>,
  pub catalog_type: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCatalogBrandRequest {
  pub name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCatalogTypeRequest {
  pub name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCatalogItemRequest {
  pub catalog_brand_id: i32,
  pub catalog_type_id: i32,
  pub name: String,
  pub description: Option<String>,
  pub price: f64,
  pub picture_uri: Option<String>,
}

/// Outcome reported by a delete
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteResponse {
  pub status: String,
}
