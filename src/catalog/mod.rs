//! Catalog domain: entities, plain HTTP services and their caching decorators.

mod api_types;
mod cached_service;
mod entity;
mod service;
mod types;

pub use cached_service::CachedCatalogService;
pub use entity::CatalogEntity;
pub use service::{CatalogService, HttpCatalogService};
pub use types::{
  CatalogBrand, CatalogItem, CatalogItemView, CatalogType, CreateCatalogBrandRequest,
  CreateCatalogItemRequest, CreateCatalogTypeRequest,
};
