use async_trait::async_trait;
use color_eyre::Result;
use std::marker::PhantomData;

use crate::http::HttpService;

use super::entity::CatalogEntity;
use super::types::DeleteResponse;

/// Domain verbs for one catalog entity kind.
///
/// `Ok(None)` means the operation failed or returned nothing. Plain and
/// cached implementations are interchangeable behind this trait.
#[async_trait]
pub trait CatalogService<E: CatalogEntity>: Send + Sync {
  async fn list(&self) -> Result<Option<Vec<E>>>;

  async fn get(&self, id: i32) -> Result<Option<E>>;

  async fn create(&self, request: &E::Create) -> Result<Option<E>>;

  async fn update(&self, entity: &E) -> Result<Option<E>>;

  async fn delete(&self, id: i32) -> Result<Option<DeleteResponse>>;
}

/// Catalog service calling the API directly.
pub struct HttpCatalogService<E> {
  http: HttpService,
  _entity: PhantomData<fn() -> E>,
}

impl<E> HttpCatalogService<E> {
  pub fn new(http: HttpService) -> Self {
    Self {
      http,
      _entity: PhantomData,
    }
  }
}

impl<E> Clone for HttpCatalogService<E> {
  fn clone(&self) -> Self {
    Self::new(self.http.clone())
  }
}

#[async_trait]
impl<E: CatalogEntity> CatalogService<E> for HttpCatalogService<E> {
  async fn list(&self) -> Result<Option<Vec<E>>> {
    let response: Option<E::ListResponse> = self.http.get(E::RESOURCE).await?;
    Ok(response.map(Into::into))
  }

  async fn get(&self, id: i32) -> Result<Option<E>> {
    let uri = format!("{}/{}", E::RESOURCE, id);
    let response: Option<E::Response> = self.http.get(&uri).await?;
    Ok(response.map(Into::into))
  }

  async fn create(&self, request: &E::Create) -> Result<Option<E>> {
    let response: Option<E::Response> = self.http.post(E::RESOURCE, request).await?;
    Ok(response.map(Into::into))
  }

  async fn update(&self, entity: &E) -> Result<Option<E>> {
    let response: Option<E::Response> = self.http.put(E::RESOURCE, entity).await?;
    Ok(response.map(Into::into))
  }

  async fn delete(&self, id: i32) -> Result<Option<DeleteResponse>> {
    self.http.delete(E::RESOURCE, id).await
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::types::{
    CatalogBrand, CatalogItem, CatalogType, CreateCatalogBrandRequest, CreateCatalogItemRequest,
  };
  use crate::telemetry::Telemetry;
  use httpmock::prelude::*;
  use serde_json::json;

  fn service<E>(server: &MockServer) -> HttpCatalogService<E> {
    HttpCatalogService::new(HttpService::new(server.url("/api/"), Telemetry::disabled()))
  }

  #[tokio::test]
  async fn test_list_brands_unwraps_envelope() {
    let server = MockServer::start_async().await;
    server
      .mock_async(|when, then| {
        when.method(GET).path("/api/catalog-brands");
        then
          .status(200)
          .json_body(json!({"catalogBrands": [{"id": 1, "name": "Brand A"}, {"id": 2, "name": "Brand B"}]}));
      })
      .await;

    let brands = service::<CatalogBrand>(&server).list().await.unwrap().unwrap();
    assert_eq!(brands.len(), 2);
    assert_eq!(brands[1].name, "Brand B");
  }

  #[tokio::test]
  async fn test_list_items_reads_paged_envelope() {
    let server = MockServer::start_async().await;
    server
      .mock_async(|when, then| {
        when.method(GET).path("/api/catalog-items");
        then.status(200).json_body(json!({
          "CatalogItems": [{
            "Id": 1,
            "Name": ".NET Bot Black Sweatshirt",
            "Description": ".NET Bot Black Sweatshirt",
            "Price": 19.5,
            "PictureUri": "http://catalogbaseurltobereplaced/images/products/1.png",
            "CatalogTypeId": 2,
            "CatalogBrandId": 2
          }],
          "PageCount": 1
        }));
      })
      .await;

    let items = service::<CatalogItem>(&server).list().await.unwrap().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].catalog_brand_id, 2);
    assert_eq!(items[0].price, 19.5);
    assert!(items[0].picture_uri.is_some());
  }

  #[tokio::test]
  async fn test_get_by_id() {
    let server = MockServer::start_async().await;
    server
      .mock_async(|when, then| {
        when.method(GET).path("/api/catalog-types/3");
        then
          .status(200)
          .json_body(json!({"catalogType": {"id": 3, "name": "USB Memory Stick"}}));
      })
      .await;

    let found = service::<CatalogType>(&server).get(3).await.unwrap().unwrap();
    assert_eq!(found.name, "USB Memory Stick");
  }

  #[tokio::test]
  async fn test_create_posts_request() {
    let server = MockServer::start_async().await;
    let mock = server
      .mock_async(|when, then| {
        when.method(POST).path("/api/catalog-items").json_body(json!({
          "catalogBrandId": 1,
          "catalogTypeId": 2,
          "name": "Mug",
          "description": null,
          "price": 8.5,
          "pictureUri": null
        }));
        then.status(200).json_body(json!({"catalogItem": {
          "id": 13, "name": "Mug", "price": 8.5, "catalogBrandId": 1, "catalogTypeId": 2
        }}));
      })
      .await;

    let request = CreateCatalogItemRequest {
      catalog_brand_id: 1,
      catalog_type_id: 2,
      name: "Mug".to_string(),
      description: None,
      price: 8.5,
      picture_uri: None,
    };
    let created = service::<CatalogItem>(&server).create(&request).await.unwrap().unwrap();

    assert_eq!(created.id, 13);
    mock.assert_async().await;
  }

  #[tokio::test]
  async fn test_update_puts_full_entity() {
    let server = MockServer::start_async().await;
    let mock = server
      .mock_async(|when, then| {
        when
          .method(PUT)
          .path("/api/catalog-brands")
          .json_body(json!({"id": 4, "name": "Renamed"}));
        then
          .status(200)
          .json_body(json!({"catalogBrand": {"id": 4, "name": "Renamed"}}));
      })
      .await;

    let brand = CatalogBrand {
      id: 4,
      name: "Renamed".to_string(),
    };
    let updated = service::<CatalogBrand>(&server).update(&brand).await.unwrap();

    assert_eq!(updated, Some(brand));
    mock.assert_async().await;
  }

  #[tokio::test]
  async fn test_delete_returns_status() {
    let server = MockServer::start_async().await;
    server
      .mock_async(|when, then| {
        when.method(DELETE).path("/api/catalog-items/9");
        then.status(200).json_body(json!({"status": "Deleted"}));
      })
      .await;

    let deleted = service::<CatalogItem>(&server).delete(9).await.unwrap().unwrap();
    assert_eq!(deleted.status, "Deleted");
  }

  #[tokio::test]
  async fn test_failures_pass_through_as_none() {
    let server = MockServer::start_async().await;
    server
      .mock_async(|when, then| {
        when.path_contains("catalog-brands");
        then.status(404);
      })
      .await;

    let brands = service::<CatalogBrand>(&server);
    assert!(brands.list().await.unwrap().is_none());
    assert!(brands.get(1).await.unwrap().is_none());
    assert!(brands
      .create(&CreateCatalogBrandRequest {
        name: "X".to_string()
      })
      .await
      .unwrap()
      .is_none());
    assert!(brands.delete(1).await.unwrap().is_none());
  }
}
