use color_eyre::{eyre::eyre, Result};
use reqwest::header::CONTENT_TYPE;
use reqwest::RequestBuilder;
use serde::{de::DeserializeOwned, Serialize};
use std::fmt::Display;
use std::time::Instant;

use super::json;
use crate::telemetry::{DependencyRecord, HttpMethod, Telemetry};

/// JSON transport against the catalog API.
///
/// Network failures and non-success statuses come back as `Ok(None)`. Only a
/// body that cannot be (de)serialized is an error. Every attempt emits one
/// dependency record.
#[derive(Clone)]
pub struct HttpService {
  client: reqwest::Client,
  api_base: String,
  telemetry: Telemetry,
}

impl HttpService {
  pub fn new(api_base: impl Into<String>, telemetry: Telemetry) -> Self {
    Self {
      client: reqwest::Client::new(),
      api_base: api_base.into(),
      telemetry,
    }
  }

  pub fn telemetry(&self) -> &Telemetry {
    &self.telemetry
  }

  pub async fn get<T: DeserializeOwned>(&self, uri: &str) -> Result<Option<T>> {
    let request = self.client.get(self.url(uri));
    self.execute(HttpMethod::Get, uri, request).await
  }

  pub async fn post<T, B>(&self, uri: &str, body: &B) -> Result<Option<T>>
  where
    T: DeserializeOwned,
    B: Serialize + ?Sized,
  {
    let request = with_json(self.client.post(self.url(uri)), body)?;
    self.execute(HttpMethod::Post, uri, request).await
  }

  pub async fn put<T, B>(&self, uri: &str, body: &B) -> Result<Option<T>>
  where
    T: DeserializeOwned,
    B: Serialize + ?Sized,
  {
    let request = with_json(self.client.put(self.url(uri)), body)?;
    self.execute(HttpMethod::Put, uri, request).await
  }

  pub async fn delete<T: DeserializeOwned>(&self, uri: &str, id: impl Display) -> Result<Option<T>> {
    let url = format!("{}/{}", self.url(uri), id);
    let request = self.client.delete(url);
    self.execute(HttpMethod::Delete, uri, request).await
  }

  /// Join base and path with exactly one `/` between them.
  fn url(&self, uri: &str) -> String {
    format!(
      "{}/{}",
      self.api_base.trim_end_matches('/'),
      uri.trim_start_matches('/')
    )
  }

  async fn execute<T: DeserializeOwned>(
    &self,
    method: HttpMethod,
    uri: &str,
    request: RequestBuilder,
  ) -> Result<Option<T>> {
    let timer = Instant::now();

    let response = match request.send().await {
      Ok(response) => response,
      Err(e) => {
        tracing::warn!("{} {} failed: {}", method, uri, e);
        self.track(method, uri, None, timer);
        return Ok(None);
      }
    };

    let status = response.status();
    if !status.is_success() {
      tracing::warn!("{} {} returned {}", method, uri, status);
      self.track(method, uri, Some(status.as_u16()), timer);
      return Ok(None);
    }

    let body = response.bytes().await;
    self.track(method, uri, Some(status.as_u16()), timer);

    let body = match body {
      Ok(body) => body,
      Err(e) => {
        tracing::warn!("{} {} body could not be read: {}", method, uri, e);
        return Ok(None);
      }
    };

    let value = json::decode(&body)
      .map_err(|e| eyre!("Failed to parse response from {} {}: {}", method, uri, e))?;

    Ok(Some(value))
  }

  fn track(&self, method: HttpMethod, uri: &str, status: Option<u16>, timer: Instant) {
    self.telemetry.track(DependencyRecord::new(
      method,
      &self.api_base,
      uri,
      status,
      timer.elapsed(),
    ));
  }
}

fn with_json<B: Serialize + ?Sized>(request: RequestBuilder, body: &B) -> Result<RequestBuilder> {
  let bytes = serde_json::to_vec(body).map_err(|e| eyre!("Failed to serialize request body: {}", e))?;

  Ok(
    request
      .header(CONTENT_TYPE, "application/json; charset=utf-8")
      .body(bytes),
  )
}
