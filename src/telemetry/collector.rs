use async_trait::async_trait;
use color_eyre::{eyre::eyre, Result};
use reqwest::header::CONTENT_TYPE;

use super::record::DependencyRecord;

/// Destination for dependency records.
#[async_trait]
pub trait DependencyCollector: Send + Sync {
  async fn send(&self, record: &DependencyRecord) -> Result<()>;
}

/// Posts each record as JSON to a collector endpoint.
pub struct HttpCollector {
  client: reqwest::Client,
  endpoint: String,
}

impl HttpCollector {
  pub fn new(endpoint: impl Into<String>) -> Self {
    Self {
      client: reqwest::Client::new(),
      endpoint: endpoint.into(),
    }
  }
}

#[async_trait]
impl DependencyCollector for HttpCollector {
  async fn send(&self, record: &DependencyRecord) -> Result<()> {
    let body =
      serde_json::to_vec(record).map_err(|e| eyre!("Failed to serialize dependency record: {}", e))?;

    let response = self
      .client
      .post(&self.endpoint)
      .header(CONTENT_TYPE, "application/json; charset=utf-8")
      .body(body)
      .send()
      .await
      .map_err(|e| eyre!("Failed to reach collector {}: {}", self.endpoint, e))?;

    if !response.status().is_success() {
      return Err(eyre!(
        "Collector {} rejected record: {}",
        self.endpoint,
        response.status()
      ));
    }

    Ok(())
  }
}

/// Writes records into the tracing log.
pub struct LogCollector;

#[async_trait]
impl DependencyCollector for LogCollector {
  async fn send(&self, record: &DependencyRecord) -> Result<()> {
    tracing::info!(
      target: "dependency",
      operation_id = %record.operation_id,
      method = %record.method,
      target_url = %record.target_url,
      command = %record.command_name,
      status = ?record.status_code,
      success = record.success,
      duration_seconds = record.duration_seconds,
      "dependency call"
    );
    Ok(())
  }
}
