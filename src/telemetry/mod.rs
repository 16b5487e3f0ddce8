//! Dependency tracking for outbound API calls.
//!
//! Every transport call produces one [`DependencyRecord`]. Records are handed
//! to a [`DependencyCollector`] on a background task, so a slow or failing
//! collector never delays or fails the call that produced the record.
//! Pending deliveries are drained by [`Telemetry::shutdown`] before the
//! runtime goes away.

mod collector;
mod record;

use color_eyre::Result;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::config::TelemetryConfig;

pub use collector::{DependencyCollector, HttpCollector, LogCollector};
pub use record::{DependencyRecord, HttpMethod, RoleTags};

/// Handle used by the transport client to emit dependency records.
///
/// A disabled handle drops records without spawning anything.
#[derive(Clone, Default)]
pub struct Telemetry {
  collector: Option<Arc<dyn DependencyCollector>>,
  tags: Option<RoleTags>,
  pending: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl Telemetry {
  pub fn disabled() -> Self {
    Self::default()
  }

  pub fn new(collector: Arc<dyn DependencyCollector>, tags: RoleTags) -> Self {
    Self {
      collector: Some(collector),
      tags: Some(tags),
      pending: Arc::default(),
    }
  }

  /// Build the telemetry handle described by configuration.
  ///
  /// Enabled telemetry without a collector URL logs records instead of
  /// posting them.
  pub fn from_config(config: &TelemetryConfig) -> Result<Self> {
    if !config.enabled {
      return Ok(Self::disabled());
    }

    let tags = RoleTags::new(&config.role_name, &config.role_instance)?;
    let collector: Arc<dyn DependencyCollector> = match &config.collector_url {
      Some(url) => Arc::new(HttpCollector::new(url.clone())),
      None => Arc::new(LogCollector),
    };

    Ok(Self::new(collector, tags))
  }

  pub fn is_enabled(&self) -> bool {
    self.collector.is_some()
  }

  /// Hand a record to the collector without waiting for it.
  pub fn track(&self, mut record: DependencyRecord) {
    let Some(collector) = &self.collector else {
      return;
    };

    if let Some(tags) = &self.tags {
      tags.apply(&mut record);
    }

    let Ok(runtime) = tokio::runtime::Handle::try_current() else {
      tracing::warn!("No async runtime available, dropping dependency record");
      return;
    };

    let collector = Arc::clone(collector);
    let task = runtime.spawn(async move {
      match AssertUnwindSafe(collector.send(&record)).catch_unwind().await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
          tracing::warn!(operation_id = %record.operation_id, "Failed to send dependency record: {}", e)
        }
        Err(_) => {
          tracing::warn!(operation_id = %record.operation_id, "Dependency collector panicked")
        }
      }
    });

    match self.pending.lock() {
      Ok(mut pending) => {
        pending.retain(|task| !task.is_finished());
        pending.push(task);
      }
      Err(_) => tracing::warn!("Telemetry task list poisoned, record will not be drained"),
    }
  }

  /// Wait up to `timeout` for records still in flight.
  ///
  /// Tasks left after the timeout are detached and die with the runtime.
  pub async fn shutdown(&self, timeout: Duration) {
    let tasks = match self.pending.lock() {
      Ok(mut pending) => std::mem::take(&mut *pending),
      Err(_) => return,
    };
    if tasks.is_empty() {
      return;
    }

    let count = tasks.len();
    if tokio::time::timeout(timeout, futures::future::join_all(tasks))
      .await
      .is_err()
    {
      tracing::warn!("Gave up waiting for {} dependency record(s)", count);
    }
  }
}
