use chrono::{DateTime, Utc};
use color_eyre::{eyre::eyre, Result};
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

/// Logical HTTP verb of an outbound call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HttpMethod {
  Get,
  Post,
  Put,
  Delete,
}

impl fmt::Display for HttpMethod {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      HttpMethod::Get => "Get",
      HttpMethod::Post => "Post",
      HttpMethod::Put => "Put",
      HttpMethod::Delete => "Delete",
    };
    f.write_str(name)
  }
}

/// One outbound call's timing and outcome.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyRecord {
  pub operation_id: String,
  /// Response status, absent when no response was received
  pub status_code: Option<u16>,
  pub target_url: String,
  pub success: bool,
  /// Request path relative to the target URL
  pub command_name: String,
  pub duration_seconds: f64,
  pub method: HttpMethod,
  pub timestamp: DateTime<Utc>,
  pub cloud_role: Option<String>,
  pub cloud_role_instance: Option<String>,
}

impl DependencyRecord {
  pub fn new(
    method: HttpMethod,
    target_url: &str,
    command_name: &str,
    status_code: Option<u16>,
    duration: Duration,
  ) -> Self {
    Self {
      operation_id: Uuid::new_v4().to_string(),
      status_code,
      target_url: target_url.to_string(),
      success: status_code.is_some_and(|code| (200..300).contains(&code)),
      command_name: command_name.to_string(),
      duration_seconds: duration.as_secs_f64(),
      method,
      timestamp: Utc::now(),
      cloud_role: None,
      cloud_role_instance: None,
    }
  }
}

/// Cloud role tags stamped onto every record before it leaves the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleTags {
  role_name: String,
  role_instance: String,
}

impl RoleTags {
  pub fn new(role_name: &str, role_instance: &str) -> Result<Self> {
    if role_name.trim().is_empty() {
      return Err(eyre!("Telemetry role name cannot be empty or whitespace"));
    }

    Ok(Self {
      role_name: role_name.to_string(),
      role_instance: role_instance.to_string(),
    })
  }

  pub fn apply(&self, record: &mut DependencyRecord) {
    record.cloud_role = Some(self.role_name.clone());
    record.cloud_role_instance = Some(self.role_instance.clone());
  }
}
