use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable overriding `api.base_url`
pub const API_BASE_ENV: &str = "CATALOG_ADMIN_API_BASE";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub api: ApiConfig,
  #[serde(default)]
  pub cache: CacheConfig,
  #[serde(default)]
  pub telemetry: TelemetryConfig,
  #[serde(default)]
  pub local_storage: LocalStorageConfig,
  #[serde(default)]
  pub log: LogConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiConfig {
  /// Base URL every request path is appended to, e.g. "https://localhost:5099/api/"
  pub base_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
  /// Wrap services in the session cache (default: true)
  #[serde(default = "default_true")]
  pub enabled: bool,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self { enabled: true }
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
  #[serde(default)]
  pub enabled: bool,
  /// Endpoint receiving dependency records as JSON. Records are logged when unset.
  pub collector_url: Option<String>,
  #[serde(default = "default_role_name")]
  pub role_name: String,
  #[serde(default = "default_role_instance")]
  pub role_instance: String,
}

impl Default for TelemetryConfig {
  fn default() -> Self {
    Self {
      enabled: false,
      collector_url: None,
      role_name: default_role_name(),
      role_instance: default_role_instance(),
    }
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocalStorageConfig {
  /// SQLite file (default: $XDG_DATA_HOME/catalog-admin/local_storage.db)
  pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogConfig {
  /// Directory for log files (default: $XDG_DATA_HOME/catalog-admin/logs)
  pub directory: Option<PathBuf>,
  /// tracing filter directive, overridden by RUST_LOG
  pub filter: Option<String>,
}

fn default_true() -> bool {
  true
}

fn default_role_name() -> String {
  "SPA".to_string()
}

fn default_role_instance() -> String {
  "catalog-admin".to_string()
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./catalog-admin.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/catalog-admin/config.yaml
  ///
  /// Without a file, defaults apply. `CATALOG_ADMIN_API_BASE` overrides the
  /// configured base URL either way.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    let mut config = match path {
      Some(p) => Self::load_from_path(&p)?,
      None => Self::default(),
    };

    if let Ok(base_url) = std::env::var(API_BASE_ENV) {
      config.api.base_url = Some(base_url);
    }

    Ok(config)
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("catalog-admin.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("catalog-admin").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::from_yaml(&contents).map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn from_yaml(contents: &str) -> Result<Self> {
    serde_yaml::from_str(contents).map_err(|e| eyre!("{}", e))
  }

  /// The validated API base URL.
  ///
  /// A missing or malformed base URL is fatal at startup.
  pub fn api_base(&self) -> Result<&str> {
    let base_url = self
      .api
      .base_url
      .as_deref()
      .filter(|url| !url.trim().is_empty())
      .ok_or_else(|| {
        eyre!(
          "API base URL not configured. Set api.base_url in the config file, \
           pass --api-base, or set {}.",
          API_BASE_ENV
        )
      })?;

    let parsed =
      url::Url::parse(base_url).map_err(|e| eyre!("Invalid API base URL '{}': {}", base_url, e))?;
    if !matches!(parsed.scheme(), "http" | "https") {
      return Err(eyre!(
        "Invalid API base URL '{}': expected an http or https URL",
        base_url
      ));
    }

    Ok(base_url)
  }

  /// Default directory for data files (local storage, logs).
  pub fn data_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join("catalog-admin"))
  }
}
