use chrono::Duration;
use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::cache::CachePolicy;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
  pub trello: TrelloConfig,
  pub sheets: SheetsConfig,
  pub cache: CacheConfig,
  pub output: OutputConfig,
  pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrelloConfig {
  /// Base URL of the Trello REST API
  pub url: String,
  /// Member whose boards are listed ("me" = the token owner)
  pub member: String,
}

impl Default for TrelloConfig {
  fn default() -> Self {
    Self {
      url: "https://api.trello.com/1".to_string(),
      member: "me".to_string(),
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SheetsConfig {
  /// Base URL of the Google Sheets spreadsheets API
  pub url: String,
  /// Tab (sheet) name that holds the movement rows
  pub tab: String,
}

impl Default for SheetsConfig {
  fn default() -> Self {
    Self {
      url: "https://sheets.googleapis.com/v4/spreadsheets".to_string(),
      tab: "Movements".to_string(),
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
  pub enabled: bool,
  /// Cache directory (default: $XDG_CACHE_HOME/cardtrail)
  pub dir: Option<PathBuf>,
  /// Entries older than this are discarded
  pub lifetime_minutes: u32,
  /// Entries older than this are served but refreshed in the background
  pub stale_after_minutes: u32,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      enabled: true,
      dir: None,
      lifetime_minutes: 24 * 60,
      stale_after_minutes: 60,
    }
  }
}

impl CacheConfig {
  pub fn policy(&self) -> CachePolicy {
    CachePolicy::new(
      Duration::minutes(i64::from(self.lifetime_minutes)),
      Duration::minutes(i64::from(self.stale_after_minutes)),
    )
  }

  pub fn resolved_dir(&self) -> Result<PathBuf> {
    match &self.dir {
      Some(dir) => Ok(dir.clone()),
      None => dirs::cache_dir()
        .or_else(|| dirs::home_dir().map(|p| p.join(".cache")))
        .map(|dir| dir.join("cardtrail"))
        .ok_or_else(|| eyre!("Could not determine cache directory")),
    }
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
  /// Local movements file (default: $XDG_DATA_HOME/cardtrail/movements.json)
  pub path: Option<PathBuf>,
}

impl OutputConfig {
  pub fn resolved_path(&self) -> Result<PathBuf> {
    match &self.path {
      Some(path) => Ok(path.clone()),
      None => data_dir().map(|dir| dir.join("movements.json")),
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
  /// Default filter directive when CARDTRAIL_LOG is unset
  pub level: String,
  /// Also write daily-rotated logs under $XDG_DATA_HOME/cardtrail/logs
  pub file: bool,
}

impl Default for LoggingConfig {
  fn default() -> Self {
    Self {
      level: "info".to_string(),
      file: false,
    }
  }
}

/// Per-user data directory for cardtrail.
pub fn data_dir() -> Result<PathBuf> {
  dirs::data_dir()
    .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
    .map(|dir| dir.join("cardtrail"))
    .ok_or_else(|| eyre!("Could not determine data directory"))
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided (must exist)
  /// 2. ./cardtrail.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/cardtrail/config.yaml
  ///
  /// With no file found, defaults are used.
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

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Ok(Self::default()),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("cardtrail.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("cardtrail").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents).map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn parse(contents: &str) -> Result<Self, serde_yaml::Error> {
    // An empty file deserializes as null
    if contents.trim().is_empty() {
      return Ok(Self::default());
    }
    serde_yaml::from_str(contents)
  }
}

/// Credentials for the Trello API.
#[derive(Clone)]
pub struct TrelloCredentials {
  pub key: String,
  pub token: String,
}

impl std::fmt::Debug for TrelloCredentials {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("TrelloCredentials")
      .field("key", &self.key)
      .field("token", &"<redacted>")
      .finish()
  }
}

impl TrelloCredentials {
  /// Read credentials from the environment.
  ///
  /// Checks CARDTRAIL_TRELLO_KEY / CARDTRAIL_TRELLO_TOKEN first, then
  /// TRELLO_API_KEY / TRELLO_TOKEN as fallback.
  pub fn from_env() -> Result<Self> {
    let key = env_with_fallback("CARDTRAIL_TRELLO_KEY", "TRELLO_API_KEY").ok_or_else(|| {
      eyre!("Trello API key not found. Set CARDTRAIL_TRELLO_KEY or TRELLO_API_KEY environment variable.")
    })?;
    let token = env_with_fallback("CARDTRAIL_TRELLO_TOKEN", "TRELLO_TOKEN").ok_or_else(|| {
      eyre!("Trello token not found. Set CARDTRAIL_TRELLO_TOKEN or TRELLO_TOKEN environment variable.")
    })?;
    Ok(Self { key, token })
  }
}

/// Get the Google Sheets OAuth access token from environment variables.
///
/// Checks CARDTRAIL_SHEETS_TOKEN first, then GOOGLE_SHEETS_TOKEN as fallback.
pub fn sheets_token() -> Result<String> {
  env_with_fallback("CARDTRAIL_SHEETS_TOKEN", "GOOGLE_SHEETS_TOKEN").ok_or_else(|| {
    eyre!(
      "Google Sheets token not found. Set CARDTRAIL_SHEETS_TOKEN or GOOGLE_SHEETS_TOKEN environment variable."
    )
  })
}

fn env_with_fallback(primary: &str, fallback: &str) -> Option<String> {
  std::env::var(primary)
    .or_else(|_| std::env::var(fallback))
    .ok()
    .filter(|value| !value.trim().is_empty())
}
