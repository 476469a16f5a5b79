//! Configuration loader and validator for the reading inbox.
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::docs::append::{BulletPreset, LayoutPolicy};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Root configuration struct mirroring the YAML schema.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    pub app: App,
    #[serde(default)]
    pub fetch: Fetch,
    /// Only `append` and `read-count` need these; see [`Config::require_google`].
    #[serde(default)]
    pub google: Google,
}

/// App-level settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct App {
    pub data_dir: String,
}

/// Page fetch settings used when extracting metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Fetch {
    pub user_agent: String,
    pub timeout_ms: u64,
}

impl Default for Fetch {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (compatible; link-inbox/1.0)".into(),
            timeout_ms: 10_000,
        }
    }
}

/// Google Docs target document and append layout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Google {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub document_id: String,
    #[serde(default)]
    pub layout: LayoutPolicy,
    #[serde(default)]
    pub bullet_preset: BulletPreset,
    #[serde(default = "default_read_count_ttl_ms")]
    pub read_count_ttl_ms: u64,
}

fn default_read_count_ttl_ms() -> u64 {
    5_000
}

impl Default for Google {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            document_id: String::new(),
            layout: LayoutPolicy::default(),
            bullet_preset: BulletPreset::default(),
            read_count_ttl_ms: default_read_count_ttl_ms(),
        }
    }
}

impl Config {
    /// Ensure required directories exist (creates `app.data_dir` if missing).
    pub fn ensure_dirs(&self) -> Result<(), std::io::Error> {
        if self.app.data_dir.trim().is_empty() {
            return Ok(());
        }
        fs::create_dir_all(self.resolved_data_dir())
    }

    /// `app.data_dir` with a leading `~/` expanded against `$HOME`.
    pub fn resolved_data_dir(&self) -> String {
        let dir = self.app.data_dir.trim();
        if let Some(rest) = dir.strip_prefix("~/") {
            if let Ok(home) = std::env::var("HOME") {
                return format!("{}/{}", home.trim_end_matches('/'), rest);
            }
        }
        dir.to_string()
    }

    /// Default SQLite location inside the data directory.
    pub fn default_database_url(&self) -> String {
        format!("sqlite://{}/inbox.db", self.resolved_data_dir())
    }

    /// Google settings for commands that talk to the document. Link-only
    /// commands never call this, so they run without credentials.
    pub fn require_google(&self) -> Result<&Google, ConfigError> {
        if self.google.access_token.trim().is_empty() {
            return Err(ConfigError::Invalid("google.access_token must be non-empty"));
        }
        if self.google.document_id.trim().is_empty() {
            return Err(ConfigError::Invalid("google.document_id must be non-empty"));
        }
        Ok(&self.google)
    }
}

/// Load configuration from a YAML file and validate it.
/// - If `path` is None, uses `config.yaml` in the current working directory.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or_else(|| Path::new("config.yaml"));
    let content = fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&content)?;
    validate(&cfg)?;
    Ok(cfg)
}

/// Validate a configuration instance.
fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.app.data_dir.trim().is_empty() {
        return Err(ConfigError::Invalid("app.data_dir must be non-empty"));
    }

    if cfg.fetch.user_agent.trim().is_empty() {
        return Err(ConfigError::Invalid("fetch.user_agent must be non-empty"));
    }
    if cfg.fetch.timeout_ms == 0 {
        return Err(ConfigError::Invalid("fetch.timeout_ms must be > 0"));
    }

    // google.* is checked by require_google; read_count_ttl_ms of 0 disables caching

    Ok(())
}

/// Returns the example YAML content.
pub fn example() -> &'static str {
    r#"app:
  data_dir: "./data"

fetch:
  user_agent: "Mozilla/5.0 (compatible; link-inbox/1.0)"
  timeout_ms: 10000

google:
  access_token: "YOUR_GOOGLE_OAUTH_ACCESS_TOKEN"
  document_id: "GOOGLE_DOC_ID"
  # single_paragraph: title, summary and url share one checkbox paragraph
  # per_line: only the title line carries the checkbox
  layout: single_paragraph
  bullet_preset: BULLET_CHECKBOX
  read_count_ttl_ms: 5000
"#
}
