//! Runtime configuration, read from an optional TOML file layered under
//! `SKILLSWAP_*` environment variables.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use anyhow::Context as _;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:             String,
  #[serde(default = "default_port")]
  pub port:             u16,
  /// SQLite database file. A leading `~/` is expanded.
  #[serde(default = "default_store_path")]
  pub store_path:       PathBuf,
  /// Browser origin allowed to make credentialed cross-origin requests.
  #[serde(default = "default_allowed_origin")]
  pub allowed_origin:   String,
  #[serde(default = "default_session_cookie")]
  pub session_cookie:   String,
  /// Session lifetime in seconds; also sent as the cookie's `Max-Age`.
  #[serde(default = "default_session_ttl_secs")]
  pub session_ttl_secs: u64,
}

fn default_host() -> String { "0.0.0.0".to_owned() }

fn default_port() -> u16 { 5000 }

fn default_store_path() -> PathBuf { PathBuf::from("~/.local/share/skillswap/skillswap.db") }

fn default_allowed_origin() -> String { "http://localhost:5173".to_owned() }

fn default_session_cookie() -> String { "skillswap_session".to_owned() }

fn default_session_ttl_secs() -> u64 { 31 * 24 * 60 * 60 }

impl ServerConfig {
  /// Load from `path` (missing file is fine) plus the environment.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("SKILLSWAP"))
      .build()
      .context("failed to read config file")?;

    settings
      .try_deserialize()
      .context("failed to deserialise ServerConfig")
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn session_ttl(&self) -> Duration { Duration::from_secs(self.session_ttl_secs) }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
