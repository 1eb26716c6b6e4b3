//! Server configuration: `config.toml` overlaid with `REFUEL_*` environment
//! variables.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use anyhow::Context as _;
use serde::Deserialize;

/// Runtime server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                 String,
  #[serde(default = "default_port")]
  pub port:                 u16,
  #[serde(default = "default_crm_base_url")]
  pub crm_base_url:         String,
  pub crm_token:            String,
  #[serde(default = "default_payments_base_url")]
  pub payments_base_url:    String,
  pub payments_secret_key:  String,
  #[serde(default = "default_token_store_path")]
  pub token_store_path:     PathBuf,
  #[serde(default = "default_currency")]
  pub default_currency:     String,
  #[serde(default)]
  pub portal_return_url:    String,
  #[serde(default = "default_request_timeout_secs")]
  pub request_timeout_secs: u64,
}

fn default_host() -> String { "0.0.0.0".to_owned() }
fn default_port() -> u16 { 8080 }
fn default_crm_base_url() -> String { "https://api.hubapi.com".to_owned() }
fn default_payments_base_url() -> String { "https://api.stripe.com".to_owned() }
fn default_token_store_path() -> PathBuf {
  PathBuf::from("~/.local/share/refuel/tokens.db")
}
fn default_currency() -> String { "usd".to_owned() }
fn default_request_timeout_secs() -> u64 { 30 }

impl ServerConfig {
  /// Read `path` (optional) and the `REFUEL_*` environment.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("REFUEL"))
      .build()
      .context("failed to read config file")?
      .try_deserialize()
      .context("failed to deserialise ServerConfig")
  }

  pub fn request_timeout(&self) -> Duration {
    Duration::from_secs(self.request_timeout_secs)
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
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

#[cfg(test)]
mod tests {
  use super::*;

  fn write_config(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir()
      .join(format!("refuel-{}-{name}.toml", std::process::id()));
    std::fs::write(&path, contents).unwrap();
    path
  }

  #[test]
  fn defaults_fill_optional_fields() {
    let path = write_config(
      "minimal",
      "crm_token = \"pat-123\"\npayments_secret_key = \"sk_test\"\n",
    );
    let cfg = ServerConfig::load(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(cfg.crm_token, "pat-123");
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.default_currency, "usd");
    assert_eq!(cfg.request_timeout(), Duration::from_secs(30));
    assert_eq!(cfg.address(), "0.0.0.0:8080");
    assert!(cfg.portal_return_url.is_empty());
  }

  #[test]
  fn file_values_override_defaults() {
    let path = write_config(
      "full",
      r#"
host = "127.0.0.1"
port = 9000
crm_token = "pat-123"
payments_secret_key = "sk_test"
default_currency = "eur"
request_timeout_secs = 5
token_store_path = "/var/lib/refuel/tokens.db"
"#,
    );
    let cfg = ServerConfig::load(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(cfg.address(), "127.0.0.1:9000");
    assert_eq!(cfg.default_currency, "eur");
    assert_eq!(cfg.request_timeout(), Duration::from_secs(5));
    assert_eq!(
      cfg.token_store_path,
      PathBuf::from("/var/lib/refuel/tokens.db")
    );
  }

  #[test]
  fn missing_secrets_fail() {
    let path = write_config("empty", "port = 9000\n");
    let result = ServerConfig::load(&path);
    std::fs::remove_file(&path).ok();
    assert!(result.is_err());
  }

  #[test]
  fn tilde_expanded_against_home() {
    let Ok(home) = std::env::var("HOME") else {
      return;
    };
    assert_eq!(
      expand_tilde(Path::new("~/tokens.db")),
      PathBuf::from(home).join("tokens.db")
    );
    assert_eq!(
      expand_tilde(Path::new("/abs/tokens.db")),
      PathBuf::from("/abs/tokens.db")
    );
  }
}
