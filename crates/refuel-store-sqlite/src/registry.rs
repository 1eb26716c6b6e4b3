//! [`SqliteTokenRegistry`]: the SQLite implementation of [`TokenRegistry`].

use std::{collections::BTreeSet, path::Path};

use chrono::Utc;
use refuel_core::registry::TokenRegistry;
use tracing::debug;

use crate::{Error, Result, schema::SCHEMA};

/// Device tokens keyed by customer email, persisted in one SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteTokenRegistry {
  conn: tokio_rusqlite::Connection,
}

impl SqliteTokenRegistry {
  /// Open (or create) the registry at `path`, creating parent directories.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
      && !parent.as_os_str().is_empty()
    {
      std::fs::create_dir_all(parent)?;
    }

    let conn = tokio_rusqlite::Connection::open(path).await?;
    let registry = Self { conn };
    registry.init_schema().await?;
    Ok(registry)
  }

  /// Open an in-memory registry, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let registry = Self { conn };
    registry.init_schema().await?;
    Ok(registry)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

impl TokenRegistry for SqliteTokenRegistry {
  type Error = Error;

  async fn get<'a>(&'a self, key: &'a str) -> Result<BTreeSet<String>> {
    let key = key.to_owned();
    let values = self
      .conn
      .call(move |conn| {
        let mut stmt =
          conn.prepare("SELECT value FROM device_tokens WHERE key = ?1")?;
        let values = stmt
          .query_map(rusqlite::params![key], |r| r.get::<_, String>(0))?
          .collect::<rusqlite::Result<BTreeSet<_>>>()?;
        Ok(values)
      })
      .await?;
    Ok(values)
  }

  async fn add<'a>(&'a self, key: &'a str, value: &'a str) -> Result<()> {
    if key.trim().is_empty() {
      return Err(Error::Empty("key"));
    }
    if value.trim().is_empty() {
      return Err(Error::Empty("value"));
    }

    let key = key.to_owned();
    let value = value.to_owned();
    let now = Utc::now().to_rfc3339();
    let inserted = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "INSERT OR IGNORE INTO device_tokens (key, value, created_at)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![key, value, now],
        )?;
        Ok(n)
      })
      .await?;

    debug!(inserted, "device token registered");
    Ok(())
  }
}
