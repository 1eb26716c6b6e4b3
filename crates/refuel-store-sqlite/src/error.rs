//! Error type for `refuel-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  /// Keys and values are opaque but must not be blank.
  #[error("empty {0}")]
  Empty(&'static str),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
