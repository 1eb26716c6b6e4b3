//! Error types for `refuel-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown task status code: {0:?}")]
  UnknownStatusCode(String),

  #[error("unknown object type: {0:?}")]
  UnknownObjectType(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
