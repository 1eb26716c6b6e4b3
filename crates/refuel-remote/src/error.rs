//! Error type for `refuel-remote`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Connection, TLS, timeout or body-decoding failure.
  #[error("transport error: {0}")]
  Transport(#[from] reqwest::Error),

  /// The remote answered with a non-success status. `body` is the raw
  /// response payload, kept for diagnostics.
  #[error("{request} → {status}: {body}")]
  Http {
    request: String,
    status:  u16,
    body:    String,
  },

  /// The remote answered 2xx but without a field we need.
  #[error("{request}: response missing {field}")]
  MissingField {
    request: String,
    field:   &'static str,
  },
}

impl Error {
  /// The remote's error payload, when there was one.
  pub fn remote_body(&self) -> Option<&str> {
    match self {
      Self::Http { body, .. } => Some(body),
      _ => None,
    }
  }

  pub fn status(&self) -> Option<u16> {
    match self {
      Self::Http { status, .. } => Some(*status),
      Self::Transport(e) => e.status().map(|s| s.as_u16()),
      Self::MissingField { .. } => None,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
