//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Handler failure, rendered as a JSON `{"error": ...}` body.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  /// The CRM or the payments platform failed.
  #[error("remote error: {0}")]
  Remote(#[source] BoxError),

  /// The device-token registry failed.
  #[error("registry error: {0}")]
  Registry(#[source] BoxError),
}

impl ApiError {
  pub fn remote<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Remote(Box::new(e))
  }

  pub fn registry<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Registry(Box::new(e))
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, body) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, json!({ "error": m })),
      ApiError::BadRequest(m) => {
        (StatusCode::BAD_REQUEST, json!({ "error": m }))
      }
      ApiError::Remote(e) => {
        error!(error = %e, "remote collaborator failed");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          json!({ "error": "remote service error", "details": e.to_string() }),
        )
      }
      ApiError::Registry(e) => {
        error!(error = %e, "token registry failed");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          json!({ "error": "internal error", "details": e.to_string() }),
        )
      }
    };
    (status, Json(body)).into_response()
  }
}
