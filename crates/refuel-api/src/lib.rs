//! JSON REST API for the refuel iOS app.
//!
//! Exposes an axum [`Router`] backed by any [`ObjectStore`] (the CRM), any
//! [`PaymentGateway`] and any [`TokenRegistry`]. TLS, auth and transport
//! concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = refuel_api::router(state).layer(TraceLayer::new_for_http());
//! ```

pub mod contacts;
pub mod devices;
pub mod error;
pub mod payments;
pub mod refills;
pub mod vehicles;

use std::sync::Arc;

use axum::{
  Json, Router,
  routing::{get, post},
};
use refuel_core::{
  payments::PaymentGateway, registry::TokenRegistry, store::ObjectStore,
};
use serde_json::{Value, json};

pub use error::ApiError;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Handler-level settings, taken from the server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  /// Currency used when a payment request does not name one.
  pub default_currency:  String,
  /// Where the billing portal sends the user back to by default.
  pub portal_return_url: String,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      default_currency:  "usd".to_owned(),
      portal_return_url: String::new(),
    }
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Clients and settings every handler reaches through [`axum::extract::State`].
pub struct AppState<S, P, R> {
  pub store:    Arc<S>,
  pub payments: Arc<P>,
  pub tokens:   Arc<R>,
  pub config:   Arc<ApiConfig>,
}

impl<S, P, R> Clone for AppState<S, P, R> {
  fn clone(&self) -> Self {
    Self {
      store:    self.store.clone(),
      payments: self.payments.clone(),
      tokens:   self.tokens.clone(),
      config:   self.config.clone(),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the API router for `state`.
pub fn router<S, P, R>(state: AppState<S, P, R>) -> Router
where
  S: ObjectStore + 'static,
  P: PaymentGateway + 'static,
  R: TokenRegistry + 'static,
{
  Router::new()
    .route("/health", get(health))
    // Vehicles
    .route("/vehicles", get(vehicles::list::<S, P, R>))
    .route("/vehicles/sync", post(vehicles::sync::<S, P, R>))
    // Contacts
    .route("/contacts", post(contacts::upsert::<S, P, R>))
    .route("/contacts/status", get(contacts::status::<S, P, R>))
    // Refills
    .route("/refills/book", post(refills::book::<S, P, R>))
    .route("/refills/history", get(refills::history::<S, P, R>))
    .route("/refills/update", post(refills::update::<S, P, R>))
    // Payments
    .route("/payments/customer", post(payments::customer::<S, P, R>))
    .route("/payments/intent", post(payments::intent::<S, P, R>))
    .route("/payments/setup-intent", post(payments::setup_intent::<S, P, R>))
    .route("/payments/portal", post(payments::portal::<S, P, R>))
    // Devices
    .route(
      "/devices",
      get(devices::list::<S, P, R>).post(devices::register::<S, P, R>),
    )
    .with_state(state)
}

/// `GET /health`
async fn health() -> Json<Value> { Json(json!({ "status": "ok" })) }

// ─── Shared request pieces ────────────────────────────────────────────────────

/// `?email=` query used by the read endpoints.
#[derive(Debug, serde::Deserialize)]
pub struct EmailQuery {
  pub email: Option<String>,
}

/// The trimmed email, or 400 when it is missing or blank.
pub(crate) fn require_email(email: Option<&str>) -> Result<&str, ApiError> {
  match email.map(str::trim) {
    Some(e) if !e.is_empty() => Ok(e),
    _ => Err(ApiError::BadRequest("email is required".into())),
  }
}
