//! Handlers for `/payments` endpoints.
//!
//! Every endpoint resolves the payments customer by email first, creating it
//! on first use, so the app never has to track customer ids itself.

use axum::{Json, extract::State};
use refuel_core::{
  payments::PaymentGateway, registry::TokenRegistry, store::ObjectStore,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{AppState, error::ApiError, require_email};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerBody {
  pub email: Option<String>,
  pub name:  Option<String>,
}

async fn resolve_customer<P: PaymentGateway>(
  payments: &P,
  body: &CustomerBody,
) -> Result<String, ApiError> {
  let email = require_email(body.email.as_deref())?;
  let name = body.name.as_deref().map(str::trim).filter(|n| !n.is_empty());
  payments
    .find_or_create_customer(email, name)
    .await
    .map_err(ApiError::remote)
}

// ─── Customer ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerResponse {
  pub customer_id: String,
}

/// `POST /payments/customer`
pub async fn customer<S, P, R>(
  State(state): State<AppState<S, P, R>>,
  Json(body): Json<CustomerBody>,
) -> Result<Json<CustomerResponse>, ApiError>
where
  S: ObjectStore,
  P: PaymentGateway,
  R: TokenRegistry,
{
  let customer_id = resolve_customer(&*state.payments, &body).await?;
  Ok(Json(CustomerResponse { customer_id }))
}

// ─── Intents ──────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentResponse {
  pub customer_id:   String,
  pub client_secret: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentBody {
  #[serde(flatten)]
  pub customer: CustomerBody,
  /// Minor units (cents for `usd`).
  pub amount:   Option<u64>,
  pub currency: Option<String>,
}

/// `POST /payments/intent`
pub async fn intent<S, P, R>(
  State(state): State<AppState<S, P, R>>,
  Json(body): Json<IntentBody>,
) -> Result<Json<IntentResponse>, ApiError>
where
  S: ObjectStore,
  P: PaymentGateway,
  R: TokenRegistry,
{
  let amount = body
    .amount
    .filter(|a| *a > 0)
    .ok_or_else(|| ApiError::BadRequest("amount must be a positive integer".into()))?;
  let currency = body
    .currency
    .as_deref()
    .map(str::trim)
    .filter(|c| !c.is_empty())
    .unwrap_or(state.config.default_currency.as_str())
    .to_lowercase();

  let customer_id = resolve_customer(&*state.payments, &body.customer).await?;
  let client_secret = state
    .payments
    .create_payment_intent(&customer_id, amount, &currency)
    .await
    .map_err(ApiError::remote)?;

  info!(customer_id = %customer_id, amount, currency = %currency, "payment intent created");
  Ok(Json(IntentResponse {
    customer_id,
    client_secret,
  }))
}

/// `POST /payments/setup-intent`: save a card for later.
pub async fn setup_intent<S, P, R>(
  State(state): State<AppState<S, P, R>>,
  Json(body): Json<CustomerBody>,
) -> Result<Json<IntentResponse>, ApiError>
where
  S: ObjectStore,
  P: PaymentGateway,
  R: TokenRegistry,
{
  let customer_id = resolve_customer(&*state.payments, &body).await?;
  let client_secret = state
    .payments
    .create_setup_intent(&customer_id)
    .await
    .map_err(ApiError::remote)?;
  Ok(Json(IntentResponse {
    customer_id,
    client_secret,
  }))
}

// ─── Portal ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortalBody {
  #[serde(flatten)]
  pub customer:   CustomerBody,
  pub return_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PortalResponse {
  pub url: String,
}

/// `POST /payments/portal`
pub async fn portal<S, P, R>(
  State(state): State<AppState<S, P, R>>,
  Json(body): Json<PortalBody>,
) -> Result<Json<PortalResponse>, ApiError>
where
  S: ObjectStore,
  P: PaymentGateway,
  R: TokenRegistry,
{
  let return_url = body
    .return_url
    .as_deref()
    .map(str::trim)
    .filter(|u| !u.is_empty())
    .or_else(|| Some(state.config.portal_return_url.as_str()).filter(|u| !u.is_empty()))
    .ok_or_else(|| ApiError::BadRequest("returnUrl is required".into()))?
    .to_owned();

  let customer_id = resolve_customer(&*state.payments, &body.customer).await?;
  let url = state
    .payments
    .create_billing_portal_session(&customer_id, &return_url)
    .await
    .map_err(ApiError::remote)?;
  Ok(Json(PortalResponse { url }))
}
