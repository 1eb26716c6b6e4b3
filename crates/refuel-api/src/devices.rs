//! Handlers for `/devices` endpoints: push-notification tokens per customer.
//!
//! Only registration lives here. Delivery happens elsewhere.

use std::collections::BTreeSet;

use axum::{
  Json,
  extract::{Query, State},
  http::StatusCode,
};
use refuel_core::{
  payments::PaymentGateway, registry::TokenRegistry, store::ObjectStore,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{AppState, EmailQuery, error::ApiError, require_email};

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
  pub email: Option<String>,
  pub token: Option<String>,
}

/// `POST /devices`: body: `{"email":"…","token":"…"}`
pub async fn register<S, P, R>(
  State(state): State<AppState<S, P, R>>,
  Json(body): Json<RegisterBody>,
) -> Result<StatusCode, ApiError>
where
  S: ObjectStore,
  P: PaymentGateway,
  R: TokenRegistry,
{
  let email = require_email(body.email.as_deref())?;
  let token = body
    .token
    .as_deref()
    .map(str::trim)
    .filter(|t| !t.is_empty())
    .ok_or_else(|| ApiError::BadRequest("token is required".into()))?;

  state
    .tokens
    .add(email, token)
    .await
    .map_err(ApiError::registry)?;
  info!("device token registered");
  Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenList {
  pub tokens: BTreeSet<String>,
}

/// `GET /devices?email=…`
pub async fn list<S, P, R>(
  State(state): State<AppState<S, P, R>>,
  Query(query): Query<EmailQuery>,
) -> Result<Json<TokenList>, ApiError>
where
  S: ObjectStore,
  P: PaymentGateway,
  R: TokenRegistry,
{
  let email = require_email(query.email.as_deref())?;
  let tokens = state.tokens.get(email).await.map_err(ApiError::registry)?;
  Ok(Json(TokenList { tokens }))
}
