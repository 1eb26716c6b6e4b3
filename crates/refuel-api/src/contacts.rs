//! Handlers for `/contacts` endpoints, plus the email → contact lookup every
//! other handler starts from.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/contacts` | Upsert by email; 201 when created |
//! | `GET`  | `/contacts/status` | `?email=`; never 404 |

use axum::{
  Json,
  extract::{Query, State},
  http::StatusCode,
};
use refuel_core::{
  contact::{Contact, ContactInput, props},
  payments::PaymentGateway,
  registry::TokenRegistry,
  store::{FieldFilter, ObjectStore, ObjectType},
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{AppState, EmailQuery, error::ApiError, require_email};

// ─── Lookup ───────────────────────────────────────────────────────────────────

/// The contact whose email is exactly `email`.
pub(crate) async fn find_contact<S: ObjectStore>(
  store: &S,
  email: &str,
) -> Result<Option<Contact>, ApiError> {
  let filters = [FieldFilter::eq(props::EMAIL, email)];
  let found = store
    .search(ObjectType::Contacts, &filters, props::ALL)
    .await
    .map_err(ApiError::remote)?;
  Ok(found.as_ref().map(Contact::from_remote))
}

/// [`find_contact`], with a missing contact as 404.
pub(crate) async fn require_contact<S: ObjectStore>(
  store: &S,
  email: &str,
) -> Result<Contact, ApiError> {
  find_contact(store, email)
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("no contact with email {email}")))
}

// ─── Upsert ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertBody {
  pub email:      Option<String>,
  pub first_name: Option<String>,
  pub last_name:  Option<String>,
  pub phone:      Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpsertResponse {
  pub id:      String,
  pub created: bool,
}

/// Blank strings from the app mean "not provided".
fn provided(value: Option<String>) -> Option<String> {
  value
    .map(|v| v.trim().to_owned())
    .filter(|v| !v.is_empty())
}

/// `POST /contacts`: body: `{"email":"…","firstName":"…",…}`
pub async fn upsert<S, P, R>(
  State(state): State<AppState<S, P, R>>,
  Json(body): Json<UpsertBody>,
) -> Result<(StatusCode, Json<UpsertResponse>), ApiError>
where
  S: ObjectStore,
  P: PaymentGateway,
  R: TokenRegistry,
{
  let email = require_email(body.email.as_deref())?;
  let input = ContactInput {
    email:      email.to_owned(),
    first_name: provided(body.first_name),
    last_name:  provided(body.last_name),
    phone:      provided(body.phone),
  };

  if let Some(existing) = find_contact(&*state.store, email).await? {
    let mut properties = input.to_properties();
    properties.remove(props::EMAIL);
    if !properties.is_empty() {
      state
        .store
        .patch(ObjectType::Contacts, existing.id.clone(), properties)
        .await
        .map_err(ApiError::remote)?;
    }
    info!(contact_id = %existing.id, "contact updated");
    return Ok((
      StatusCode::OK,
      Json(UpsertResponse {
        id:      existing.id,
        created: false,
      }),
    ));
  }

  let id = state
    .store
    .create(ObjectType::Contacts, input.to_properties())
    .await
    .map_err(ApiError::remote)?;
  info!(contact_id = %id, "contact created");
  Ok((StatusCode::CREATED, Json(UpsertResponse { id, created: true })))
}

// ─── Status ───────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
  pub exists:     bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub contact_id: Option<String>,
}

/// `GET /contacts/status?email=…`
pub async fn status<S, P, R>(
  State(state): State<AppState<S, P, R>>,
  Query(query): Query<EmailQuery>,
) -> Result<Json<StatusResponse>, ApiError>
where
  S: ObjectStore,
  P: PaymentGateway,
  R: TokenRegistry,
{
  let email = require_email(query.email.as_deref())?;
  let contact = find_contact(&*state.store, email).await?;
  Ok(Json(StatusResponse {
    exists:     contact.is_some(),
    contact_id: contact.map(|c| c.id),
  }))
}
