//! Handlers for `/vehicles` endpoints.
//!
//! Vehicles live in the bodies of notes associated with the contact. Notes
//! that do not decode to a vehicle belong to someone else and are never
//! touched.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/vehicles` | `?email=`; 404 if the contact is unknown |
//! | `POST` | `/vehicles/sync` | Body: `{"email":"…","vehicles":[…]}`; replaces the set |

use std::slice;

use axum::{
  Json,
  extract::{Query, State},
};
use chrono::{SecondsFormat, TimeDelta, Utc};
use refuel_codec::{decode_detailed, encode, read_vehicle};
use refuel_core::{
  payments::PaymentGateway,
  registry::TokenRegistry,
  store::{ObjectStore, ObjectType, Properties, RemoteObject},
  task::parse_timestamp,
  vehicle::{ACCEPTANCE_THRESHOLD, VehicleRecord, note_props},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{
  AppState, EmailQuery, contacts::require_contact, error::ApiError,
  require_email,
};

/// Every note associated with `contact_id`, oldest first. Equal timestamps
/// fall back to numeric id order, which is creation order in the CRM.
async fn contact_notes<S: ObjectStore>(
  store: &S,
  contact_id: &str,
) -> Result<Vec<RemoteObject>, ApiError> {
  let ids = store
    .list_associations(
      ObjectType::Contacts,
      contact_id.to_owned(),
      ObjectType::Notes,
    )
    .await
    .map_err(ApiError::remote)?;
  let mut notes = store
    .batch_read(ObjectType::Notes, &ids, note_props::ALL)
    .await
    .map_err(ApiError::remote)?;
  notes.sort_by_cached_key(|n| {
    (
      n.prop(note_props::TIMESTAMP).and_then(parse_timestamp),
      n.id.parse::<u64>().ok(),
      n.id.clone(),
    )
  });
  Ok(notes)
}

fn note_vehicles(note: &RemoteObject) -> Vec<VehicleRecord> {
  let Some(decoded) = note.prop(note_props::BODY).and_then(decode_detailed)
  else {
    return Vec::new();
  };
  debug!(note_id = %note.id, strategy = decoded.strategy, "vehicle note decoded");
  decoded.records
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct VehicleList {
  pub vehicles: Vec<VehicleRecord>,
}

/// `GET /vehicles?email=…`
pub async fn list<S, P, R>(
  State(state): State<AppState<S, P, R>>,
  Query(query): Query<EmailQuery>,
) -> Result<Json<VehicleList>, ApiError>
where
  S: ObjectStore,
  P: PaymentGateway,
  R: TokenRegistry,
{
  let email = require_email(query.email.as_deref())?;
  let contact = require_contact(&*state.store, email).await?;
  let notes = contact_notes(&*state.store, &contact.id).await?;

  let vehicles: Vec<VehicleRecord> = notes.iter().flat_map(note_vehicles).collect();
  debug!(
    contact_id = %contact.id,
    notes = notes.len(),
    vehicles = vehicles.len(),
    "vehicles listed"
  );
  Ok(Json(VehicleList { vehicles }))
}

// ─── Sync ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SyncBody {
  pub email:    Option<String>,
  /// Raw objects; plate aliases are resolved by [`read_vehicle`].
  pub vehicles: Option<Vec<Value>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SyncResponse {
  pub email:    String,
  pub vehicles: Vec<VehicleRecord>,
  /// Old vehicle notes archived.
  pub removed:  usize,
  /// New vehicle notes written.
  pub created:  usize,
}

/// `POST /vehicles/sync`: replace the contact's vehicles with `vehicles`.
///
/// Archive-then-create, not transactional. A failed archive is logged and
/// skipped; a failed create aborts with whatever was written so far.
pub async fn sync<S, P, R>(
  State(state): State<AppState<S, P, R>>,
  Json(body): Json<SyncBody>,
) -> Result<Json<SyncResponse>, ApiError>
where
  S: ObjectStore,
  P: PaymentGateway,
  R: TokenRegistry,
{
  let email = require_email(body.email.as_deref())?.to_owned();
  let submitted = body
    .vehicles
    .ok_or_else(|| ApiError::BadRequest("vehicles is required".into()))?;

  let vehicles = submitted
    .iter()
    .enumerate()
    .map(|(index, value)| {
      read_vehicle(value)
        .filter(VehicleRecord::is_acceptable)
        .map(VehicleRecord::canonical)
        .ok_or_else(|| {
          ApiError::BadRequest(format!(
            "vehicles[{index}] needs at least {ACCEPTANCE_THRESHOLD} of name, \
             make, model, year, color, licensePlate"
          ))
        })
    })
    .collect::<Result<Vec<_>, _>>()?;

  let store = &*state.store;
  let contact = require_contact(store, &email).await?;

  // Archive every note that holds a vehicle, one at a time.
  let mut removed = 0;
  for note in contact_notes(store, &contact.id).await? {
    if note_vehicles(&note).is_empty() {
      continue;
    }
    match store
      .archive(ObjectType::Notes, slice::from_ref(&note.id))
      .await
    {
      Ok(()) => removed += 1,
      Err(e) => {
        warn!(note_id = %note.id, error = %e, "failed to archive vehicle note")
      }
    }
  }

  // One millisecond apart so listing keeps the submitted order.
  let written_at = Utc::now();
  for (offset, vehicle) in (0..).zip(&vehicles) {
    let timestamp = (written_at + TimeDelta::milliseconds(offset))
      .to_rfc3339_opts(SecondsFormat::Millis, true);
    let mut properties = Properties::new();
    properties.insert(note_props::BODY.to_owned(), encode(vehicle));
    properties.insert(note_props::TIMESTAMP.to_owned(), timestamp);

    let note_id = store
      .create(ObjectType::Notes, properties)
      .await
      .map_err(ApiError::remote)?;
    store
      .associate(
        ObjectType::Notes,
        note_id,
        ObjectType::Contacts,
        contact.id.clone(),
      )
      .await
      .map_err(ApiError::remote)?;
  }

  info!(
    contact_id = %contact.id,
    removed,
    created = vehicles.len(),
    "vehicles synced"
  );
  Ok(Json(SyncResponse {
    email,
    created: vehicles.len(),
    vehicles,
    removed,
  }))
}
