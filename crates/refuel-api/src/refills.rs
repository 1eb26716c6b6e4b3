//! Handlers for `/refills` endpoints.
//!
//! A refill booking is a CRM task whose subject carries the status as a
//! `"(N) "` prefix. The CRM's own `hs_task_status` only knows open or done,
//! so the prefix is the source of truth.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/refills/book` | 201 + the created task |
//! | `GET`  | `/refills/history` | `?email=`; newest first |
//! | `POST` | `/refills/update` | Body: `{"taskId":"…","cancel":true}` etc. |

use std::slice;

use axum::{
  Json,
  extract::{Query, State},
  http::StatusCode,
};
use chrono::{DateTime, SecondsFormat, Utc};
use refuel_codec::{encode_subject, looks_like_refill, read_vehicle, refill_task};
use refuel_core::{
  payments::PaymentGateway,
  registry::TokenRegistry,
  store::{ObjectStore, ObjectType, Properties, RemoteObject},
  task::{RefillTask, TaskStatus, parse_timestamp, props},
  vehicle::VehicleRecord,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::{
  AppState, EmailQuery, contacts::require_contact, error::ApiError,
  require_email,
};

/// Subject text before the status prefix is added.
const SUBJECT_PREFIX: &str = "Refill request - ";

fn remote_timestamp(at: DateTime<Utc>) -> String {
  at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn task_from_remote(object: &RemoteObject) -> RefillTask {
  refill_task(
    object.id.clone(),
    object.prop(props::SUBJECT).unwrap_or_default(),
    object.prop(props::BODY).unwrap_or_default(),
    object.prop(props::TIMESTAMP).and_then(parse_timestamp),
  )
}

// ─── Book ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookBody {
  pub email:            Option<String>,
  pub service_location: Option<String>,
  /// RFC 3339. Anything else books "now".
  pub scheduled_at:     Option<String>,
  pub vehicle:          Option<Value>,
}

/// Task body shown to the operations team.
fn booking_body(
  location: &str,
  scheduled_at: Option<&str>,
  vehicle: Option<&VehicleRecord>,
  label: &str,
) -> String {
  let mut lines = vec![format!("Service location: {location}")];
  if let Some(at) = scheduled_at {
    lines.push(format!("Scheduled for: {at}"));
  }
  lines.push(format!("Vehicle: {label}"));
  if let Some(v) = vehicle {
    if !v.color.trim().is_empty() {
      lines.push(format!("Color: {}", v.color.trim()));
    }
    if !v.license_plate.trim().is_empty() {
      lines.push(format!("License plate: {}", v.license_plate.trim()));
    }
  }
  lines.join("\n")
}

/// `POST /refills/book`
pub async fn book<S, P, R>(
  State(state): State<AppState<S, P, R>>,
  Json(body): Json<BookBody>,
) -> Result<(StatusCode, Json<RefillTask>), ApiError>
where
  S: ObjectStore,
  P: PaymentGateway,
  R: TokenRegistry,
{
  let email = require_email(body.email.as_deref())?;
  let location = body
    .service_location
    .as_deref()
    .map(str::trim)
    .filter(|l| !l.is_empty())
    .ok_or_else(|| ApiError::BadRequest("serviceLocation is required".into()))?;

  let scheduled_at = body
    .scheduled_at
    .as_deref()
    .map(str::trim)
    .filter(|s| !s.is_empty());
  let at = scheduled_at
    .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
    .map_or_else(Utc::now, |dt| dt.with_timezone(&Utc));

  let vehicle = match &body.vehicle {
    None | Some(Value::Null) => None,
    Some(value) => Some(read_vehicle(value).ok_or_else(|| {
      ApiError::BadRequest("vehicle must be an object".into())
    })?),
  };

  let label = vehicle
    .as_ref()
    .map(VehicleRecord::label)
    .filter(|l| !l.is_empty())
    .unwrap_or_else(|| "Vehicle".to_owned());
  let subject =
    encode_subject(TaskStatus::InProgress, &format!("{SUBJECT_PREFIX}{label}"));
  let task_body = booking_body(location, scheduled_at, vehicle.as_ref(), &label);

  let store = &*state.store;
  let contact = require_contact(store, email).await?;

  let mut properties = Properties::new();
  properties.insert(props::SUBJECT.to_owned(), subject.clone());
  properties.insert(props::BODY.to_owned(), task_body.clone());
  properties.insert(props::TIMESTAMP.to_owned(), remote_timestamp(at));
  properties.insert(
    props::STATUS.to_owned(),
    TaskStatus::InProgress.remote_status().to_owned(),
  );

  let task_id = store
    .create(ObjectType::Tasks, properties)
    .await
    .map_err(ApiError::remote)?;
  store
    .associate(
      ObjectType::Tasks,
      task_id.clone(),
      ObjectType::Contacts,
      contact.id.clone(),
    )
    .await
    .map_err(ApiError::remote)?;

  info!(task_id = %task_id, contact_id = %contact.id, "refill booked");
  let task = refill_task(task_id, &subject, &task_body, Some(at));
  Ok((StatusCode::CREATED, Json(task)))
}

// ─── History ──────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct RefillHistory {
  pub refills: Vec<RefillTask>,
}

/// `GET /refills/history?email=…`
pub async fn history<S, P, R>(
  State(state): State<AppState<S, P, R>>,
  Query(query): Query<EmailQuery>,
) -> Result<Json<RefillHistory>, ApiError>
where
  S: ObjectStore,
  P: PaymentGateway,
  R: TokenRegistry,
{
  let email = require_email(query.email.as_deref())?;
  let store = &*state.store;
  let contact = require_contact(store, email).await?;

  let ids = store
    .list_associations(ObjectType::Contacts, contact.id, ObjectType::Tasks)
    .await
    .map_err(ApiError::remote)?;
  let objects = store
    .batch_read(ObjectType::Tasks, &ids, props::ALL)
    .await
    .map_err(ApiError::remote)?;

  let mut refills: Vec<RefillTask> = objects
    .iter()
    .map(task_from_remote)
    .filter(|t| looks_like_refill(&t.subject, &t.raw_subject))
    .collect();
  // Newest first; `None` sorts below every timestamp so undated tasks go last.
  refills.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

  Ok(Json(RefillHistory { refills }))
}

// ─── Update ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBody {
  pub task_id: Option<String>,
  pub subject: Option<String>,
  pub body:    Option<String>,
  #[serde(default)]
  pub cancel:  bool,
  /// `in_progress`, `completed`, `canceled`, or a bare code.
  pub status:  Option<String>,
}

/// `POST /refills/update`
pub async fn update<S, P, R>(
  State(state): State<AppState<S, P, R>>,
  Json(body): Json<UpdateBody>,
) -> Result<Json<RefillTask>, ApiError>
where
  S: ObjectStore,
  P: PaymentGateway,
  R: TokenRegistry,
{
  let task_id = body
    .task_id
    .as_deref()
    .map(str::trim)
    .filter(|id| !id.is_empty())
    .ok_or_else(|| ApiError::BadRequest("taskId is required".into()))?
    .to_owned();
  let requested = body
    .status
    .as_deref()
    .map(str::parse::<TaskStatus>)
    .transpose()
    .map_err(|e| ApiError::BadRequest(e.to_string()))?;

  let store = &*state.store;
  let current = store
    .batch_read(ObjectType::Tasks, slice::from_ref(&task_id), props::ALL)
    .await
    .map_err(ApiError::remote)?
    .into_iter()
    .next()
    .map(|object| task_from_remote(&object))
    .ok_or_else(|| ApiError::NotFound(format!("task {task_id} not found")))?;

  let status = if body.cancel {
    TaskStatus::Canceled
  } else {
    requested.unwrap_or(current.status)
  };
  let clean = body
    .subject
    .as_deref()
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .unwrap_or(current.subject.as_str());
  let subject = encode_subject(status, clean);

  let mut properties = Properties::new();
  properties.insert(props::SUBJECT.to_owned(), subject.clone());
  properties.insert(props::STATUS.to_owned(), status.remote_status().to_owned());
  if let Some(text) = &body.body {
    properties.insert(props::BODY.to_owned(), text.clone());
  }

  store
    .patch(ObjectType::Tasks, task_id.clone(), properties)
    .await
    .map_err(ApiError::remote)?;

  info!(task_id = %task_id, status = %status, "refill updated");
  let task_body = body.body.as_deref().unwrap_or(current.body.as_str());
  Ok(Json(refill_task(task_id, &subject, task_body, current.timestamp)))
}
