//! Refill bookings, stored remotely as CRM tasks.
//!
//! The task's status is not a first-class remote field: it is encoded as a
//! `"(N) "` prefix on the subject line (see `refuel-codec`).

use std::{fmt, str::FromStr};

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Remote property names for tasks.
pub mod props {
  pub const SUBJECT: &str = "hs_task_subject";
  pub const BODY: &str = "hs_task_body";
  pub const TIMESTAMP: &str = "hs_timestamp";
  pub const STATUS: &str = "hs_task_status";

  pub const ALL: &[&str] = &[SUBJECT, BODY, TIMESTAMP, STATUS];
}

// ─── Status ──────────────────────────────────────────────────────────────────

/// Booking status as seen by the client.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
  #[default]
  InProgress,
  Completed,
  Canceled,
}

impl TaskStatus {
  /// The single digit used in the subject prefix.
  pub fn code(self) -> &'static str {
    match self {
      Self::InProgress => "0",
      Self::Completed => "1",
      Self::Canceled => "2",
    }
  }

  pub fn from_code(code: &str) -> Result<Self> {
    match code {
      "0" => Ok(Self::InProgress),
      "1" => Ok(Self::Completed),
      "2" => Ok(Self::Canceled),
      other => Err(Error::UnknownStatusCode(other.to_owned())),
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      Self::InProgress => "in_progress",
      Self::Completed => "completed",
      Self::Canceled => "canceled",
    }
  }

  /// Value written to the remote `hs_task_status` property.
  pub fn remote_status(self) -> &'static str {
    match self {
      Self::InProgress => "NOT_STARTED",
      Self::Completed | Self::Canceled => "COMPLETED",
    }
  }
}

impl fmt::Display for TaskStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}

impl FromStr for TaskStatus {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "in_progress" => Ok(Self::InProgress),
      "completed" => Ok(Self::Completed),
      "canceled" | "cancelled" => Ok(Self::Canceled),
      code => Self::from_code(code),
    }
  }
}

// ─── RefillTask ──────────────────────────────────────────────────────────────

/// One refill booking as returned to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefillTask {
  /// Remote task id.
  pub id:          String,
  /// Subject with the status prefix removed.
  pub subject:     String,
  /// Subject exactly as stored remotely.
  pub raw_subject: String,
  pub status_code: String,
  pub status:      TaskStatus,
  pub body:        String,
  pub timestamp:   Option<DateTime<Utc>>,
}

// ─── Timestamps ──────────────────────────────────────────────────────────────

/// Parse a remote `hs_timestamp` value.
///
/// The CRM returns RFC 3339 strings, but older records hold epoch
/// milliseconds. Anything else is `None`.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
  let raw = raw.trim();
  if raw.is_empty() {
    return None;
  }
  if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
    return Some(dt.with_timezone(&Utc));
  }
  raw
    .parse::<i64>()
    .ok()
    .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
}
