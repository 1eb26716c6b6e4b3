//! Codec for the records this service hides inside CRM text fields.
//!
//! Two encodings live here:
//!
//! - vehicles, stored as JSON in note bodies and recovered from whichever
//!   historical format the note was written in;
//! - task status, stored as a `"(N) "` prefix on task subjects.
//!
//! Pure synchronous; no HTTP or database dependencies.
//!
//! # Quick start
//!
//! ```no_run
//! use refuel_codec::{decode, encode};
//! use refuel_core::vehicle::VehicleRecord;
//!
//! let text = encode(&VehicleRecord {
//!   make: "Honda".into(),
//!   model: "Civic".into(),
//!   ..Default::default()
//! });
//! assert_eq!(decode(&text)[0].name, "Honda Civic");
//! ```

mod decode;
mod encode;
mod html;
mod normalize;
mod status;

pub use decode::Decoded;
use refuel_core::vehicle::VehicleRecord;
use serde_json::Value;
pub use status::{
  ParsedStatus, encode_subject, looks_like_refill, parse_status, refill_task,
};

// ─── Public API ──────────────────────────────────────────────────────────────

/// Encode `record` as the JSON text stored in a note body.
///
/// The record is canonicalised first (fields trimmed, `name` derived when
/// empty).
pub fn encode(record: &VehicleRecord) -> String { encode::encode(record) }

/// Every vehicle recoverable from a note body.
///
/// An empty list means the text holds no vehicle. This never fails: a note
/// that is not a vehicle must not break the listing of the others.
pub fn decode(text: &str) -> Vec<VehicleRecord> {
  decode::decode(text)
    .map(|d| d.records)
    .unwrap_or_default()
}

/// The first vehicle in a note body, if any.
pub fn decode_one(text: &str) -> Option<VehicleRecord> {
  decode(text).into_iter().next()
}

/// Like [`decode`], but also reports which fallback strategy succeeded.
pub fn decode_detailed(text: &str) -> Option<Decoded> { decode::decode(text) }

/// One client-supplied vehicle object, with key aliases resolved the way
/// [`decode`] resolves them.
///
/// No acceptance threshold and no canonicalisation: callers decide what to
/// reject. `None` unless `value` is a JSON object.
pub fn read_vehicle(value: &Value) -> Option<VehicleRecord> {
  normalize::read_object(value)
}

// ─── Round-trip and acceptance tests ─────────────────────────────────────────
