//! Turn parsed JSON into canonical [`VehicleRecord`]s.
//!
//! Historical note bodies used different key spellings for the licence
//! plate and sometimes numbers for the year. Everything funnels through
//! [`normalize`], which also applies the acceptance threshold.

use refuel_core::vehicle::{ACCEPTANCE_THRESHOLD, VehicleRecord};
use serde_json::{Map, Value};

const NAME_KEYS: &[&str] = &["name"];
const MAKE_KEYS: &[&str] = &["make"];
const MODEL_KEYS: &[&str] = &["model"];
const YEAR_KEYS: &[&str] = &["year"];
const COLOR_KEYS: &[&str] = &["color"];
const PLATE_KEYS: &[&str] =
  &["licensePlate", "license_plate", "plate", "license", "lic"];

/// Key of the wrapper object `{ "vehicles": [...] }`.
const WRAPPER_KEY: &str = "vehicles";

/// Every accepted record in `value`.
///
/// Arrays and `{ vehicles: [...] }` wrappers are containers: each element is
/// normalized on its own and rejected elements are dropped.
pub(crate) fn normalize(value: &Value) -> Vec<VehicleRecord> {
  match value {
    Value::Array(items) => items.iter().flat_map(normalize).collect(),
    Value::Object(map) => match map.get(WRAPPER_KEY) {
      Some(Value::Array(items)) => items.iter().flat_map(normalize).collect(),
      _ => normalize_object(map).into_iter().collect(),
    },
    _ => Vec::new(),
  }
}

/// A single object, or `None` if fewer than [`ACCEPTANCE_THRESHOLD`]
/// recognized fields are truthy.
fn normalize_object(map: &Map<String, Value>) -> Option<VehicleRecord> {
  let record = fields(map);
  (record.populated_fields() >= ACCEPTANCE_THRESHOLD)
    .then(|| record.canonical())
}

/// Alias-resolved fields of `value` with no threshold applied. `None` for
/// anything but an object.
pub(crate) fn read_object(value: &Value) -> Option<VehicleRecord> {
  value.as_object().map(fields)
}

fn fields(map: &Map<String, Value>) -> VehicleRecord {
  let field = |keys: &[&str]| {
    keys
      .iter()
      .find_map(|k| map.get(*k).and_then(truthy_string))
      .unwrap_or_default()
  };

  VehicleRecord {
    name:          field(NAME_KEYS),
    make:          field(MAKE_KEYS),
    model:         field(MODEL_KEYS),
    year:          field(YEAR_KEYS),
    color:         field(COLOR_KEYS),
    license_plate: field(PLATE_KEYS),
  }
}

/// String form of a truthy JSON scalar.
///
/// Blank strings, `0`, `false`, `null`, arrays and objects are not truthy.
fn truthy_string(value: &Value) -> Option<String> {
  match value {
    Value::String(s) => {
      let s = s.trim();
      (!s.is_empty()).then(|| s.to_owned())
    }
    Value::Number(n) => (n.as_f64() != Some(0.0)).then(|| n.to_string()),
    Value::Bool(true) => Some("true".to_owned()),
    _ => None,
  }
}
