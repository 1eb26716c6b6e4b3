//! Vehicle records: the semi-structured payload stored in CRM note bodies.
//!
//! A vehicle has no identity of its own in the remote store: it exists only
//! as the text body of a note associated with a contact. Every field is kept
//! as a string (a `year` of `"0929"` or `"2019-2021"` must survive untouched).

use serde::{Deserialize, Deserializer, Serialize};

/// Minimum number of non-empty recognized fields before a candidate object is
/// treated as a vehicle rather than coincidental JSON.
pub const ACCEPTANCE_THRESHOLD: usize = 2;

/// Remote property names for the notes that carry vehicles.
pub mod note_props {
  pub const BODY: &str = "hs_note_body";
  /// Required by the CRM when creating a note.
  pub const TIMESTAMP: &str = "hs_timestamp";

  pub const ALL: &[&str] = &[BODY, TIMESTAMP];
}

/// One vehicle associated with a customer.
///
/// Absent fields are always the empty string so the client-facing contract
/// never contains `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VehicleRecord {
  #[serde(deserialize_with = "lenient_string")]
  pub name:          String,
  #[serde(deserialize_with = "lenient_string")]
  pub make:          String,
  #[serde(deserialize_with = "lenient_string")]
  pub model:         String,
  #[serde(deserialize_with = "lenient_string")]
  pub year:          String,
  #[serde(deserialize_with = "lenient_string")]
  pub color:         String,
  #[serde(
    alias = "plate",
    alias = "lic",
    alias = "license",
    alias = "license_plate",
    deserialize_with = "lenient_string"
  )]
  pub license_plate: String,
}

impl VehicleRecord {
  /// `"year make model"`, skipping empty parts.
  pub fn display_name(&self) -> String {
    [&self.year, &self.make, &self.model]
      .iter()
      .map(|s| s.trim())
      .filter(|s| !s.is_empty())
      .collect::<Vec<_>>()
      .join(" ")
  }

  /// The name shown to users: the explicit name, or the derived one.
  pub fn label(&self) -> String {
    let name = self.name.trim();
    if name.is_empty() {
      self.display_name()
    } else {
      name.to_owned()
    }
  }

  /// Trim every field and fill `name` from [`Self::display_name`] when empty.
  ///
  /// This is the form both the encoder writes and the decoder returns.
  pub fn canonical(self) -> Self {
    let mut v = Self {
      name:          self.name.trim().to_owned(),
      make:          self.make.trim().to_owned(),
      model:         self.model.trim().to_owned(),
      year:          self.year.trim().to_owned(),
      color:         self.color.trim().to_owned(),
      license_plate: self.license_plate.trim().to_owned(),
    };
    if v.name.is_empty() {
      v.name = v.display_name();
    }
    v
  }

  /// How many recognized fields carry a non-blank value.
  pub fn populated_fields(&self) -> usize {
    [
      &self.name,
      &self.make,
      &self.model,
      &self.year,
      &self.color,
      &self.license_plate,
    ]
    .iter()
    .filter(|s| !s.trim().is_empty())
    .count()
  }

  pub fn is_acceptable(&self) -> bool {
    self.populated_fields() >= ACCEPTANCE_THRESHOLD
  }
}

/// Accept strings, numbers, booleans and `null` for a string field.
///
/// iOS clients have sent `"year": 2020` as often as `"year": "2020"`.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
  D: Deserializer<'de>,
{
  use serde_json::Value;

  Ok(match Value::deserialize(deserializer)? {
    Value::Null => String::new(),
    Value::String(s) => s,
    Value::Number(n) => n.to_string(),
    Value::Bool(b) => b.to_string(),
    other => other.to_string(),
  })
}
