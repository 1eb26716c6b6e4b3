//! The `ObjectStore` trait: the remote CRM as seen by the rest of the crate.
//!
//! The CRM owns contacts, notes, and tasks and links them through
//! associations. Higher layers (`refuel-api`) depend on this abstraction, not
//! on the HTTP client in `refuel-remote`.

use std::{collections::BTreeMap, fmt, future::Future, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

/// Property values to write on create or patch.
pub type Properties = BTreeMap<String, String>;

// ─── Object types ────────────────────────────────────────────────────────────

/// The remote object types this service touches.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
  Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ObjectType {
  Contacts,
  Notes,
  Tasks,
}

impl ObjectType {
  /// Path segment used by the CRM API.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Contacts => "contacts",
      Self::Notes => "notes",
      Self::Tasks => "tasks",
    }
  }
}

impl fmt::Display for ObjectType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for ObjectType {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "contacts" | "contact" => Ok(Self::Contacts),
      "notes" | "note" => Ok(Self::Notes),
      "tasks" | "task" => Ok(Self::Tasks),
      other => Err(Error::UnknownObjectType(other.to_owned())),
    }
  }
}

// ─── Remote objects ──────────────────────────────────────────────────────────

/// An object as returned by the CRM: an id and a bag of nullable string
/// properties.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteObject {
  pub id:         String,
  #[serde(default)]
  pub properties: BTreeMap<String, Option<String>>,
}

impl RemoteObject {
  pub fn new(id: impl Into<String>) -> Self {
    Self {
      id:         id.into(),
      properties: BTreeMap::new(),
    }
  }

  /// A property value; `None` when absent or null.
  pub fn prop(&self, key: &str) -> Option<&str> {
    self.properties.get(key).and_then(|v| v.as_deref())
  }
}

/// An equality filter for [`ObjectStore::search`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFilter {
  pub property: String,
  pub value:    String,
}

impl FieldFilter {
  pub fn eq(property: impl Into<String>, value: impl Into<String>) -> Self {
    Self {
      property: property.into(),
      value:    value.into(),
    }
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the remote CRM object store.
///
/// No operation is transactional. Callers composing several calls (e.g.
/// archive-then-create) must tolerate partial completion.
///
/// Futures are `Send` so handlers holding an implementation can be spawned
/// onto the tokio runtime.
pub trait ObjectStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Return the first object matching every filter, or `None`.
  fn search<'a>(
    &'a self,
    object_type: ObjectType,
    filters: &'a [FieldFilter],
    properties: &'a [&'a str],
  ) -> impl Future<Output = Result<Option<RemoteObject>, Self::Error>> + Send + 'a;

  /// Read many objects by id. Unknown ids are silently missing from the
  /// result.
  fn batch_read<'a>(
    &'a self,
    object_type: ObjectType,
    ids: &'a [String],
    properties: &'a [&'a str],
  ) -> impl Future<Output = Result<Vec<RemoteObject>, Self::Error>> + Send + 'a;

  /// Create an object and return its id.
  fn create(
    &self,
    object_type: ObjectType,
    properties: Properties,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send + '_;

  /// Overwrite the given properties on an existing object.
  fn patch(
    &self,
    object_type: ObjectType,
    id: String,
    properties: Properties,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Archive (soft-delete) objects by id.
  fn archive<'a>(
    &'a self,
    object_type: ObjectType,
    ids: &'a [String],
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Ids of `related` objects associated with the object `id`.
  fn list_associations(
    &self,
    object_type: ObjectType,
    id: String,
    related: ObjectType,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + '_;

  /// Associate `id` with `related_id` using the default association type.
  fn associate(
    &self,
    object_type: ObjectType,
    id: String,
    related: ObjectType,
    related_id: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn object_type_parses_singular_and_plural() {
    assert_eq!("note".parse::<ObjectType>().unwrap(), ObjectType::Notes);
    assert_eq!("tasks".parse::<ObjectType>().unwrap(), ObjectType::Tasks);
    assert!("deals".parse::<ObjectType>().is_err());
  }

  #[test]
  fn remote_object_null_properties() {
    let object: RemoteObject = serde_json::from_str(
      r#"{"id":"7","properties":{"hs_note_body":null,"hs_timestamp":"x"}}"#,
    )
    .unwrap();
    assert_eq!(object.prop("hs_note_body"), None);
    assert_eq!(object.prop("hs_timestamp"), Some("x"));
    assert_eq!(object.prop("missing"), None);
  }
}
