//! Contact: the remote customer identity, keyed by email.

use serde::{Deserialize, Serialize};

use crate::store::{Properties, RemoteObject};

/// Remote property names for contacts.
pub mod props {
  pub const EMAIL: &str = "email";
  pub const FIRST_NAME: &str = "firstname";
  pub const LAST_NAME: &str = "lastname";
  pub const PHONE: &str = "phone";

  pub const ALL: &[&str] = &[EMAIL, FIRST_NAME, LAST_NAME, PHONE];
}

/// A customer as stored in the CRM.
///
/// Email matching is exact; the CRM is the authority on case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
  pub id:         String,
  pub email:      String,
  pub first_name: String,
  pub last_name:  String,
  pub phone:      String,
}

impl Contact {
  pub fn from_remote(object: &RemoteObject) -> Self {
    let get = |key| object.prop(key).unwrap_or_default().to_owned();
    Self {
      id:         object.id.clone(),
      email:      get(props::EMAIL),
      first_name: get(props::FIRST_NAME),
      last_name:  get(props::LAST_NAME),
      phone:      get(props::PHONE),
    }
  }

  /// `"first last"`, or the email when no name is known.
  pub fn display_name(&self) -> String {
    let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
    let full = full.trim();
    if full.is_empty() {
      self.email.clone()
    } else {
      full.to_owned()
    }
  }
}

/// Input for creating or updating a contact.
#[derive(Debug, Clone, Default)]
pub struct ContactInput {
  pub email:      String,
  pub first_name: Option<String>,
  pub last_name:  Option<String>,
  pub phone:      Option<String>,
}

impl ContactInput {
  /// Remote properties to write. Fields the caller left out are not sent,
  /// so an update never blanks an existing value.
  pub fn to_properties(&self) -> Properties {
    let mut properties = Properties::new();
    properties.insert(props::EMAIL.to_owned(), self.email.clone());
    let optional = [
      (props::FIRST_NAME, &self.first_name),
      (props::LAST_NAME, &self.last_name),
      (props::PHONE, &self.phone),
    ];
    for (key, value) in optional {
      if let Some(v) = value {
        properties.insert(key.to_owned(), v.clone());
      }
    }
    properties
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn input_skips_missing_fields() {
    let input = ContactInput {
      email: "a@example.com".into(),
      first_name: Some("Ann".into()),
      ..Default::default()
    };
    let props = input.to_properties();
    assert_eq!(props.len(), 2);
    assert_eq!(props["firstname"], "Ann");
    assert!(!props.contains_key("phone"));
  }

  #[test]
  fn from_remote_fills_blanks() {
    let mut object = RemoteObject::new("42");
    object
      .properties
      .insert("email".into(), Some("a@example.com".into()));
    object.properties.insert("firstname".into(), None);
    let contact = Contact::from_remote(&object);
    assert_eq!(contact.id, "42");
    assert_eq!(contact.first_name, "");
    assert_eq!(contact.display_name(), "a@example.com");
  }
}
