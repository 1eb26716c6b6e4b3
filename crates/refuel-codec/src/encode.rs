//! Note-body encoder.

use refuel_core::vehicle::VehicleRecord;
use serde_json::json;

/// Canonical JSON text for one vehicle: all six keys, string values.
pub(crate) fn encode(record: &VehicleRecord) -> String {
  let v = record.clone().canonical();
  json!({
    "name":         v.name,
    "make":         v.make,
    "model":        v.model,
    "year":         v.year,
    "color":        v.color,
    "licensePlate": v.license_plate,
  })
  .to_string()
}

#[cfg(test)]
mod tests {
  use serde_json::Value;

  use super::*;

  #[test]
  fn all_keys_present_as_strings() {
    let text = encode(&VehicleRecord {
      make: "Kia".into(),
      model: "Soul".into(),
      ..Default::default()
    });
    let value: Value = serde_json::from_str(&text).unwrap();
    let map = value.as_object().unwrap();
    assert_eq!(map.len(), 6);
    assert!(map.values().all(Value::is_string));
    assert_eq!(map["licensePlate"], "");
    assert_eq!(map["name"], "Kia Soul");
  }

  #[test]
  fn output_is_single_line() {
    let text = encode(&VehicleRecord {
      name: "Line\nbreak".into(),
      make: "Kia".into(),
      ..Default::default()
    });
    assert!(!text.contains('\n'));
  }
}
