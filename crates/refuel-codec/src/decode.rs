//! Note-body decoder.
//!
//! Pipeline (first strategy to yield at least one record wins):
//!   raw &str
//!     ├─ direct()        → serde_json parse          → normalize()
//!     ├─ html_wrapped()  → html::unwrap              → direct()
//!     └─ embedded()      → outermost {…} / […] span  → direct()
//!
//! No strategy can fail: anything unparseable is simply "nothing here".

use refuel_core::vehicle::VehicleRecord;
use serde_json::Value;

use crate::{html, normalize::normalize};

/// A decoding strategy: `Some` only with a non-empty list.
type Strategy = fn(&str) -> Option<Vec<VehicleRecord>>;

/// Strategies in the order they are attempted.
pub(crate) const STRATEGIES: &[(&str, Strategy)] =
  &[("direct", direct), ("html", html_wrapped), ("embedded", embedded)];

/// Records decoded from a note body and the strategy that found them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
  pub strategy: &'static str,
  pub records:  Vec<VehicleRecord>,
}

pub(crate) fn decode(text: &str) -> Option<Decoded> {
  STRATEGIES.iter().find_map(|&(name, run)| {
    run(text).map(|records| Decoded {
      strategy: name,
      records,
    })
  })
}

fn non_empty(records: Vec<VehicleRecord>) -> Option<Vec<VehicleRecord>> {
  (!records.is_empty()).then_some(records)
}

// ─── Strategies ──────────────────────────────────────────────────────────────

/// The whole text is JSON.
fn direct(text: &str) -> Option<Vec<VehicleRecord>> {
  let value: Value = serde_json::from_str(text.trim()).ok()?;
  non_empty(normalize(&value))
}

/// The whole text is JSON once the editor's HTML is removed.
fn html_wrapped(text: &str) -> Option<Vec<VehicleRecord>> {
  let unwrapped = html::unwrap(text);
  if unwrapped == text.trim() {
    return None;
  }
  direct(&unwrapped)
}

/// JSON sits somewhere inside prose, raw or HTML-wrapped.
fn embedded(text: &str) -> Option<Vec<VehicleRecord>> {
  embedded_in(text).or_else(|| {
    let unwrapped = html::unwrap(text);
    (unwrapped != text.trim())
      .then(|| embedded_in(&unwrapped))
      .flatten()
  })
}

/// Try the outermost `{…}` and `[…]` spans, earliest start first.
fn embedded_in(text: &str) -> Option<Vec<VehicleRecord>> {
  let mut spans: Vec<(usize, usize)> = [('{', '}'), ('[', ']')]
    .into_iter()
    .filter_map(|(open, close)| outermost_span(text, open, close))
    .collect();
  spans.sort_unstable();

  spans
    .into_iter()
    .find_map(|(start, end)| direct(&text[start..=end]))
}

/// Byte range from the first `open` to the last `close` after it.
fn outermost_span(text: &str, open: char, close: char) -> Option<(usize, usize)> {
  let start = text.find(open)?;
  let end = text.rfind(close)?;
  (end > start).then_some((start, end))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn names(records: &[VehicleRecord]) -> Vec<&str> {
    records.iter().map(|r| r.name.as_str()).collect()
  }

  // ── direct ──────────────────────────────────────────────────────────────────

  #[test]
  fn direct_object() {
    let r = direct(r#"{"make":"Honda","model":"Civic"}"#).unwrap();
    assert_eq!(names(&r), ["Honda Civic"]);
  }

  #[test]
  fn direct_array() {
    let r = direct(r#"[{"make":"A","model":"B"},{"make":"C","model":"D"}]"#)
      .unwrap();
    assert_eq!(names(&r), ["A B", "C D"]);
  }

  #[test]
  fn direct_rejects_prose() {
    assert!(direct("Car details from app: {}").is_none());
  }

  #[test]
  fn direct_rejected_record_is_none() {
    assert!(direct(r#"{"color":"red"}"#).is_none());
  }

  // ── html ────────────────────────────────────────────────────────────────────

  #[test]
  fn html_paragraph() {
    let r = html_wrapped(r#"<p>{"make":"Honda","model":"Civic"}</p>"#).unwrap();
    assert_eq!(r[0].model, "Civic");
  }

  #[test]
  fn html_escaped_quotes() {
    let r = html_wrapped("<p>{&quot;make&quot;:&quot;Kia&quot;,&quot;plate&quot;:&quot;Q1&quot;}</p>")
      .unwrap();
    assert_eq!(r[0].license_plate, "Q1");
  }

  #[test]
  fn html_skips_text_without_markup() {
    assert!(html_wrapped(r#"{"make":"Honda","model":"Civic"}"#).is_none());
  }

  // ── embedded ────────────────────────────────────────────────────────────────

  #[test]
  fn embedded_object_in_prose() {
    let r = embedded(
      r#"Car details from app: {"make":"Ford","model":"F150","year":"2020"}"#,
    )
    .unwrap();
    assert_eq!(r[0].make, "Ford");
    assert_eq!(r[0].year, "2020");
  }

  #[test]
  fn embedded_array_before_stray_brace_preferred() {
    let text = r#"Vehicles: [{"make":"A","model":"B"}] (see {notes})"#;
    let r = embedded(text).unwrap();
    assert_eq!(names(&r), ["A B"]);
  }

  #[test]
  fn embedded_object_before_array_preferred() {
    let text = r#"{"make":"A","model":"B","tags":["x"]} trailing"#;
    let r = embedded(text).unwrap();
    assert_eq!(names(&r), ["A B"]);
  }

  #[test]
  fn embedded_falls_back_to_later_span() {
    // `[draft]` starts first but is not JSON.
    let text = r#"[draft] {"make":"A","model":"B"}"#;
    let r = embedded(text).unwrap();
    assert_eq!(names(&r), ["A B"]);
  }

  #[test]
  fn embedded_inside_html() {
    let text = "<p>Vehicle: {&quot;make&quot;:&quot;Kia&quot;,&quot;model&quot;:&quot;Soul&quot;}</p>";
    let r = embedded(text).unwrap();
    assert_eq!(names(&r), ["Kia Soul"]);
  }

  #[test]
  fn embedded_unbalanced_is_none() {
    assert!(embedded("} before {").is_none());
  }

  // ── chain ───────────────────────────────────────────────────────────────────

  #[test]
  fn chain_reports_strategy() {
    assert_eq!(decode(r#"{"make":"A","model":"B"}"#).unwrap().strategy, "direct");
    assert_eq!(
      decode(r#"<p>{"make":"A","model":"B"}</p>"#).unwrap().strategy,
      "html"
    );
    assert_eq!(
      decode(r#"Car: {"make":"A","model":"B"}"#).unwrap().strategy,
      "embedded"
    );
  }

  #[test]
  fn chain_never_fails_on_garbage() {
    for text in ["", "not json at all", "{", "[[[", "<p></p>", "{\"a\":}"] {
      assert!(decode(text).is_none(), "{text:?}");
    }
  }
}
