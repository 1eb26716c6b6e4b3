//! Task-status prefix codec.
//!
//! Subjects are stored as `"(N) text"` where `N` is a [`TaskStatus`] code.
//! Parsing is total: a missing or unknown prefix means `in_progress` and the
//! subject is left exactly as stored.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use refuel_core::task::{RefillTask, TaskStatus};
use regex::Regex;

static PREFIX: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^\(([0-9])\)\s*").expect("status prefix pattern is valid")
});

/// Prefixes that mark a task as created by this service.
const STATUS_PREFIXES: &[&str] = &["(0)", "(1)", "(2)"];

/// The result of [`parse_status`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedStatus {
  pub status:        TaskStatus,
  pub clean_subject: String,
}

impl ParsedStatus {
  pub fn code(&self) -> &'static str { self.status.code() }
}

/// Split a stored subject into its status and display text.
pub fn parse_status(subject: &str) -> ParsedStatus {
  if let Some(caps) = PREFIX.captures(subject)
    && let Ok(status) = TaskStatus::from_code(&caps[1])
  {
    let prefix_len = caps.get(0).map_or(0, |m| m.end());
    return ParsedStatus {
      status,
      clean_subject: subject[prefix_len..].to_owned(),
    };
  }
  ParsedStatus {
    status:        TaskStatus::InProgress,
    clean_subject: subject.to_owned(),
  }
}

/// `"(N) subject"`. A recognized prefix already on `subject` is replaced.
pub fn encode_subject(status: TaskStatus, subject: &str) -> String {
  let clean = parse_status(subject).clean_subject;
  format!("({}) {}", status.code(), clean.trim_start())
}

/// Whether a task belongs to the refill feature.
///
/// The CRM's task list is shared with unrelated tasks; this is a substring
/// and prefix heuristic and will misclassify coincidental subjects.
pub fn looks_like_refill(clean_subject: &str, raw_subject: &str) -> bool {
  clean_subject.to_lowercase().contains("refill")
    || STATUS_PREFIXES.iter().any(|p| raw_subject.starts_with(p))
}

/// Assemble a [`RefillTask`] from the stored task properties.
pub fn refill_task(
  id: impl Into<String>,
  raw_subject: &str,
  body: &str,
  timestamp: Option<DateTime<Utc>>,
) -> RefillTask {
  let parsed = parse_status(raw_subject);
  RefillTask {
    id: id.into(),
    status_code: parsed.code().to_owned(),
    status: parsed.status,
    subject: parsed.clean_subject,
    raw_subject: raw_subject.to_owned(),
    body: body.to_owned(),
    timestamp,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn completed_prefix() {
    let p = parse_status("(1) Refill request - Truck");
    assert_eq!(p.code(), "1");
    assert_eq!(p.status, TaskStatus::Completed);
    assert_eq!(p.status.label(), "completed");
    assert_eq!(p.clean_subject, "Refill request - Truck");
  }

  #[test]
  fn no_prefix_defaults_to_in_progress() {
    let p = parse_status("Refill request - Truck");
    assert_eq!(p.code(), "0");
    assert_eq!(p.status.label(), "in_progress");
    assert_eq!(p.clean_subject, "Refill request - Truck");
  }

  #[test]
  fn canceled_prefix_without_space() {
    let p = parse_status("(2)Refill");
    assert_eq!(p.status, TaskStatus::Canceled);
    assert_eq!(p.clean_subject, "Refill");
  }

  #[test]
  fn unknown_digit_is_unmatched() {
    let p = parse_status("(7) Refill request");
    assert_eq!(p.status, TaskStatus::InProgress);
    assert_eq!(p.clean_subject, "(7) Refill request");
  }

  #[test]
  fn prefix_must_be_leading() {
    let p = parse_status(" (1) Refill");
    assert_eq!(p.status, TaskStatus::InProgress);
    assert_eq!(p.clean_subject, " (1) Refill");
  }

  #[test]
  fn multi_digit_is_unmatched() {
    let p = parse_status("(12) Refill");
    assert_eq!(p.status, TaskStatus::InProgress);
    assert_eq!(p.clean_subject, "(12) Refill");
  }

  #[test]
  fn encode_adds_prefix() {
    assert_eq!(
      encode_subject(TaskStatus::InProgress, "Refill request - Van"),
      "(0) Refill request - Van"
    );
  }

  #[test]
  fn encode_replaces_existing_prefix() {
    assert_eq!(
      encode_subject(TaskStatus::Canceled, "(0) Refill request - Van"),
      "(2) Refill request - Van"
    );
  }

  #[test]
  fn encode_then_parse() {
    let raw = encode_subject(TaskStatus::Completed, "Refill request - Van");
    let p = parse_status(&raw);
    assert_eq!(p.status, TaskStatus::Completed);
    assert_eq!(p.clean_subject, "Refill request - Van");
  }

  #[test]
  fn refill_by_substring() {
    assert!(looks_like_refill("Fuel REFILL for van", "Fuel REFILL for van"));
    assert!(!looks_like_refill("Call back customer", "Call back customer"));
  }

  #[test]
  fn refill_by_raw_prefix() {
    assert!(looks_like_refill("Tire check", "(1) Tire check"));
    assert!(!looks_like_refill("Tire check", "(3) Tire check"));
  }

  #[test]
  fn refill_task_from_properties() {
    let task = refill_task("99", "(2) Refill request - Car", "body", None);
    assert_eq!(task.id, "99");
    assert_eq!(task.status_code, "2");
    assert_eq!(task.status, TaskStatus::Canceled);
    assert_eq!(task.subject, "Refill request - Car");
    assert_eq!(task.raw_subject, "(2) Refill request - Car");
  }
}
