//! The `TokenRegistry` trait: push-notification device tokens keyed by
//! customer email.
//!
//! Delivery is not handled here; the registry only remembers which devices
//! belong to which customer.

use std::{collections::BTreeSet, future::Future};

pub trait TokenRegistry: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// All values stored under `key`; empty if none.
  fn get<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<BTreeSet<String>, Self::Error>> + Send + 'a;

  /// Add `value` under `key`. Adding an existing value is a no-op.
  fn add<'a>(
    &'a self,
    key: &'a str,
    value: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}
