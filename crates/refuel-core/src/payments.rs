//! The `PaymentGateway` trait: customer and intent operations on the remote
//! payments platform.

use std::future::Future;

/// Abstraction over the payments platform.
///
/// Amounts are in the currency's minor unit (cents for `usd`).
pub trait PaymentGateway: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Look up a customer by email, creating one if none exists. Returns the
  /// customer id.
  fn find_or_create_customer<'a>(
    &'a self,
    email: &'a str,
    name: Option<&'a str>,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send + 'a;

  /// Create a payment intent and return its client secret.
  fn create_payment_intent<'a>(
    &'a self,
    customer_id: &'a str,
    amount: u64,
    currency: &'a str,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send + 'a;

  /// Create a setup intent (save a card for later) and return its client
  /// secret.
  fn create_setup_intent<'a>(
    &'a self,
    customer_id: &'a str,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send + 'a;

  /// Create a billing-portal session and return its URL.
  fn create_billing_portal_session<'a>(
    &'a self,
    customer_id: &'a str,
    return_url: &'a str,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send + 'a;
}
