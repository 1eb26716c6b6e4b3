//! [`PaymentsClient`]: the HTTP implementation of [`PaymentGateway`].
//!
//! The payments API takes form-encoded bodies and answers with JSON.

use std::time::Duration;

use refuel_core::payments::PaymentGateway;
use reqwest::{Client, Method, RequestBuilder};
use serde::Deserialize;

use crate::{
  Error, Result,
  response::send_json,
};

#[derive(Debug, Clone)]
pub struct PaymentsConfig {
  pub base_url:   String,
  /// Secret API key, sent as a bearer token.
  pub secret_key: String,
  pub timeout:    Duration,
}

#[derive(Clone)]
pub struct PaymentsClient {
  client: Client,
  config: PaymentsConfig,
}

impl PaymentsClient {
  pub fn new(config: PaymentsConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(config.timeout)
      .user_agent(concat!("refuel/", env!("CARGO_PKG_VERSION")))
      .build()?;
    Ok(Self { client, config })
  }

  fn request(&self, method: Method, path: &str) -> RequestBuilder {
    let url =
      format!("{}{}", self.config.base_url.trim_end_matches('/'), path);
    self
      .client
      .request(method, url)
      .bearer_auth(&self.config.secret_key)
  }

  async fn find_customer(&self, email: &str) -> Result<Option<String>> {
    let list: CustomerList = send_json(
      self
        .request(Method::GET, "/v1/customers")
        .query(&[("email", email), ("limit", "1")]),
      "GET /v1/customers",
    )
    .await?;
    Ok(list.data.into_iter().next().map(|c| c.id))
  }

  async fn create_customer(
    &self,
    email: &str,
    name: Option<&str>,
  ) -> Result<String> {
    let mut form = vec![("email", email)];
    if let Some(name) = name {
      form.push(("name", name));
    }

    let customer: Customer = send_json(
      self.request(Method::POST, "/v1/customers").form(&form),
      "POST /v1/customers",
    )
    .await?;
    Ok(customer.id)
  }

  /// POST `form` to an intent endpoint and pull out `client_secret`.
  async fn create_intent(
    &self,
    path: &str,
    form: &[(&str, &str)],
  ) -> Result<String> {
    let request = format!("POST {path}");
    let intent: Intent =
      send_json(self.request(Method::POST, path).form(form), &request).await?;
    intent
      .client_secret
      .filter(|s| !s.is_empty())
      .ok_or(Error::MissingField {
        request,
        field: "client_secret",
      })
  }
}

// ─── Wire types ──────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct CustomerList {
  #[serde(default)]
  data: Vec<Customer>,
}

#[derive(Deserialize)]
struct Customer {
  id: String,
}

#[derive(Deserialize)]
struct Intent {
  client_secret: Option<String>,
}

#[derive(Deserialize)]
struct PortalSession {
  url: Option<String>,
}

// ─── PaymentGateway ──────────────────────────────────────────────────────────

impl PaymentGateway for PaymentsClient {
  type Error = Error;

  async fn find_or_create_customer<'a>(
    &'a self,
    email: &'a str,
    name: Option<&'a str>,
  ) -> Result<String> {
    match self.find_customer(email).await? {
      Some(id) => Ok(id),
      None => self.create_customer(email, name).await,
    }
  }

  async fn create_payment_intent<'a>(
    &'a self,
    customer_id: &'a str,
    amount: u64,
    currency: &'a str,
  ) -> Result<String> {
    let amount = amount.to_string();
    self
      .create_intent("/v1/payment_intents", &[
        ("amount", amount.as_str()),
        ("currency", currency),
        ("customer", customer_id),
        ("automatic_payment_methods[enabled]", "true"),
      ])
      .await
  }

  async fn create_setup_intent<'a>(
    &'a self,
    customer_id: &'a str,
  ) -> Result<String> {
    self
      .create_intent("/v1/setup_intents", &[
        ("customer", customer_id),
        ("automatic_payment_methods[enabled]", "true"),
      ])
      .await
  }

  async fn create_billing_portal_session<'a>(
    &'a self,
    customer_id: &'a str,
    return_url: &'a str,
  ) -> Result<String> {
    let request = "POST /v1/billing_portal/sessions";
    let session: PortalSession = send_json(
      self
        .request(Method::POST, "/v1/billing_portal/sessions")
        .form(&[("customer", customer_id), ("return_url", return_url)]),
      request,
    )
    .await?;
    session.url.ok_or(Error::MissingField {
      request: request.to_owned(),
      field:   "url",
    })
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
