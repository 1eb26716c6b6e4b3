//! HTTP clients for the remote collaborators.
//!
//! - [`CrmClient`] implements [`refuel_core::store::ObjectStore`] against the
//!   CRM's v3 object and v4 association APIs.
//! - [`PaymentsClient`] implements
//!   [`refuel_core::payments::PaymentGateway`] against the payments
//!   platform's form-encoded v1 API.
//!
//! Both are cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.

mod crm;
mod payments;
mod response;

pub mod error;

pub use crm::{CrmClient, CrmConfig};
pub use error::{Error, Result};
pub use payments::{PaymentsClient, PaymentsConfig};
