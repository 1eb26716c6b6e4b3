//! Shared response handling for both clients.

use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::{Error, Result};

/// Send `req`, turning a non-2xx status into [`Error::Http`] carrying the
/// remote body. `request` names the call in logs and errors
/// (e.g. `"POST /crm/v3/objects/notes"`).
pub(crate) async fn send(req: RequestBuilder, request: &str) -> Result<Response> {
  debug!(request, "remote call");
  let resp = req.send().await?;
  let status = resp.status();
  if status.is_success() {
    return Ok(resp);
  }

  let body = resp.text().await.unwrap_or_default();
  warn!(request, status = status.as_u16(), body = %body, "remote call failed");
  Err(Error::Http {
    request: request.to_owned(),
    status:  status.as_u16(),
    body,
  })
}

/// [`send`], then deserialize the JSON body.
pub(crate) async fn send_json<T: DeserializeOwned>(
  req: RequestBuilder,
  request: &str,
) -> Result<T> {
  Ok(send(req, request).await?.json().await?)
}
