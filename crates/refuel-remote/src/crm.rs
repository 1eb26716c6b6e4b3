//! [`CrmClient`]: the HTTP implementation of [`ObjectStore`].
//!
//! | Operation | Request |
//! |-----------|---------|
//! | search | `POST /crm/v3/objects/{type}/search` |
//! | batch read | `POST /crm/v3/objects/{type}/batch/read` |
//! | create | `POST /crm/v3/objects/{type}` |
//! | patch | `PATCH /crm/v3/objects/{type}/{id}` |
//! | archive | `POST /crm/v3/objects/{type}/batch/archive` |
//! | list associations | `GET /crm/v4/objects/{type}/{id}/associations/{related}` |
//! | associate | `PUT /crm/v4/objects/{type}/{id}/associations/default/{related}/{related_id}` |

use std::time::Duration;

use refuel_core::store::{
  FieldFilter, ObjectStore, ObjectType, Properties, RemoteObject,
};
use reqwest::Client;
use serde::{Deserialize, Deserializer, Serialize};

use crate::{
  Error, Result,
  response::{send, send_json},
};

/// Page size for association listings.
const ASSOCIATION_PAGE_LIMIT: &str = "500";

/// Most inputs the CRM accepts in one batch request.
const BATCH_LIMIT: usize = 100;

/// Connection settings for the CRM API.
#[derive(Debug, Clone)]
pub struct CrmConfig {
  pub base_url:     String,
  /// Private-app access token, sent as a bearer token.
  pub access_token: String,
  pub timeout:      Duration,
}

/// HTTP client for the CRM.
#[derive(Clone)]
pub struct CrmClient {
  client: Client,
  config: CrmConfig,
}

impl CrmClient {
  pub fn new(config: CrmConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(config.timeout)
      .user_agent(concat!("refuel/", env!("CARGO_PKG_VERSION")))
      .build()?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
  }

  fn request(
    &self,
    method: reqwest::Method,
    path: &str,
  ) -> reqwest::RequestBuilder {
    self
      .client
      .request(method, self.url(path))
      .bearer_auth(&self.config.access_token)
  }
}

// ─── Wire types ──────────────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest<'a> {
  filter_groups: [FilterGroup<'a>; 1],
  properties:    &'a [&'a str],
  limit:         u32,
}

#[derive(Serialize)]
struct FilterGroup<'a> {
  filters: Vec<Filter<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Filter<'a> {
  property_name: &'a str,
  operator:      &'static str,
  value:         &'a str,
}

#[derive(Serialize)]
struct BatchRequest<'a> {
  #[serde(skip_serializing_if = "Option::is_none")]
  properties: Option<&'a [&'a str]>,
  inputs:     Vec<IdInput<'a>>,
}

#[derive(Serialize)]
struct IdInput<'a> {
  id: &'a str,
}

#[derive(Serialize)]
struct PropertiesBody {
  properties: Properties,
}

#[derive(Deserialize)]
struct ResultsPage<T> {
  #[serde(default = "Vec::new")]
  results: Vec<T>,
  #[serde(default)]
  paging:  Option<Paging>,
}

#[derive(Deserialize)]
struct Paging {
  next: Option<NextPage>,
}

#[derive(Deserialize)]
struct NextPage {
  after: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Association {
  #[serde(deserialize_with = "id_string")]
  to_object_id: String,
}

/// Association ids come back as JSON numbers; object ids as strings.
fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
  D: Deserializer<'de>,
{
  #[derive(Deserialize)]
  #[serde(untagged)]
  enum Id {
    Number(u64),
    Text(String),
  }

  Ok(match Id::deserialize(deserializer)? {
    Id::Number(n) => n.to_string(),
    Id::Text(s) => s,
  })
}

fn id_inputs(ids: &[String]) -> Vec<IdInput<'_>> {
  ids.iter().map(|id| IdInput { id }).collect()
}

// ─── ObjectStore ─────────────────────────────────────────────────────────────

impl ObjectStore for CrmClient {
  type Error = Error;

  async fn search<'a>(
    &'a self,
    object_type: ObjectType,
    filters: &'a [FieldFilter],
    properties: &'a [&'a str],
  ) -> Result<Option<RemoteObject>> {
    let path = format!("/crm/v3/objects/{object_type}/search");
    let body = SearchRequest {
      filter_groups: [FilterGroup {
        filters: filters
          .iter()
          .map(|f| Filter {
            property_name: &f.property,
            operator:      "EQ",
            value:         &f.value,
          })
          .collect(),
      }],
      properties,
      limit: 1,
    };

    let page: ResultsPage<RemoteObject> = send_json(
      self.request(reqwest::Method::POST, &path).json(&body),
      &format!("POST {path}"),
    )
    .await?;
    Ok(page.results.into_iter().next())
  }

  async fn batch_read<'a>(
    &'a self,
    object_type: ObjectType,
    ids: &'a [String],
    properties: &'a [&'a str],
  ) -> Result<Vec<RemoteObject>> {
    if ids.is_empty() {
      return Ok(Vec::new());
    }

    let path = format!("/crm/v3/objects/{object_type}/batch/read");
    let request = format!("POST {path}");
    let mut objects = Vec::with_capacity(ids.len());
    for chunk in ids.chunks(BATCH_LIMIT) {
      let body = BatchRequest {
        properties: Some(properties),
        inputs:     id_inputs(chunk),
      };
      let page: ResultsPage<RemoteObject> = send_json(
        self.request(reqwest::Method::POST, &path).json(&body),
        &request,
      )
      .await?;
      objects.extend(page.results);
    }
    Ok(objects)
  }

  async fn create(
    &self,
    object_type: ObjectType,
    properties: Properties,
  ) -> Result<String> {
    let path = format!("/crm/v3/objects/{object_type}");
    let request = format!("POST {path}");
    let created: RemoteObject = send_json(
      self
        .request(reqwest::Method::POST, &path)
        .json(&PropertiesBody { properties }),
      &request,
    )
    .await?;

    if created.id.is_empty() {
      return Err(Error::MissingField {
        request,
        field: "id",
      });
    }
    Ok(created.id)
  }

  async fn patch(
    &self,
    object_type: ObjectType,
    id: String,
    properties: Properties,
  ) -> Result<()> {
    let path = format!("/crm/v3/objects/{object_type}/{id}");
    send(
      self
        .request(reqwest::Method::PATCH, &path)
        .json(&PropertiesBody { properties }),
      &format!("PATCH {path}"),
    )
    .await?;
    Ok(())
  }

  async fn archive<'a>(
    &'a self,
    object_type: ObjectType,
    ids: &'a [String],
  ) -> Result<()> {
    if ids.is_empty() {
      return Ok(());
    }

    let path = format!("/crm/v3/objects/{object_type}/batch/archive");
    let request = format!("POST {path}");
    for chunk in ids.chunks(BATCH_LIMIT) {
      let body = BatchRequest {
        properties: None,
        inputs:     id_inputs(chunk),
      };
      send(self.request(reqwest::Method::POST, &path).json(&body), &request)
        .await?;
    }
    Ok(())
  }

  async fn list_associations(
    &self,
    object_type: ObjectType,
    id: String,
    related: ObjectType,
  ) -> Result<Vec<String>> {
    let path = format!("/crm/v4/objects/{object_type}/{id}/associations/{related}");
    let request = format!("GET {path}");
    let mut ids = Vec::new();
    let mut after: Option<String> = None;

    loop {
      let mut req = self
        .request(reqwest::Method::GET, &path)
        .query(&[("limit", ASSOCIATION_PAGE_LIMIT)]);
      if let Some(cursor) = &after {
        req = req.query(&[("after", cursor.as_str())]);
      }

      let page: ResultsPage<Association> = send_json(req, &request).await?;
      ids.extend(page.results.into_iter().map(|a| a.to_object_id));

      match page.paging.and_then(|p| p.next) {
        Some(next) => after = Some(next.after),
        None => break,
      }
    }

    Ok(ids)
  }

  async fn associate(
    &self,
    object_type: ObjectType,
    id: String,
    related: ObjectType,
    related_id: String,
  ) -> Result<()> {
    let path = format!(
      "/crm/v4/objects/{object_type}/{id}/associations/default/{related}/{related_id}"
    );
    send(
      self.request(reqwest::Method::PUT, &path),
      &format!("PUT {path}"),
    )
    .await?;
    Ok(())
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use mockito::{Matcher, Server};
  use serde_json::json;

  use super::*;

  fn client(server: &Server) -> CrmClient {
    CrmClient::new(CrmConfig {
      base_url:     server.url(),
      access_token: "test-token".to_string(),
      timeout:      Duration::from_secs(5),
    })
    .unwrap()
  }

  #[tokio::test]
  async fn search_sends_eq_filter_and_returns_first() {
    let mut server = Server::new_async().await;
    let mock = server
      .mock("POST", "/crm/v3/objects/contacts/search")
      .match_header("authorization", "Bearer test-token")
      .match_body(Matcher::PartialJson(json!({
        "filterGroups": [{"filters": [
          {"propertyName": "email", "operator": "EQ", "value": "a@example.com"}
        ]}],
        "limit": 1
      })))
      .with_status(200)
      .with_header("content-type", "application/json")
      .with_body(
        r#"{"total":1,"results":[{"id":"101","properties":{"email":"a@example.com","phone":null}}]}"#,
      )
      .create_async()
      .await;

    let filters = [FieldFilter::eq("email", "a@example.com")];
    let found = client(&server)
      .search(ObjectType::Contacts, &filters, &["email", "phone"])
      .await
      .unwrap()
      .unwrap();

    mock.assert_async().await;
    assert_eq!(found.id, "101");
    assert_eq!(found.prop("email"), Some("a@example.com"));
    assert_eq!(found.prop("phone"), None);
  }

  #[tokio::test]
  async fn search_without_results_is_none() {
    let mut server = Server::new_async().await;
    server
      .mock("POST", "/crm/v3/objects/contacts/search")
      .with_status(200)
      .with_body(r#"{"total":0,"results":[]}"#)
      .create_async()
      .await;

    let filters = [FieldFilter::eq("email", "nobody@example.com")];
    let found = client(&server)
      .search(ObjectType::Contacts, &filters, &["email"])
      .await
      .unwrap();
    assert!(found.is_none());
  }

  #[tokio::test]
  async fn error_status_keeps_remote_body() {
    let mut server = Server::new_async().await;
    server
      .mock("POST", "/crm/v3/objects/notes")
      .with_status(400)
      .with_body(r#"{"status":"error","message":"hs_timestamp is required"}"#)
      .create_async()
      .await;

    let err = client(&server)
      .create(ObjectType::Notes, Properties::new())
      .await
      .unwrap_err();

    assert_eq!(err.status(), Some(400));
    assert!(err.remote_body().unwrap().contains("hs_timestamp is required"));
  }

  #[tokio::test]
  async fn create_returns_id() {
    let mut server = Server::new_async().await;
    let mock = server
      .mock("POST", "/crm/v3/objects/notes")
      .match_body(Matcher::PartialJson(json!({
        "properties": {"hs_note_body": "{}"}
      })))
      .with_status(201)
      .with_body(r#"{"id":"555","properties":{}}"#)
      .create_async()
      .await;

    let mut props = Properties::new();
    props.insert("hs_note_body".into(), "{}".into());
    let id = client(&server)
      .create(ObjectType::Notes, props)
      .await
      .unwrap();

    mock.assert_async().await;
    assert_eq!(id, "555");
  }

  #[tokio::test]
  async fn batch_read_with_no_ids_skips_network() {
    // No mocks registered: any request would get a 501.
    let server = Server::new_async().await;
    let objects = client(&server)
      .batch_read(ObjectType::Notes, &[], &["hs_note_body"])
      .await
      .unwrap();
    assert!(objects.is_empty());
  }

  #[tokio::test]
  async fn batch_read_sends_ids() {
    let mut server = Server::new_async().await;
    let mock = server
      .mock("POST", "/crm/v3/objects/notes/batch/read")
      .match_body(Matcher::PartialJson(json!({
        "inputs": [{"id": "1"}, {"id": "2"}],
        "properties": ["hs_note_body"]
      })))
      .with_status(200)
      .with_body(
        r#"{"status":"COMPLETE","results":[
          {"id":"1","properties":{"hs_note_body":"a"}},
          {"id":"2","properties":{"hs_note_body":"b"}}
        ]}"#,
      )
      .create_async()
      .await;

    let ids = vec!["1".to_string(), "2".to_string()];
    let objects = client(&server)
      .batch_read(ObjectType::Notes, &ids, &["hs_note_body"])
      .await
      .unwrap();

    mock.assert_async().await;
    assert_eq!(objects.len(), 2);
    assert_eq!(objects[1].prop("hs_note_body"), Some("b"));
  }

  #[tokio::test]
  async fn batch_read_splits_large_id_lists() {
    let mut server = Server::new_async().await;
    let ids: Vec<String> = (1..=101).map(|i| i.to_string()).collect();

    let first_inputs: Vec<_> =
      ids[..100].iter().map(|id| json!({"id": id})).collect();
    let first = server
      .mock("POST", "/crm/v3/objects/notes/batch/read")
      .match_body(Matcher::PartialJson(json!({"inputs": first_inputs})))
      .with_status(200)
      .with_body(r#"{"results":[{"id":"1","properties":{}}]}"#)
      .create_async()
      .await;
    let second = server
      .mock("POST", "/crm/v3/objects/notes/batch/read")
      .match_body(Matcher::PartialJson(json!({"inputs": [{"id": "101"}]})))
      .with_status(200)
      .with_body(r#"{"results":[{"id":"101","properties":{}}]}"#)
      .create_async()
      .await;

    let objects = client(&server)
      .batch_read(ObjectType::Notes, &ids, &["hs_note_body"])
      .await
      .unwrap();

    first.assert_async().await;
    second.assert_async().await;
    let read: Vec<&str> = objects.iter().map(|o| o.id.as_str()).collect();
    assert_eq!(read, ["1", "101"]);
  }

  #[tokio::test]
  async fn list_associations_follows_paging() {
    let mut server = Server::new_async().await;
    let first = server
      .mock("GET", "/crm/v4/objects/contacts/7/associations/notes")
      .match_query(Matcher::Exact("limit=500".into()))
      .with_status(200)
      .with_body(
        r#"{"results":[{"toObjectId":11,"associationTypes":[]}],
            "paging":{"next":{"after":"cursor-1"}}}"#,
      )
      .create_async()
      .await;
    let second = server
      .mock("GET", "/crm/v4/objects/contacts/7/associations/notes")
      .match_query(Matcher::UrlEncoded("after".into(), "cursor-1".into()))
      .with_status(200)
      .with_body(r#"{"results":[{"toObjectId":"12"}]}"#)
      .create_async()
      .await;

    let ids = client(&server)
      .list_associations(ObjectType::Contacts, "7".into(), ObjectType::Notes)
      .await
      .unwrap();

    first.assert_async().await;
    second.assert_async().await;
    assert_eq!(ids, vec!["11".to_string(), "12".to_string()]);
  }

  #[tokio::test]
  async fn associate_uses_default_type() {
    let mut server = Server::new_async().await;
    let mock = server
      .mock(
        "PUT",
        "/crm/v4/objects/notes/555/associations/default/contacts/7",
      )
      .with_status(200)
      .with_body("{}")
      .create_async()
      .await;

    client(&server)
      .associate(ObjectType::Notes, "555".into(), ObjectType::Contacts, "7".into())
      .await
      .unwrap();
    mock.assert_async().await;
  }

  #[tokio::test]
  async fn archive_posts_batch() {
    let mut server = Server::new_async().await;
    let mock = server
      .mock("POST", "/crm/v3/objects/notes/batch/archive")
      .match_body(Matcher::Json(json!({"inputs": [{"id": "9"}]})))
      .with_status(204)
      .create_async()
      .await;

    client(&server)
      .archive(ObjectType::Notes, &["9".to_string()])
      .await
      .unwrap();
    mock.assert_async().await;
  }
}
