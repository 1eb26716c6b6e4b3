//! Integration tests for `SqliteTokenRegistry` against an in-memory database.

use refuel_core::registry::TokenRegistry;

use crate::{Error, SqliteTokenRegistry};

async fn registry() -> SqliteTokenRegistry {
  SqliteTokenRegistry::open_in_memory()
    .await
    .expect("in-memory registry")
}

#[tokio::test]
async fn unknown_key_is_empty() {
  let r = registry().await;
  assert!(r.get("nobody@example.com").await.unwrap().is_empty());
}

#[tokio::test]
async fn add_then_get() {
  let r = registry().await;
  r.add("a@example.com", "tok-1").await.unwrap();
  r.add("a@example.com", "tok-2").await.unwrap();

  let tokens = r.get("a@example.com").await.unwrap();
  assert_eq!(tokens.len(), 2);
  assert!(tokens.contains("tok-1"));
  assert!(tokens.contains("tok-2"));
}

#[tokio::test]
async fn duplicate_add_is_noop() {
  let r = registry().await;
  r.add("a@example.com", "tok-1").await.unwrap();
  r.add("a@example.com", "tok-1").await.unwrap();
  assert_eq!(r.get("a@example.com").await.unwrap().len(), 1);
}

#[tokio::test]
async fn keys_are_isolated() {
  let r = registry().await;
  r.add("a@example.com", "tok-a").await.unwrap();
  r.add("b@example.com", "tok-b").await.unwrap();

  let a = r.get("a@example.com").await.unwrap();
  assert_eq!(a.into_iter().collect::<Vec<_>>(), ["tok-a"]);
}

#[tokio::test]
async fn keys_are_case_sensitive() {
  let r = registry().await;
  r.add("A@example.com", "tok").await.unwrap();
  assert!(r.get("a@example.com").await.unwrap().is_empty());
}

#[tokio::test]
async fn blank_values_rejected() {
  let r = registry().await;
  assert!(matches!(r.add("  ", "tok").await, Err(Error::Empty("key"))));
  assert!(matches!(
    r.add("a@example.com", "").await,
    Err(Error::Empty("value"))
  ));
}

#[tokio::test]
async fn file_registry_persists_across_opens() {
  let dir = std::env::temp_dir()
    .join(format!("refuel-registry-{}", std::process::id()))
    .join("nested");
  let path = dir.join("tokens.db");
  let _ = std::fs::remove_file(&path);

  {
    let r = SqliteTokenRegistry::open(&path).await.unwrap();
    r.add("a@example.com", "tok-1").await.unwrap();
  }

  let reopened = SqliteTokenRegistry::open(&path).await.unwrap();
  assert!(reopened.get("a@example.com").await.unwrap().contains("tok-1"));

  let _ = std::fs::remove_dir_all(dir.parent().unwrap());
}
