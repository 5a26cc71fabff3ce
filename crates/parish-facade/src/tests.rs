//! Facade behaviour tests against the in-process backend, plus a failing
//! backend to pin down the error-swallowing contract.

use parish_core::record::RecordMap;
use serde_json::{Value, json};

use crate::{
  Facade, LoadOutcome, MemoryBackend, StorageBackend, error::BackendError,
};

fn facade() -> Facade<MemoryBackend> { Facade::new(MemoryBackend::new()) }

// ─── Round trips ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn save_then_load_returns_deep_equal_value() {
  let f = facade();
  let value = json!({
    "title": "Homepage",
    "sections": [{ "kind": "hero", "order": 1 }, { "kind": "cta" }],
    "published": true,
    "revision": 7,
  });

  assert!(f.save("homepage content", &value).await);
  let loaded = f.load("homepage content", Value::Null).await;
  assert_eq!(loaded, value);
}

#[tokio::test]
async fn load_missing_key_returns_default() {
  let f = facade();
  let default = json!({ "empty": true });
  assert_eq!(f.load("never saved", default.clone()).await, default);
  assert_eq!(f.try_load("never saved").await, LoadOutcome::Absent);
}

#[tokio::test]
async fn overwrite_replaces_never_merges() {
  let f = facade();
  f.save("k", &json!({ "a": 1, "b": 2 })).await;
  f.save("k", &json!({ "c": 3 })).await;

  assert_eq!(f.load("k", Value::Null).await, json!({ "c": 3 }));
}

#[tokio::test]
async fn delete_is_idempotent() {
  let f = facade();
  f.save("k", &json!(1)).await;

  assert!(f.delete("k").await);
  assert!(f.delete("k").await);
  assert_eq!(f.try_load("k").await, LoadOutcome::Absent);
}

// ─── Export / import / backup ────────────────────────────────────────────────

#[tokio::test]
async fn import_of_export_reproduces_the_set() {
  let f = facade();
  f.save("homepage content", &json!({ "title": "Hi" })).await;
  f.save("opportunities list", &json!([{ "role": "usher" }])).await;

  let exported = f.export_data().await;
  assert_eq!(exported.len(), 2);

  let fresh = facade();
  assert!(fresh.import_data(&exported).await);
  assert_eq!(fresh.export_data().await, exported);
}

#[tokio::test]
async fn import_is_additive() {
  let f = facade();
  f.save("keep", &json!("original")).await;

  let mut incoming = RecordMap::new();
  incoming.insert("new".into(), json!(42));
  f.import_data(&incoming).await;

  assert_eq!(f.load("keep", Value::Null).await, json!("original"));
  assert_eq!(f.load("new", Value::Null).await, json!(42));
}

#[tokio::test]
async fn backup_file_restores_into_empty_store() {
  let f = facade();
  f.save("a", &json!({ "n": 1 })).await;
  f.save("b", &json!(null)).await;

  let bytes = f.backup_to_file().await;
  // Pretty-printed JSON, suitable for a file download.
  assert!(bytes.starts_with(b"{\n"));

  let fresh = facade();
  assert!(fresh.restore_from_file(&bytes).await);
  assert_eq!(fresh.export_data().await, f.export_data().await);
}

#[tokio::test]
async fn restore_rejects_garbage() {
  let f = facade();
  assert!(!f.restore_from_file(b"not json at all").await);
  assert!(!f.restore_from_file(b"[1, 2, 3]").await);
  assert!(f.export_data().await.is_empty());
}

// ─── Validation and statistics ───────────────────────────────────────────────

#[tokio::test]
async fn validate_reports_missing_data() {
  let f = facade();
  f.save("present", &json!(1)).await;

  let ok = f.validate_data("present").await;
  assert!(ok.is_valid);
  assert!(ok.errors.is_empty());

  let missing = f.validate_data("absent").await;
  assert!(!missing.is_valid);
  assert_eq!(missing.errors, vec!["Data not found".to_string()]);
}

#[tokio::test]
async fn statistics_counts_local_records() {
  let f = facade();
  f.save("a", &json!("12345")).await;
  f.save("b", &json!({ "x": 1 })).await;

  let stats = f.statistics().await;
  assert_eq!(stats.provider, "memory");
  assert_eq!(stats.total_items, Some(2));
  assert!(stats.total_size.unwrap() > 0);
  assert_eq!(stats.keys, Some(vec!["a".to_string(), "b".to_string()]));
}

// ─── Error swallowing ────────────────────────────────────────────────────────

/// A backend whose every operation fails, to pin the facade's safe defaults.
struct BrokenBackend;

fn broken() -> BackendError {
  BackendError::Unavailable("wires cut".to_string())
}

impl StorageBackend for BrokenBackend {
  fn provider(&self) -> &'static str { "broken" }

  async fn put(&self, _: &str, _: &Value) -> Result<(), BackendError> {
    Err(broken())
  }
  async fn get(&self, _: &str) -> Result<Option<Value>, BackendError> {
    Err(broken())
  }
  async fn remove(&self, _: &str) -> Result<(), BackendError> {
    Err(broken())
  }
  async fn clear(&self) -> Result<(), BackendError> { Err(broken()) }
  async fn export(&self) -> Result<RecordMap, BackendError> { Err(broken()) }
  async fn import(&self, _: &RecordMap) -> Result<(), BackendError> {
    Err(broken())
  }
}

#[tokio::test]
async fn facade_converts_every_failure_to_a_safe_default() {
  let f = Facade::new(BrokenBackend);

  assert!(!f.save("k", &json!(1)).await);
  assert_eq!(f.load("k", json!("fallback")).await, json!("fallback"));
  assert_eq!(f.try_load("k").await, LoadOutcome::Failed);
  assert!(!f.delete("k").await);
  assert!(!f.clear().await);
  assert!(f.export_data().await.is_empty());
  assert!(!f.import_data(&RecordMap::new()).await);
  assert_eq!(f.backup_to_file().await, b"{}");

  let validation = f.validate_data("k").await;
  assert!(!validation.is_valid);

  let stats = f.statistics().await;
  assert_eq!(stats.provider, "broken");
  assert_eq!(stats.total_items, None);
}
