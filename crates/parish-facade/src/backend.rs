//! The `StorageBackend` trait — the honest, fallible layer under the facade.

use std::future::Future;

use parish_core::record::RecordMap;
use serde_json::Value;

use crate::error::BackendError;

/// Introspection numbers a backend can supply cheaply. Only local backends
/// report them; remote backends return `None`.
#[derive(Debug, Clone)]
pub struct LocalStats {
  pub total_items: usize,
  /// Sum of the serialised sizes of every stored value, in bytes.
  pub total_size:  usize,
  pub keys:        Vec<String>,
}

/// A concrete store of named records. Unlike the facade, backend operations
/// report their failures; the facade decides what callers see.
pub trait StorageBackend: Send + Sync {
  /// Short identifier for diagnostics, e.g. `"memory"` or `"api"`.
  fn provider(&self) -> &'static str;

  /// Store `value` under `key`, replacing any prior value wholesale.
  fn put<'a>(
    &'a self,
    key: &'a str,
    value: &'a Value,
  ) -> impl Future<Output = Result<(), BackendError>> + Send + 'a;

  /// Fetch the value under `key`; `None` when the key was never saved.
  /// Absence and failure are distinct here — the facade collapses them.
  fn get<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<Option<Value>, BackendError>> + Send + 'a;

  /// Remove `key`. Succeeds whether or not the key existed.
  fn remove<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<(), BackendError>> + Send + 'a;

  /// Remove every record the backend knows about.
  fn clear(&self) -> impl Future<Output = Result<(), BackendError>> + Send + '_;

  /// Every record currently stored.
  fn export(
    &self,
  ) -> impl Future<Output = Result<RecordMap, BackendError>> + Send + '_;

  /// Upsert each entry; keys absent from `records` are left untouched.
  fn import<'a>(
    &'a self,
    records: &'a RecordMap,
  ) -> impl Future<Output = Result<(), BackendError>> + Send + 'a;

  /// Local introspection, when the backend can provide it without I/O.
  fn local_stats(&self) -> Option<LocalStats> { None }
}
